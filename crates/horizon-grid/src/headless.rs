//! In-memory platform.
//!
//! [`MemoryContainer`], [`HeadlessViewer`] and [`HeadlessContainers`]
//! implement the platform traits without a real host, for tests, tools and
//! servers that run menus without rendering them. [`HeadlessHost`] wires
//! them to a [`TickScheduler`] and a [`MenuRuntime`].
//!
//! [`HeadlessContainers`] behaves like a host that reports view changes:
//! when a viewer's view is replaced or closed it tells the session, the same
//! way a platform adapter forwards its close events.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use horizon_grid_core::TickScheduler;
use horizon_grid_core::logging::targets;
use parking_lot::{Mutex, RwLock};

use crate::event::ClickEvent;
use crate::item::DisplayItem;
use crate::menu::DispatchResult;
use crate::platform::{
    Container, ContainerFactory, ContainerId, ContainerRef, ContainerSpec, Viewer, ViewerId,
    ViewerRef,
};
use crate::runtime::MenuRuntime;
use crate::session::MenuSession;

/// Cells in a viewer's storage grid: 27 main cells and 9 hotbar cells.
pub const VIEWER_STORAGE_SIZE: usize = 36;

static NEXT_CONTAINER_ID: AtomicU64 = AtomicU64::new(1);

/// A container backed by a vector of cells.
pub struct MemoryContainer {
    id: ContainerId,
    title: String,
    cells: RwLock<Vec<Option<DisplayItem>>>,
    writes: AtomicUsize,
}

impl MemoryContainer {
    pub fn new(size: usize) -> Self {
        Self::titled(size, String::new())
    }

    pub fn titled(size: usize, title: impl Into<String>) -> Self {
        Self {
            id: ContainerId(NEXT_CONTAINER_ID.fetch_add(1, Ordering::Relaxed)),
            title: title.into(),
            cells: RwLock::new(vec![None; size]),
            writes: AtomicUsize::new(0),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Copy of every cell.
    pub fn snapshot(&self) -> Vec<Option<DisplayItem>> {
        self.cells.read().clone()
    }

    /// Material of every cell.
    pub fn materials(&self) -> Vec<Option<String>> {
        self.cells
            .read()
            .iter()
            .map(|cell| cell.as_ref().map(|item| item.material().to_owned()))
            .collect()
    }

    /// Number of `set_item` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::Relaxed)
    }
}

impl Container for MemoryContainer {
    fn id(&self) -> ContainerId {
        self.id
    }

    fn size(&self) -> usize {
        self.cells.read().len()
    }

    fn item(&self, index: usize) -> Option<DisplayItem> {
        self.cells.read().get(index).cloned().flatten()
    }

    fn set_item(&self, index: usize, item: Option<DisplayItem>) {
        if let Some(cell) = self.cells.write().get_mut(index) {
            *cell = item;
            self.writes.fetch_add(1, Ordering::Relaxed);
        }
    }
}

impl fmt::Debug for MemoryContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryContainer")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("size", &self.size())
            .finish()
    }
}

/// A viewer that records the messages it is sent.
pub struct HeadlessViewer {
    id: ViewerId,
    /// `None` grants every permission.
    permissions: Option<HashSet<String>>,
    messages: Mutex<Vec<String>>,
}

impl HeadlessViewer {
    /// A viewer holding every permission.
    pub fn new(id: u64) -> Self {
        Self {
            id: ViewerId(id),
            permissions: None,
            messages: Mutex::new(Vec::new()),
        }
    }

    /// Restrict the viewer to exactly `permissions`.
    pub fn with_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions = Some(permissions.into_iter().map(Into::into).collect());
        self
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }

    pub fn into_ref(self) -> ViewerRef {
        Arc::new(self)
    }
}

impl Viewer for HeadlessViewer {
    fn id(&self) -> ViewerId {
        self.id
    }

    fn send_message(&self, message: &str) {
        self.messages.lock().push(message.to_owned());
    }

    fn has_permission(&self, permission: &str) -> bool {
        self.permissions
            .as_ref()
            .is_none_or(|granted| granted.contains(permission))
    }
}

impl fmt::Debug for HeadlessViewer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeadlessViewer")
            .field("id", &self.id)
            .field("permissions", &self.permissions)
            .finish_non_exhaustive()
    }
}

/// Container factory holding everything in memory.
#[derive(Default)]
pub struct HeadlessContainers {
    built: RwLock<HashMap<ContainerId, Arc<MemoryContainer>>>,
    views: RwLock<HashMap<ViewerId, ContainerId>>,
    storages: RwLock<HashMap<ViewerId, Arc<MemoryContainer>>>,
    session: RwLock<Option<Weak<MenuSession>>>,
    opens: AtomicUsize,
    closes: AtomicUsize,
}

impl HeadlessContainers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report replaced and closed views to `session`.
    pub fn echo_closes_to(&self, session: &Arc<MenuSession>) {
        *self.session.write() = Some(Arc::downgrade(session));
    }

    /// The container `viewer` is looking at.
    pub fn open_view(&self, viewer: ViewerId) -> Option<ContainerId> {
        self.views.read().get(&viewer).copied()
    }

    pub fn container(&self, id: ContainerId) -> Option<Arc<MemoryContainer>> {
        self.built.read().get(&id).cloned()
    }

    pub fn viewed_container(&self, viewer: ViewerId) -> Option<Arc<MemoryContainer>> {
        self.container(self.open_view(viewer)?)
    }

    /// The viewer's storage grid, if it has been used.
    pub fn storage_of(&self, viewer: ViewerId) -> Option<Arc<MemoryContainer>> {
        self.storages.read().get(&viewer).cloned()
    }

    pub fn built_count(&self) -> usize {
        self.built.read().len()
    }

    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::Relaxed)
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::Relaxed)
    }

    /// Close the viewer's view as the viewer would, without going through a
    /// menu.
    pub fn close_by_viewer(&self, viewer: ViewerId) -> bool {
        if self.views.write().remove(&viewer).is_none() {
            return false;
        }
        self.closes.fetch_add(1, Ordering::Relaxed);
        self.echo_close(viewer);
        true
    }

    fn echo_close(&self, viewer: ViewerId) {
        let session = self.session.read().as_ref().and_then(Weak::upgrade);
        if let Some(session) = session {
            let result = session.dispatch_close(viewer);
            tracing::trace!(target: targets::MENU, %viewer, ?result, "view close reported");
        }
    }
}

impl ContainerFactory for HeadlessContainers {
    fn build(&self, spec: &ContainerSpec) -> ContainerRef {
        let container = Arc::new(MemoryContainer::titled(spec.size, spec.title.clone()));
        self.built.write().insert(container.id(), container.clone());
        container
    }

    fn open(&self, container: &ContainerRef, viewer: &ViewerRef) {
        let previous = self.views.write().insert(viewer.id(), container.id());
        self.opens.fetch_add(1, Ordering::Relaxed);
        if previous.is_some_and(|previous| previous != container.id()) {
            self.echo_close(viewer.id());
        }
    }

    fn close_view(&self, viewer: &ViewerRef) {
        self.close_by_viewer(viewer.id());
    }

    fn viewer_storage(&self, viewer: &ViewerRef) -> Option<ContainerRef> {
        let storage: ContainerRef = self
            .storages
            .write()
            .entry(viewer.id())
            .or_insert_with(|| Arc::new(MemoryContainer::new(VIEWER_STORAGE_SIZE)))
            .clone();
        Some(storage)
    }
}

impl fmt::Debug for HeadlessContainers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeadlessContainers")
            .field("built", &self.built_count())
            .field("views", &self.views.read().len())
            .finish_non_exhaustive()
    }
}

/// A complete in-memory host: scheduler, containers, runtime and viewers.
///
/// The scheduler is bound to the thread that creates the host.
pub struct HeadlessHost {
    pub scheduler: Arc<TickScheduler>,
    pub containers: Arc<HeadlessContainers>,
    pub runtime: MenuRuntime,
    viewers: RwLock<HashMap<u64, Arc<HeadlessViewer>>>,
}

impl HeadlessHost {
    pub fn new() -> Self {
        let scheduler = Arc::new(TickScheduler::bound_to_current_thread());
        let containers = Arc::new(HeadlessContainers::new());
        let runtime = MenuRuntime::new(scheduler.clone(), containers.clone());
        containers.echo_closes_to(runtime.session());
        Self {
            scheduler,
            containers,
            runtime,
            viewers: RwLock::new(HashMap::new()),
        }
    }

    /// The viewer with `id`, created with every permission on first use.
    pub fn viewer(&self, id: u64) -> ViewerRef {
        self.add_viewer(HeadlessViewer::new(id))
    }

    /// Register `viewer`, keeping an existing viewer with the same id.
    pub fn add_viewer(&self, viewer: HeadlessViewer) -> ViewerRef {
        let id = viewer.id.0;
        let viewer: Arc<HeadlessViewer> = self
            .viewers
            .write()
            .entry(id)
            .or_insert_with(|| Arc::new(viewer))
            .clone();
        viewer
    }

    pub fn viewer_id(&self, id: u64) -> ViewerId {
        ViewerId(id)
    }

    /// Messages sent to viewer `id`.
    pub fn messages(&self, id: u64) -> Vec<String> {
        self.viewers
            .read()
            .get(&id)
            .map(|viewer| viewer.messages())
            .unwrap_or_default()
    }

    /// Advance the scheduler by one tick.
    pub fn tick(&self) -> usize {
        self.scheduler.tick()
    }

    /// Advance the scheduler by `ticks` ticks.
    pub fn advance(&self, ticks: usize) {
        for _ in 0..ticks {
            self.scheduler.tick();
        }
    }

    /// Click a cell of the menu viewer `id` is looking at, carrying the
    /// cell's current content.
    pub fn click(&self, id: u64, slot: usize) -> (DispatchResult, ClickEvent) {
        let viewer = self.viewer_id(id);
        let Some(container) = self.containers.viewed_container(viewer) else {
            return (DispatchResult::MenuNotFound, ClickEvent::outside(viewer, None));
        };
        let mut event = ClickEvent::top(viewer, container.id(), slot).with_current(container.item(slot));
        let result = self.runtime.session().dispatch_click(&mut event);
        (result, event)
    }

    /// Close viewer `id`'s view as the viewer would.
    pub fn close_by_viewer(&self, id: u64) -> bool {
        self.containers.close_by_viewer(self.viewer_id(id))
    }
}

impl Default for HeadlessHost {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::MenuId;
    use crate::platform::ContainerKind;

    #[test]
    fn test_memory_container_cells() {
        let container = MemoryContainer::new(3);
        container.set_item(1, Some(DisplayItem::new("apple")));
        container.set_item(5, Some(DisplayItem::new("ignored")));
        assert_eq!(container.materials(), vec![None, Some("apple".to_owned()), None]);
        assert_eq!(container.write_count(), 1);
        assert!(container.item(5).is_none());
        container.clear();
        assert!(container.snapshot().iter().all(Option::is_none));
    }

    #[test]
    fn test_viewer_permissions_and_messages() {
        let open = HeadlessViewer::new(1);
        assert!(open.has_permission("anything"));
        let limited = HeadlessViewer::new(2).with_permissions(["shop.use"]);
        assert!(limited.has_permission("shop.use"));
        assert!(!limited.has_permission("shop.admin"));
        limited.send_message("hello");
        assert_eq!(limited.messages(), vec!["hello".to_owned()]);
    }

    #[test]
    fn test_factory_tracks_views() {
        let containers = HeadlessContainers::new();
        let viewer = HeadlessViewer::new(4).into_ref();
        let spec = ContainerSpec {
            kind: ContainerKind::Chest,
            size: 27,
            title: "Chest".into(),
            holder: host_menu_id(),
        };
        let container = containers.build(&spec);
        containers.open(&container, &viewer);
        assert_eq!(containers.open_view(viewer.id()), Some(container.id()));
        assert_eq!(containers.viewed_container(viewer.id()).unwrap().title(), "Chest");

        containers.close_view(&viewer);
        assert!(containers.open_view(viewer.id()).is_none());
        assert_eq!((containers.open_count(), containers.close_count()), (1, 1));

        let storage = containers.viewer_storage(&viewer).unwrap();
        assert_eq!(storage.size(), VIEWER_STORAGE_SIZE);
        assert!(containers.storage_of(viewer.id()).is_some());
    }

    fn host_menu_id() -> MenuId {
        let host = HeadlessHost::new();
        host.runtime.menu(host.viewer(1)).build().unwrap().id()
    }

    #[test]
    fn test_host_keeps_viewers() {
        let host = HeadlessHost::new();
        let first = host.viewer(7);
        first.send_message("one");
        let again = host.viewer(7);
        again.send_message("two");
        assert_eq!(host.messages(7), vec!["one".to_owned(), "two".to_owned()]);
        assert!(host.messages(8).is_empty());
    }
}
