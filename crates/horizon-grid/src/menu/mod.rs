//! Menus.
//!
//! A [`Menu`] is one viewer's interactive grid: a layout, three tiers of
//! bindings, zero or more [`PageArea`]s and a link back to its parent. Menus
//! are created with [`MenuBuilder`] and shared as [`MenuHandle`]s.
//!
//! # Lifecycle
//!
//! - **open**: materialize the container on first use, paint every binding
//!   and show it to the viewer. Deferred by one tick while a click is being
//!   handled for the viewer or when called off the primary context.
//! - **close**: tear down, then optionally return to the parent. Deferred the
//!   same way; a second close while one is pending or running is ignored.
//!
//! Deferred work is queued on the runtime's
//! [`Scheduler`](horizon_grid_core::Scheduler) and runs against the menu's
//! own handle, so it never needs the caller to keep the menu alive.

mod builder;
mod click;
mod layout;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use horizon_grid_core::logging::targets;
use horizon_grid_core::{ScheduledTaskId, Scheduler, Tick};
use parking_lot::{Mutex, MutexGuard};

pub use builder::MenuBuilder;
pub use click::DispatchResult;
pub use layout::MenuLayout;

use crate::binding::{Binding, BindingRegistry, BindingTier, PaintTarget};
use crate::button::ButtonRef;
use crate::context::ClickContext;
use crate::error::{GridError, Result};
use crate::event::ClickEvent;
use crate::navigation::{MenuRecipe, NavigationOrigin};
use crate::options::MenuOptions;
use crate::page_area::{PageArea, PageAreaId, PageButtonType};
use crate::platform::{ContainerRef, ContainerSpec, ViewerId, ViewerRef};
use crate::runtime::MenuRuntime;
use crate::slot::{Slot, SlotKey};

/// Unique identity of a menu instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MenuId(u64);

static NEXT_MENU_ID: AtomicU64 = AtomicU64::new(1);

impl MenuId {
    fn next() -> Self {
        Self(NEXT_MENU_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for MenuId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "menu#{}", self.0)
    }
}

/// Hook run with the menu itself (open, close).
pub type MenuHook = Arc<dyn Fn(&mut Menu) + Send + Sync>;
/// Hook run with the menu and the raw click (empty cells, storage clicks).
pub type EventHook = Arc<dyn Fn(&mut Menu, &mut ClickEvent) + Send + Sync>;
/// Veto over clicks on bound cells.
pub type AllowClickHook = Arc<dyn Fn(&ClickContext<'_>) -> bool + Send + Sync>;
/// Handler for [`ClickResult::Custom`](crate::ClickResult::Custom).
pub type CustomResultHook = Arc<dyn Fn(&mut ClickContext<'_>, u32) + Send + Sync>;
/// Decides whether a menu may be reopened by a closing child.
pub type ReopenGuard = Arc<dyn Fn(&MenuSummary) -> bool + Send + Sync>;
/// Looks up a parent menu for a viewer.
pub type ParentGetter = Arc<dyn Fn(&ViewerRef) -> Option<MenuHandle> + Send + Sync>;
/// Runs in place of reopening a parent menu.
pub type ParentRunnable = Arc<dyn Fn(&ViewerRef) + Send + Sync>;

/// Optional callbacks of a menu.
#[derive(Clone, Default)]
pub struct MenuHooks {
    pub on_open: Option<MenuHook>,
    pub on_close: Option<MenuHook>,
    /// Clicks on empty, unbound cells of the menu grid.
    pub on_empty_click: Option<EventHook>,
    /// Clicks on the viewer's storage grid.
    pub on_bottom_click: Option<EventHook>,
    pub allow_click: Option<AllowClickHook>,
    pub custom_result: Option<CustomResultHook>,
}

impl fmt::Debug for MenuHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuHooks")
            .field("on_open", &self.on_open.is_some())
            .field("on_close", &self.on_close.is_some())
            .field("on_empty_click", &self.on_empty_click.is_some())
            .field("on_bottom_click", &self.on_bottom_click.is_some())
            .field("allow_click", &self.allow_click.is_some())
            .field("custom_result", &self.custom_result.is_some())
            .finish()
    }
}

/// Where a menu returns to when it is closed with a parent mode.
#[derive(Clone, Default)]
pub enum ParentLink {
    /// Nowhere; the view is dismissed.
    #[default]
    None,
    /// Reopen the menu returned by the getter.
    Getter(ParentGetter),
    /// Run a callback instead.
    Runnable(ParentRunnable),
    /// Step back through the viewer's navigation history.
    History,
}

impl fmt::Debug for ParentLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "None",
            Self::Getter(_) => "Getter(..)",
            Self::Runnable(_) => "Runnable(..)",
            Self::History => "History",
        })
    }
}

/// How to close a menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CloseMode {
    /// Dismiss the view.
    #[default]
    Dismiss,
    /// Return to the parent if it allows it, otherwise dismiss.
    ReopenParent,
    /// Return to the parent even if it would refuse.
    ForceReopenParent,
}

/// A snapshot of a menu, handed to reopen guards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuSummary {
    pub id: MenuId,
    pub title: String,
    pub page: Option<usize>,
    pub paginated: bool,
}

/// One viewer's interactive grid.
pub struct Menu {
    id: MenuId,
    title: String,
    layout: MenuLayout,
    viewer: ViewerRef,
    runtime: MenuRuntime,
    options: MenuOptions,
    hooks: MenuHooks,
    bindings: BindingRegistry,
    page_areas: Vec<PageArea>,
    parent: ParentLink,
    reopen_guard: Option<ReopenGuard>,
    container: Option<ContainerRef>,
    navigation_owned: bool,
    /// Shown to the viewer and not yet torn down.
    shown: bool,
    processing_click: bool,
    closing: bool,
    close_pending: bool,
    refresh_task: Option<ScheduledTaskId>,
    self_ref: Weak<Mutex<Menu>>,
}

impl Menu {
    /// Start building a menu for `viewer`.
    pub fn builder(runtime: &MenuRuntime, viewer: ViewerRef) -> MenuBuilder {
        MenuBuilder::new(runtime, viewer)
    }

    pub fn id(&self) -> MenuId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Change the title. Takes effect the next time the container is built.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn layout(&self) -> &MenuLayout {
        &self.layout
    }

    /// Number of cells in the menu grid.
    pub fn size(&self) -> usize {
        self.layout.size()
    }

    pub fn viewer(&self) -> &ViewerRef {
        &self.viewer
    }

    pub fn viewer_id(&self) -> ViewerId {
        self.viewer.id()
    }

    pub fn runtime(&self) -> &MenuRuntime {
        &self.runtime
    }

    pub fn options(&self) -> &MenuOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut MenuOptions {
        &mut self.options
    }

    pub fn hooks_mut(&mut self) -> &mut MenuHooks {
        &mut self.hooks
    }

    pub fn bindings(&self) -> &BindingRegistry {
        &self.bindings
    }

    /// The materialized container, if the menu has been opened before.
    pub fn container(&self) -> Option<&ContainerRef> {
        self.container.as_ref()
    }

    pub fn is_materialized(&self) -> bool {
        self.container.is_some()
    }

    /// Whether the viewer currently sees this menu.
    pub fn is_shown(&self) -> bool {
        self.shown
    }

    pub fn is_processing_click(&self) -> bool {
        self.processing_click
    }

    pub fn is_closing(&self) -> bool {
        self.closing
    }

    /// Whether the menu was opened through the navigation history.
    pub fn is_navigation_owned(&self) -> bool {
        self.navigation_owned
    }

    pub(crate) fn set_navigation_owned(&mut self, owned: bool) {
        self.navigation_owned = owned;
    }

    pub fn parent(&self) -> &ParentLink {
        &self.parent
    }

    pub fn set_parent(&mut self, parent: ParentLink) {
        self.parent = parent;
    }

    /// Decide which children may reopen this menu on close.
    pub fn set_reopen_guard(&mut self, guard: Option<ReopenGuard>) {
        self.reopen_guard = guard;
    }

    /// Whether a closing `child` may reopen this menu.
    pub fn allows_reopen_from(&self, child: &MenuSummary) -> bool {
        self.reopen_guard.as_ref().is_none_or(|guard| guard(child))
    }

    pub fn summary(&self) -> MenuSummary {
        MenuSummary {
            id: self.id,
            title: self.title.clone(),
            page: self.current_page(),
            paginated: self.is_paginated(),
        }
    }

    /// A handle to this menu.
    pub fn handle(&self) -> Option<MenuHandle> {
        self.self_ref.upgrade().map(|inner| MenuHandle {
            id: self.id,
            inner,
            scheduler: self.runtime.scheduler().clone(),
        })
    }

    // -------------------------------------------------------------------------
    // Bindings
    // -------------------------------------------------------------------------

    /// Bind `button` to `slot` in `tier` and repaint the cell.
    pub fn bind(&mut self, tier: BindingTier, slot: Slot, button: ButtonRef) -> Option<Binding> {
        let key = slot.key();
        let previous = self.bindings.set(tier, slot, button);
        self.refresh_slots(&[key]);
        previous
    }

    /// Bind content in the default tier.
    pub fn set_button(&mut self, slot: Slot, button: ButtonRef) -> Option<Binding> {
        self.bind(BindingTier::Default, slot, button)
    }

    /// Bind an overlay in the attached tier.
    pub fn attach(&mut self, slot: Slot, button: ButtonRef) -> Option<Binding> {
        self.bind(BindingTier::Attached, slot, button)
    }

    /// Remove a binding and repaint the cell; an address left without any
    /// binding is emptied.
    pub fn unbind(&mut self, tier: BindingTier, key: SlotKey) -> Option<Binding> {
        let removed = self.bindings.remove(tier, key)?;
        if self.bindings.get(key).is_some() {
            self.refresh_slots(&[key]);
        } else if let Some(container) = self.cell_container(removed.slot()) {
            container.set_item(key.index, None);
        }
        Some(removed)
    }

    // -------------------------------------------------------------------------
    // Painting
    // -------------------------------------------------------------------------

    /// Repaint the whole container. Returns the number of cells painted.
    pub fn refresh_all(&mut self) -> usize {
        self.fill(true)
    }

    /// Repaint only `keys`. A no-op until the menu is materialized.
    pub fn refresh_slots(&mut self, keys: &[SlotKey]) -> usize {
        let Some(container) = self.container.clone() else {
            return 0;
        };
        let storage = self.storage_container();
        let target = PaintTarget {
            menu: container.as_ref(),
            storage: storage.as_deref(),
            viewer: self.viewer.as_ref(),
        };
        self.bindings.refresh_slots(Some(target), keys)
    }

    fn fill(&mut self, clear_first: bool) -> usize {
        let Some(container) = self.container.clone() else {
            return 0;
        };
        let storage = self.storage_container();
        let target = PaintTarget {
            menu: container.as_ref(),
            storage: storage.as_deref(),
            viewer: self.viewer.as_ref(),
        };
        self.bindings.fill(target, clear_first)
    }

    fn storage_container(&self) -> Option<ContainerRef> {
        self.runtime.containers().viewer_storage(&self.viewer)
    }

    /// The container holding `slot`.
    fn cell_container(&self, slot: &Slot) -> Option<ContainerRef> {
        if slot.is_viewer_storage() {
            self.storage_container()
        } else {
            self.container.clone()
        }
    }

    fn materialize(&mut self) -> Result<ContainerRef> {
        let spec = ContainerSpec {
            kind: self.layout.kind(),
            size: self.layout.size(),
            title: self.title.clone(),
            holder: self.id,
        };
        let container = self.runtime.containers().build(&spec);
        if container.size() < spec.size {
            return Err(GridError::invalid_layout(format!(
                "factory built {} cells for a menu of {}",
                container.size(),
                spec.size
            )));
        }
        tracing::trace!(target: targets::MENU, menu = %self.id, container = %container.id(), "materialized");
        self.container = Some(container.clone());
        Ok(container)
    }

    // -------------------------------------------------------------------------
    // Pages
    // -------------------------------------------------------------------------

    /// Add a page area. Navigation controls without a chosen cell are placed
    /// in their recommended cells of this menu's layout.
    pub fn add_page_area(&mut self, mut area: PageArea) -> Result<PageAreaId> {
        area.resolve_nav_slots(&self.layout);
        area.validate(self.size())?;
        let id = PageAreaId(self.page_areas.len());
        self.page_areas.push(area);
        self.repopulate(id)?;
        Ok(id)
    }

    pub fn page_area(&self, id: PageAreaId) -> Option<&PageArea> {
        self.page_areas.get(id.0)
    }

    pub fn page_areas(&self) -> &[PageArea] {
        &self.page_areas
    }

    pub fn is_paginated(&self) -> bool {
        !self.page_areas.is_empty()
    }

    /// Current page of the first page area.
    pub fn current_page(&self) -> Option<usize> {
        self.page_areas.first().map(PageArea::current_page)
    }

    /// Last page of the first page area.
    pub fn max_page(&self) -> Option<usize> {
        self.page_areas.first().map(PageArea::max_page)
    }

    /// Show `page` of an area, clamped into range. Returns the page shown.
    pub fn set_page(&mut self, id: PageAreaId, page: usize) -> Result<usize> {
        let area = self
            .page_areas
            .get_mut(id.0)
            .ok_or(GridError::UnknownPageArea(id.0))?;
        let previous = area.current_page();
        let shown = area.set_page(page);
        if shown != previous {
            tracing::debug!(
                target: targets::MENU,
                menu = %self.id,
                area = id.0,
                from = previous,
                to = shown,
                "page changed"
            );
            self.repopulate(id)?;
        }
        Ok(shown)
    }

    /// Apply a navigation control's rule to an area.
    pub fn turn_page(&mut self, id: PageAreaId, kind: PageButtonType) -> Result<usize> {
        let area = self
            .page_area(id)
            .ok_or(GridError::UnknownPageArea(id.0))?;
        let target = kind.target_page(area.current_page(), area.pagination());
        self.set_page(id, target)
    }

    /// Replace an area's items, keeping the page if it still exists.
    pub fn set_page_items(&mut self, id: PageAreaId, items: Vec<ButtonRef>) -> Result<()> {
        self.page_areas
            .get_mut(id.0)
            .ok_or(GridError::UnknownPageArea(id.0))?
            .set_items(items);
        self.repopulate(id)
    }

    /// Rebind an area and repaint the cells it covers.
    fn repopulate(&mut self, id: PageAreaId) -> Result<()> {
        let area = self
            .page_areas
            .get(id.0)
            .ok_or(GridError::UnknownPageArea(id.0))?;
        area.populate(id, &mut self.bindings);
        let keys = area.addresses();

        // Cells the area just vacated must be emptied as well.
        if let Some(container) = &self.container {
            for key in keys.iter().filter(|key| !key.viewer_storage) {
                if self.bindings.get(*key).is_none() {
                    container.set_item(key.index, None);
                }
            }
        }
        self.refresh_slots(&keys);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Show the menu to its viewer.
    pub fn open(&mut self) -> Result<()> {
        let viewer_id = self.viewer.id();
        let session = self.runtime.session().clone();
        if session.is_processing(viewer_id) || !self.runtime.scheduler().is_primary_context() {
            tracing::debug!(target: targets::MENU, menu = %self.id, viewer = %viewer_id, "open deferred");
            self.defer(1, |menu| {
                if let Err(err) = menu.open() {
                    tracing::error!(target: targets::MENU, menu = %menu.id, error = %err, "deferred open failed");
                }
            });
            return Ok(());
        }

        let container = match &self.container {
            Some(container) => container.clone(),
            None => self.materialize()?,
        };
        self.fill(true);

        session.set_opening(viewer_id, self.id);
        self.runtime.containers().open(&container, &self.viewer);
        if let Some(handle) = self.handle() {
            session.register_open(viewer_id, handle);
        }
        session.clear_opening(viewer_id, self.id);

        self.shown = true;
        self.closing = false;
        self.start_auto_refresh();
        if let Some(hook) = self.hooks.on_open.clone() {
            hook(self);
        }
        tracing::debug!(target: targets::MENU, menu = %self.id, viewer = %viewer_id, "menu opened");
        Ok(())
    }

    /// Close the menu.
    pub fn close(&mut self, mode: CloseMode) {
        if self.closing || self.close_pending {
            tracing::trace!(target: targets::MENU, menu = %self.id, "close already in progress");
            return;
        }
        let viewer_id = self.viewer.id();
        if self.processing_click
            || self.runtime.session().is_processing(viewer_id)
            || !self.runtime.scheduler().is_primary_context()
        {
            tracing::debug!(target: targets::MENU, menu = %self.id, ?mode, "close deferred");
            self.close_pending = true;
            self.defer(1, move |menu| {
                menu.close_pending = false;
                menu.close(mode);
            });
            return;
        }
        if !self.shown {
            tracing::trace!(target: targets::MENU, menu = %self.id, "close ignored, menu not shown");
            return;
        }

        self.closing = true;
        self.teardown();
        let reopened = match mode {
            CloseMode::Dismiss => false,
            CloseMode::ReopenParent => self.reopen_parent(false),
            CloseMode::ForceReopenParent => self.reopen_parent(true),
        };
        if !reopened {
            self.runtime.containers().close_view(&self.viewer);
        }
        self.closing = false;
        tracing::debug!(target: targets::MENU, menu = %self.id, ?mode, reopened, "menu closed");
    }

    /// Open the menu built by `recipe` as the next step of this viewer's
    /// navigation history, remembering this menu's page.
    pub fn open_with_history(&mut self, recipe: MenuRecipe) -> Result<MenuHandle> {
        let origin = NavigationOrigin {
            menu: self.id,
            page: self.current_page(),
        };
        let viewer = self.viewer.clone();
        self.runtime.open_with_history_from(&viewer, recipe, Some(origin))
    }

    /// The platform reports that the viewer's view of this menu went away.
    pub(crate) fn handle_view_closed(&mut self) {
        if self.closing || !self.shown {
            return;
        }
        let viewer_id = self.viewer.id();
        let session = self.runtime.session().clone();
        if let Some(opening) = session.opening_menu(viewer_id)
            && opening != self.id
        {
            tracing::trace!(target: targets::MENU, menu = %self.id, next = %opening, "view replaced");
            self.detach();
            return;
        }

        self.closing = true;
        self.teardown();
        self.closing = false;
        tracing::debug!(target: targets::MENU, menu = %self.id, "view closed by viewer");

        if self.options.reopen_parent_on_close && !matches!(self.parent, ParentLink::None) {
            // The platform is still closing the old view.
            self.defer(1, |menu| {
                if !menu.reopen_parent(false) {
                    tracing::trace!(target: targets::MENU, menu = %menu.id, "no parent to return to");
                }
            });
        }
    }

    /// Forget the view without touching the platform.
    pub(crate) fn detach(&mut self) {
        self.shown = false;
        self.stop_auto_refresh();
        self.runtime
            .session()
            .unregister_open(self.viewer.id(), self.id);
    }

    fn teardown(&mut self) {
        self.detach();
        if let Some(hook) = self.hooks.on_close.clone() {
            hook(self);
        }
        if self.navigation_owned {
            self.runtime.schedule_history_cleanup(self.viewer.id());
        }
    }

    /// Try to return to the parent. Returns `true` if something took over
    /// the viewer's view.
    fn reopen_parent(&mut self, force: bool) -> bool {
        let summary = self.summary();
        match self.parent.clone() {
            ParentLink::None => false,
            ParentLink::Getter(getter) => {
                let Some(parent) = getter(&self.viewer) else {
                    tracing::debug!(target: targets::MENU, menu = %self.id, "parent getter returned nothing");
                    return false;
                };
                if parent.points_to(&self.self_ref) {
                    tracing::warn!(target: targets::MENU, menu = %self.id, "menu is its own parent");
                    return false;
                }
                let mut parent = parent.lock();
                if !force && !parent.allows_reopen_from(&summary) {
                    tracing::debug!(target: targets::MENU, menu = %self.id, parent = %parent.id, "parent refused reopen");
                    return false;
                }
                match parent.open() {
                    Ok(()) => true,
                    Err(err) => {
                        tracing::error!(target: targets::MENU, parent = %parent.id, error = %err, "failed to reopen parent");
                        false
                    }
                }
            }
            ParentLink::Runnable(run) => {
                run(&self.viewer);
                true
            }
            ParentLink::History => {
                let viewer = self.viewer.clone();
                self.runtime.navigate_back(&viewer, &summary);
                true
            }
        }
    }

    /// Run `f` against this menu `delay` ticks from now.
    fn defer<F>(&self, delay: Tick, f: F)
    where
        F: FnOnce(&mut Menu) + Send + 'static,
    {
        let Some(inner) = self.self_ref.upgrade() else {
            return;
        };
        self.runtime
            .scheduler()
            .run_later(delay, Box::new(move || f(&mut inner.lock())));
    }

    fn start_auto_refresh(&mut self) {
        let Some(period) = self.options.refresh_interval_ticks else {
            return;
        };
        if self.refresh_task.is_some() {
            return;
        }
        let weak = self.self_ref.clone();
        let task = Box::new(move || {
            if let Some(inner) = weak.upgrade()
                && let Some(mut menu) = inner.try_lock()
                && let Err(err) = click::guarded(|| menu.refresh_all())
            {
                tracing::error!(
                    target: targets::MENU,
                    menu = %menu.id,
                    error = %err,
                    "auto refresh failed, closing menu"
                );
                let message = menu.options.error_message.clone();
                menu.viewer.send_message(&message);
                menu.close(CloseMode::Dismiss);
            }
        });
        match self.runtime.scheduler().run_repeating(period, period, task) {
            Ok(id) => self.refresh_task = Some(id),
            Err(err) => {
                tracing::warn!(target: targets::MENU, menu = %self.id, error = %err, "auto refresh not started");
            }
        }
    }

    fn stop_auto_refresh(&mut self) {
        if let Some(id) = self.refresh_task.take()
            && let Err(err) = self.runtime.scheduler().cancel(id)
        {
            tracing::trace!(target: targets::MENU, menu = %self.id, error = %err, "auto refresh already gone");
        }
    }
}

impl Drop for Menu {
    fn drop(&mut self) {
        self.stop_auto_refresh();
    }
}

impl fmt::Debug for Menu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Menu")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("layout", &self.layout)
            .field("viewer", &self.viewer.id())
            .field("bindings", &self.bindings)
            .field("page_areas", &self.page_areas)
            .field("parent", &self.parent)
            .field("shown", &self.shown)
            .finish_non_exhaustive()
    }
}

/// Shared handle to a [`Menu`].
#[derive(Clone)]
pub struct MenuHandle {
    id: MenuId,
    inner: Arc<Mutex<Menu>>,
    scheduler: Arc<dyn Scheduler>,
}

impl MenuHandle {
    pub fn id(&self) -> MenuId {
        self.id
    }

    /// Lock the menu.
    ///
    /// Do not call this from a click handler of the same menu; use
    /// [`ClickContext::menu_mut`] there.
    pub fn lock(&self) -> MutexGuard<'_, Menu> {
        self.inner.lock()
    }

    pub fn try_lock(&self) -> Option<MutexGuard<'_, Menu>> {
        self.inner.try_lock()
    }

    /// Run `f` with the menu locked.
    pub fn with<R>(&self, f: impl FnOnce(&mut Menu) -> R) -> R {
        f(&mut self.inner.lock())
    }

    /// Open the menu, or queue the open for the next tick if it is busy.
    pub fn open(&self) -> Result<()> {
        match self.inner.try_lock() {
            Some(mut menu) => menu.open(),
            None => {
                let handle = self.clone();
                self.scheduler.run(Box::new(move || {
                    if let Err(err) = handle.open() {
                        tracing::error!(target: targets::MENU, menu = %handle.id, error = %err, "queued open failed");
                    }
                }));
                Ok(())
            }
        }
    }

    /// Close the menu, or queue the close for the next tick if it is busy.
    pub fn close(&self, mode: CloseMode) {
        match self.inner.try_lock() {
            Some(mut menu) => menu.close(mode),
            None => {
                let handle = self.clone();
                self.scheduler.run(Box::new(move || handle.close(mode)));
            }
        }
    }

    pub fn ptr_eq(&self, other: &MenuHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn points_to(&self, menu: &Weak<Mutex<Menu>>) -> bool {
        std::ptr::eq(Arc::as_ptr(&self.inner), menu.as_ptr())
    }
}

impl fmt::Debug for MenuHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MenuHandle").field(&self.id).finish()
    }
}

static_assertions::assert_impl_all!(Menu: Send);
static_assertions::assert_impl_all!(MenuHandle: Send, Sync, Clone);
