//! Per-viewer state shared by all menus of a runtime.
//!
//! The session tracks which menu each viewer is looking at, which menu is
//! about to replace it, whether a click is being handled for the viewer and
//! the viewer's navigation history. It is also the entry point for platform
//! events: the adapter hands clicks, drags and closes to the session, which
//! routes them to the viewer's open menu.

use std::collections::HashMap;
use std::fmt;

use horizon_grid_core::logging::targets;
use parking_lot::RwLock;

use crate::event::{ClickEvent, DragEvent};
use crate::menu::{DispatchResult, MenuHandle, MenuId};
use crate::navigation::{NavigationHistory, NavigationNode, NavigationOrigin};
use crate::platform::ViewerId;

/// Registry of open menus, click flags and navigation histories.
#[derive(Default)]
pub struct MenuSession {
    open_menus: RwLock<HashMap<ViewerId, MenuHandle>>,
    opening: RwLock<HashMap<ViewerId, MenuId>>,
    processing: RwLock<HashMap<ViewerId, usize>>,
    histories: RwLock<HashMap<ViewerId, NavigationHistory>>,
}

impl MenuSession {
    pub fn new() -> Self {
        Self::default()
    }

    // -------------------------------------------------------------------------
    // Open menus
    // -------------------------------------------------------------------------

    /// The menu `viewer` is looking at.
    pub fn open_menu(&self, viewer: ViewerId) -> Option<MenuHandle> {
        self.open_menus.read().get(&viewer).cloned()
    }

    pub fn open_menu_count(&self) -> usize {
        self.open_menus.read().len()
    }

    pub(crate) fn register_open(&self, viewer: ViewerId, handle: MenuHandle) {
        self.open_menus.write().insert(viewer, handle);
    }

    /// Forget `menu` as the viewer's open menu. Does nothing if another menu
    /// has taken its place.
    pub(crate) fn unregister_open(&self, viewer: ViewerId, menu: MenuId) -> bool {
        let mut open = self.open_menus.write();
        if open.get(&viewer).is_some_and(|handle| handle.id() == menu) {
            open.remove(&viewer);
            true
        } else {
            false
        }
    }

    /// The menu currently being shown to `viewer`, if an open is under way.
    pub fn opening_menu(&self, viewer: ViewerId) -> Option<MenuId> {
        self.opening.read().get(&viewer).copied()
    }

    pub(crate) fn set_opening(&self, viewer: ViewerId, menu: MenuId) {
        self.opening.write().insert(viewer, menu);
    }

    pub(crate) fn clear_opening(&self, viewer: ViewerId, menu: MenuId) {
        let mut opening = self.opening.write();
        if opening.get(&viewer) == Some(&menu) {
            opening.remove(&viewer);
        }
    }

    // -------------------------------------------------------------------------
    // Click flags
    // -------------------------------------------------------------------------

    /// Whether a click is being handled for `viewer`.
    pub fn is_processing(&self, viewer: ViewerId) -> bool {
        self.processing.read().contains_key(&viewer)
    }

    pub(crate) fn begin_click(&self, viewer: ViewerId) {
        *self.processing.write().entry(viewer).or_insert(0) += 1;
    }

    pub(crate) fn end_click(&self, viewer: ViewerId) {
        let mut processing = self.processing.write();
        if let Some(depth) = processing.get_mut(&viewer) {
            *depth -= 1;
            if *depth == 0 {
                processing.remove(&viewer);
            }
        }
    }

    // -------------------------------------------------------------------------
    // Navigation histories
    // -------------------------------------------------------------------------

    /// Number of entries in the viewer's history.
    pub fn history_len(&self, viewer: ViewerId) -> usize {
        self.histories
            .read()
            .get(&viewer)
            .map_or(0, NavigationHistory::len)
    }

    pub fn has_history(&self, viewer: ViewerId) -> bool {
        self.history_len(viewer) > 0
    }

    /// Whether the viewer's open menu is the current entry of its history.
    pub fn is_navigation_current(&self, viewer: ViewerId) -> bool {
        let Some(open) = self.open_menu(viewer) else {
            return false;
        };
        self.histories
            .read()
            .get(&viewer)
            .and_then(NavigationHistory::top_menu)
            .is_some_and(|top| top == open.id())
    }

    /// Append a node. A history whose current entry is not `origin` is
    /// stale and replaced by a new chain. Returns the new length.
    pub(crate) fn push_navigation(
        &self,
        viewer: ViewerId,
        node: NavigationNode,
        origin: Option<NavigationOrigin>,
    ) -> usize {
        let mut histories = self.histories.write();
        let history = histories.entry(viewer).or_default();
        match origin {
            Some(origin) if history.top_menu() == Some(origin.menu) => {
                history.save_top_page(origin.page);
            }
            _ if !history.is_empty() => {
                tracing::debug!(target: targets::NAVIGATION, %viewer, "starting a new history chain");
                *history = NavigationHistory::default();
            }
            _ => {}
        }
        history.push(node);
        history.len()
    }

    /// Drop the current entry and return the previous one. An exhausted
    /// history is removed.
    pub(crate) fn step_back(&self, viewer: ViewerId) -> Option<NavigationNode> {
        let mut histories = self.histories.write();
        let previous = histories.get_mut(&viewer)?.pop();
        if previous.is_none() {
            histories.remove(&viewer);
        }
        previous
    }

    pub(crate) fn retarget_top(&self, viewer: ViewerId, menu: MenuId) {
        if let Some(history) = self.histories.write().get_mut(&viewer) {
            history.retarget_top(menu);
        }
    }

    /// Remove the viewer's history. Returns whether there was one.
    pub fn discard_history(&self, viewer: ViewerId) -> bool {
        self.histories.write().remove(&viewer).is_some()
    }

    /// Discard the viewer's history unless its open menu still belongs to it.
    pub fn cleanup_history(&self, viewer: ViewerId) {
        if self.is_navigation_current(viewer) {
            return;
        }
        if self.discard_history(viewer) {
            tracing::debug!(target: targets::NAVIGATION, %viewer, "history discarded");
        }
    }

    // -------------------------------------------------------------------------
    // Platform events
    // -------------------------------------------------------------------------

    /// Route a click to the viewer's open menu.
    pub fn dispatch_click(&self, event: &mut ClickEvent) -> DispatchResult {
        self.with_open_menu(event.viewer, |menu| menu.handle_click(event))
    }

    /// Route a drag to the viewer's open menu.
    pub fn dispatch_drag(&self, drag: &mut DragEvent) -> DispatchResult {
        self.with_open_menu(drag.viewer, |menu| menu.handle_drag(drag))
    }

    /// The platform closed the viewer's view.
    pub fn dispatch_close(&self, viewer: ViewerId) -> DispatchResult {
        self.with_open_menu(viewer, |menu| {
            menu.handle_view_closed();
            DispatchResult::Accepted
        })
    }

    fn with_open_menu(
        &self,
        viewer: ViewerId,
        f: impl FnOnce(&mut crate::menu::Menu) -> DispatchResult,
    ) -> DispatchResult {
        let Some(handle) = self.open_menu(viewer) else {
            return DispatchResult::MenuNotFound;
        };
        match handle.try_lock() {
            Some(mut menu) => f(&mut menu),
            None => {
                tracing::trace!(target: targets::MENU, %viewer, menu = %handle.id(), "menu busy, event dropped");
                DispatchResult::Busy
            }
        }
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Drop everything known about a disconnected viewer.
    pub fn forget_viewer(&self, viewer: ViewerId) {
        let handle = self.open_menus.write().remove(&viewer);
        if let Some(handle) = handle
            && let Some(mut menu) = handle.try_lock()
        {
            menu.detach();
        }
        self.opening.write().remove(&viewer);
        self.processing.write().remove(&viewer);
        self.histories.write().remove(&viewer);
        tracing::debug!(target: targets::NAVIGATION, %viewer, "viewer forgotten");
    }

    /// Detach every open menu and clear all state.
    pub fn shutdown(&self) {
        let open: Vec<MenuHandle> = self.open_menus.write().drain().map(|(_, h)| h).collect();
        for handle in &open {
            if let Some(mut menu) = handle.try_lock() {
                menu.detach();
            }
        }
        self.opening.write().clear();
        self.processing.write().clear();
        self.histories.write().clear();
        tracing::debug!(target: targets::MENU, menus = open.len(), "session shut down");
    }
}

impl fmt::Debug for MenuSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuSession")
            .field("open_menus", &self.open_menus.read().len())
            .field("histories", &self.histories.read().len())
            .finish_non_exhaustive()
    }
}

static_assertions::assert_impl_all!(MenuSession: Send, Sync);
