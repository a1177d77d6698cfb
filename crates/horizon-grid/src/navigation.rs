//! Back navigation.
//!
//! Every viewer has at most one navigation history: a stack of
//! [`MenuRecipe`]s, one per menu opened with history. The menus themselves
//! are not retained. Going back pops the current entry and rebuilds the
//! previous menu from its recipe, so long chains only keep closures alive.
//!
//! A history is discarded when the chain is exhausted, or a short while
//! after a navigation-owned menu closes if the viewer has moved on to a menu
//! outside the chain.

use std::fmt;
use std::sync::Arc;

use horizon_grid_core::Tick;
use horizon_grid_core::logging::targets;

use crate::error::Result;
use crate::menu::{MenuHandle, MenuId, MenuSummary, ParentLink};
use crate::page_area::PageAreaId;
use crate::platform::{ViewerId, ViewerRef};
use crate::runtime::MenuRuntime;

/// Ticks to wait after a navigation-owned menu closes before checking
/// whether its history is still in use.
pub const HISTORY_CLEANUP_DELAY_TICKS: Tick = 2;

/// Builds a menu for a viewer.
///
/// The flag is `true` when the menu is being rebuilt by a back navigation
/// rather than opened for the first time.
pub type MenuRecipe = Arc<dyn Fn(&ViewerRef, bool) -> Result<MenuHandle> + Send + Sync>;

/// Wrap a closure as a [`MenuRecipe`].
pub fn recipe(
    f: impl Fn(&ViewerRef, bool) -> Result<MenuHandle> + Send + Sync + 'static,
) -> MenuRecipe {
    Arc::new(f)
}

/// One entry of a history.
#[derive(Clone)]
pub(crate) struct NavigationNode {
    pub recipe: MenuRecipe,
    /// The live menu currently standing for this entry.
    pub menu: MenuId,
    /// Page the menu showed when the viewer navigated away from it.
    pub saved_page: Option<usize>,
}

impl fmt::Debug for NavigationNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationNode")
            .field("menu", &self.menu)
            .field("saved_page", &self.saved_page)
            .finish_non_exhaustive()
    }
}

/// The menu a history navigation starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NavigationOrigin {
    pub menu: MenuId,
    pub page: Option<usize>,
}

/// A viewer's back stack. The last node is the current menu.
#[derive(Debug, Default, Clone)]
pub(crate) struct NavigationHistory {
    nodes: Vec<NavigationNode>,
}

impl NavigationHistory {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn top_menu(&self) -> Option<MenuId> {
        self.nodes.last().map(|node| node.menu)
    }

    pub fn push(&mut self, node: NavigationNode) {
        self.nodes.push(node);
    }

    pub fn save_top_page(&mut self, page: Option<usize>) {
        if let Some(top) = self.nodes.last_mut() {
            top.saved_page = page;
        }
    }

    /// Drop the current node. Returns the node that is current afterwards.
    pub fn pop(&mut self) -> Option<NavigationNode> {
        self.nodes.pop();
        self.nodes.last().cloned()
    }

    /// Point the current node at a rebuilt menu.
    pub fn retarget_top(&mut self, menu: MenuId) {
        if let Some(top) = self.nodes.last_mut() {
            top.menu = menu;
        }
    }
}

impl MenuRuntime {
    /// Build a menu from `recipe`, open it and record it in the viewer's
    /// history.
    ///
    /// If the viewer's open menu is the current entry of its history, the
    /// new menu extends the chain; otherwise a new chain starts.
    pub fn open_with_history(&self, viewer: &ViewerRef, recipe: MenuRecipe) -> Result<MenuHandle> {
        let origin = self.session().open_menu(viewer.id()).map(|handle| {
            match handle.try_lock() {
                Some(menu) => NavigationOrigin {
                    menu: menu.id(),
                    page: menu.current_page(),
                },
                // Locked by the caller; the page is unknown.
                None => NavigationOrigin {
                    menu: handle.id(),
                    page: None,
                },
            }
        });
        self.open_with_history_from(viewer, recipe, origin)
    }

    pub(crate) fn open_with_history_from(
        &self,
        viewer: &ViewerRef,
        recipe: MenuRecipe,
        origin: Option<NavigationOrigin>,
    ) -> Result<MenuHandle> {
        let handle = recipe(viewer, false)?;
        mark_navigation_owned(&handle);

        let depth = self.session().push_navigation(
            viewer.id(),
            NavigationNode {
                recipe,
                menu: handle.id(),
                saved_page: None,
            },
            origin,
        );
        tracing::debug!(
            target: targets::NAVIGATION,
            viewer = %viewer.id(),
            menu = %handle.id(),
            depth,
            "navigated forward"
        );
        handle.open()?;
        Ok(handle)
    }

    /// Replace the closing menu with the previous entry of the viewer's
    /// history, or dismiss the view if there is none.
    pub(crate) fn navigate_back(&self, viewer: &ViewerRef, closing: &MenuSummary) {
        let viewer_id = viewer.id();
        let Some(node) = self.session().step_back(viewer_id) else {
            tracing::debug!(target: targets::NAVIGATION, viewer = %viewer_id, "history exhausted");
            self.containers().close_view(viewer);
            return;
        };

        let handle = match (node.recipe)(viewer, true) {
            Ok(handle) => handle,
            Err(err) => {
                tracing::error!(
                    target: targets::NAVIGATION,
                    viewer = %viewer_id,
                    error = %err,
                    "failed to rebuild previous menu"
                );
                self.session().discard_history(viewer_id);
                self.containers().close_view(viewer);
                return;
            }
        };

        match handle.try_lock() {
            Some(mut menu) => {
                menu.set_navigation_owned(true);
                menu.set_parent(ParentLink::History);
                if closing.paginated
                    && menu.is_paginated()
                    && let Some(saved) = node.saved_page
                {
                    let last = menu.max_page().unwrap_or(saved);
                    if let Err(err) = menu.set_page(PageAreaId::FIRST, saved.min(last)) {
                        tracing::warn!(target: targets::NAVIGATION, error = %err, "page not restored");
                    }
                }
            }
            None => {
                tracing::warn!(target: targets::NAVIGATION, menu = %handle.id(), "rebuilt menu is busy");
            }
        }

        self.session().retarget_top(viewer_id, handle.id());
        tracing::debug!(
            target: targets::NAVIGATION,
            viewer = %viewer_id,
            from = %closing.id,
            to = %handle.id(),
            "navigated back"
        );
        if let Err(err) = handle.open() {
            tracing::error!(target: targets::NAVIGATION, menu = %handle.id(), error = %err, "failed to open previous menu");
            self.containers().close_view(viewer);
        }
    }

    /// Check the viewer's history once the current close has settled.
    pub(crate) fn schedule_history_cleanup(&self, viewer: ViewerId) {
        let session = Arc::downgrade(self.session());
        self.scheduler().run_later(
            HISTORY_CLEANUP_DELAY_TICKS,
            Box::new(move || {
                if let Some(session) = session.upgrade() {
                    session.cleanup_history(viewer);
                }
            }),
        );
    }
}

fn mark_navigation_owned(handle: &MenuHandle) {
    match handle.try_lock() {
        Some(mut menu) => {
            menu.set_navigation_owned(true);
            menu.set_parent(ParentLink::History);
        }
        None => {
            tracing::warn!(target: targets::NAVIGATION, menu = %handle.id(), "menu busy, not linked to history");
        }
    }
}
