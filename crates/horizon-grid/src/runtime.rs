//! The collaborators every menu of a host shares.

use std::fmt;
use std::sync::Arc;

use horizon_grid_core::Scheduler;

use crate::menu::MenuBuilder;
use crate::platform::{ContainerFactory, ViewerRef};
use crate::session::MenuSession;

/// Scheduler, container factory and session, bundled.
///
/// Cloning is cheap; every menu keeps a clone.
#[derive(Clone)]
pub struct MenuRuntime {
    scheduler: Arc<dyn Scheduler>,
    containers: Arc<dyn ContainerFactory>,
    session: Arc<MenuSession>,
}

impl MenuRuntime {
    /// Create a runtime with a fresh session.
    pub fn new(scheduler: Arc<dyn Scheduler>, containers: Arc<dyn ContainerFactory>) -> Self {
        Self::with_session(scheduler, containers, Arc::new(MenuSession::new()))
    }

    pub fn with_session(
        scheduler: Arc<dyn Scheduler>,
        containers: Arc<dyn ContainerFactory>,
        session: Arc<MenuSession>,
    ) -> Self {
        Self {
            scheduler,
            containers,
            session,
        }
    }

    pub fn scheduler(&self) -> &Arc<dyn Scheduler> {
        &self.scheduler
    }

    pub fn containers(&self) -> &Arc<dyn ContainerFactory> {
        &self.containers
    }

    pub fn session(&self) -> &Arc<MenuSession> {
        &self.session
    }

    /// Start building a menu for `viewer`.
    pub fn menu(&self, viewer: ViewerRef) -> MenuBuilder {
        MenuBuilder::new(self, viewer)
    }
}

impl fmt::Debug for MenuRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuRuntime")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

static_assertions::assert_impl_all!(MenuRuntime: Send, Sync, Clone);
