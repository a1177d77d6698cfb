//! Error types for the menu engine.

use horizon_grid_core::SchedulerError;

/// Result type alias for menu operations.
pub type Result<T> = std::result::Result<T, GridError>;

/// Errors that can occur while building menus or handling clicks.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// A click could not be assigned to the top grid, the viewer's storage
    /// or the outside of the view.
    #[error("click on raw slot {raw_slot} could not be classified")]
    UnclassifiedRegion { raw_slot: i32 },

    /// A chain of forwarded results did not terminate.
    #[error("forwarded click results exceeded the maximum depth of {depth}")]
    ForwardDepthExceeded { depth: usize },

    /// A button, hook or forwarded result panicked.
    #[error("click handler panicked: {message}")]
    HandlerPanicked { message: String },

    /// The menu layout cannot be materialized.
    #[error("invalid menu layout: {0}")]
    InvalidLayout(String),

    /// A slot lies outside the menu grid.
    #[error("slot {index} is outside a grid of {size} cells")]
    SlotOutOfBounds { index: usize, size: usize },

    /// No page area exists with this id.
    #[error("unknown page area {0}")]
    UnknownPageArea(usize),

    /// Menu options could not be parsed.
    #[error("invalid menu options: {0}")]
    InvalidConfig(#[from] toml::de::Error),

    /// The scheduler rejected a request.
    #[error("scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    /// A navigation recipe failed to rebuild its menu.
    #[error("menu reconstruction failed: {0}")]
    Reconstruction(String),
}

impl GridError {
    /// Create an invalid layout error.
    pub fn invalid_layout(message: impl Into<String>) -> Self {
        Self::InvalidLayout(message.into())
    }

    /// Create a handler panic error from a `catch_unwind` payload.
    pub(crate) fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "<non-string panic payload>".to_string()
        };
        Self::HandlerPanicked { message }
    }

    /// Whether this error came out of user handler code rather than the
    /// engine's own bookkeeping.
    pub fn is_handler_failure(&self) -> bool {
        matches!(
            self,
            Self::HandlerPanicked { .. } | Self::ForwardDepthExceeded { .. }
        )
    }
}
