//! Per-menu click policy.
//!
//! Options are plain data so they can live in a host configuration file:
//!
//! ```
//! use horizon_grid::MenuOptions;
//!
//! let options = MenuOptions::from_toml_str(r#"
//! cancel_bottom_clicks = true
//! refresh_interval_ticks = 20
//! "#).unwrap();
//! assert!(options.cancel_bottom_clicks);
//! assert!(options.cancel_outside_clicks);
//! assert_eq!(options.refresh_interval_ticks, Some(20));
//! ```

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Message shown to a viewer when a click handler fails.
pub const DEFAULT_ERROR_MESSAGE: &str = "An error occurred while processing your click.";

/// Policy flags consulted by the click engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuOptions {
    /// Cancel clicks outside the view.
    pub cancel_outside_clicks: bool,
    /// Cancel clicks on empty menu cells without a binding.
    pub cancel_unbound_clicks: bool,
    /// Cancel hotbar-key swaps into empty unbound cells.
    pub cancel_hotbar_swaps: bool,
    /// Cancel clicks that would drop the cursor's content into a bound cell.
    pub guard_cursor_deposit: bool,
    /// Cancel every click on the viewer's storage grid.
    pub cancel_bottom_clicks: bool,
    /// Cancel shift-clicks that move content between the grids.
    pub cancel_shift_moves: bool,
    /// Resolve storage clicks against storage bindings.
    pub storage_interactive: bool,
    /// When the viewer closes the view, return to the parent menu.
    pub reopen_parent_on_close: bool,
    /// Repaint every bound cell this often while the menu is open.
    pub refresh_interval_ticks: Option<u64>,
    /// Message shown when a handler fails.
    pub error_message: String,
}

impl Default for MenuOptions {
    fn default() -> Self {
        Self {
            cancel_outside_clicks: true,
            cancel_unbound_clicks: true,
            cancel_hotbar_swaps: true,
            guard_cursor_deposit: true,
            cancel_bottom_clicks: false,
            cancel_shift_moves: true,
            storage_interactive: false,
            reopen_parent_on_close: false,
            refresh_interval_ticks: None,
            error_message: DEFAULT_ERROR_MESSAGE.to_string(),
        }
    }
}

impl MenuOptions {
    /// Parse options from TOML. Missing keys keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Serialize to TOML.
    pub fn to_toml_string(&self) -> String {
        toml::to_string(self).unwrap_or_default()
    }

    /// Options for a menu that lets content move freely.
    pub fn permissive() -> Self {
        Self {
            cancel_outside_clicks: false,
            cancel_unbound_clicks: false,
            cancel_hotbar_swaps: false,
            guard_cursor_deposit: false,
            cancel_shift_moves: false,
            ..Self::default()
        }
    }

    pub fn with_refresh_interval(mut self, ticks: u64) -> Self {
        self.refresh_interval_ticks = (ticks > 0).then_some(ticks);
        self
    }

    pub fn with_error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = message.into();
        self
    }
}
