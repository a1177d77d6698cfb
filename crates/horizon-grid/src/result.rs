//! Click results.
//!
//! A button answers a click with a [`ClickResult`]; the engine in
//! [`Menu`](crate::Menu) turns it into an effect on the interaction, the
//! clicked cell or the menu.

use std::fmt;
use std::sync::Arc;

use crate::context::ClickContext;

/// Maximum number of [`ClickResult::Forward`] hops applied for one click.
///
/// A chain longer than this is treated as a failing handler.
pub const MAX_FORWARD_DEPTH: usize = 32;

/// A deferred handler produced by [`ClickResult::Forward`].
pub type ForwardFn = Arc<dyn Fn(&mut ClickContext<'_>) -> Option<ClickResult> + Send + Sync>;

/// What should happen after a button has been clicked.
///
/// Apart from [`Allow`](Self::Allow), [`Forward`](Self::Forward) and
/// [`Custom`](Self::Custom), every variant leaves the raw interaction
/// cancelled: the menu owns the content of its cells.
#[derive(Clone, Default)]
pub enum ClickResult {
    /// Cancel the interaction.
    #[default]
    Cancel,
    /// Let the interaction go through.
    Allow,
    /// Empty the clicked cell.
    Clear,
    /// Lower the clicked stack by one; a stack of one is cleared.
    Decrement,
    /// Raise the clicked stack by one, up to [`DisplayItem::MAX_AMOUNT`](crate::DisplayItem::MAX_AMOUNT).
    Increment,
    /// Repaint the clicked cell.
    RefreshSlot,
    /// Repaint every bound cell.
    RefreshAll,
    /// Cancel, then close the menu and return to its parent.
    CancelAndClose,
    /// Run another handler with the same context and apply its result.
    Forward(ForwardFn),
    /// Hand a menu-defined result kind to the menu's custom result hook.
    /// Without a hook nothing happens.
    Custom(u32),
}

impl ClickResult {
    /// Wrap a closure as a forwarded result.
    pub fn forward<F>(handler: F) -> Self
    where
        F: Fn(&mut ClickContext<'_>) -> Option<ClickResult> + Send + Sync + 'static,
    {
        Self::Forward(Arc::new(handler))
    }

    /// Name of the variant, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Cancel => "cancel",
            Self::Allow => "allow",
            Self::Clear => "clear",
            Self::Decrement => "decrement",
            Self::Increment => "increment",
            Self::RefreshSlot => "refresh_slot",
            Self::RefreshAll => "refresh_all",
            Self::CancelAndClose => "cancel_and_close",
            Self::Forward(_) => "forward",
            Self::Custom(_) => "custom",
        }
    }

    /// Whether applying this result changes the clicked cell's content.
    pub fn mutates_cell(&self) -> bool {
        matches!(self, Self::Clear | Self::Decrement | Self::Increment)
    }
}

impl fmt::Debug for ClickResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cancel => f.write_str("Cancel"),
            Self::Allow => f.write_str("Allow"),
            Self::Clear => f.write_str("Clear"),
            Self::Decrement => f.write_str("Decrement"),
            Self::Increment => f.write_str("Increment"),
            Self::RefreshSlot => f.write_str("RefreshSlot"),
            Self::RefreshAll => f.write_str("RefreshAll"),
            Self::CancelAndClose => f.write_str("CancelAndClose"),
            Self::Forward(_) => f.write_str("Forward(..)"),
            Self::Custom(kind) => f.debug_tuple("Custom").field(kind).finish(),
        }
    }
}

impl PartialEq for ClickResult {
    /// Forwarded results compare by handler identity.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Forward(a), Self::Forward(b)) => Arc::ptr_eq(a, b),
            (Self::Custom(a), Self::Custom(b)) => a == b,
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }
}

static_assertions::assert_impl_all!(ClickResult: Send, Sync, Clone);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_cancel() {
        assert_eq!(ClickResult::default(), ClickResult::Cancel);
    }

    #[test]
    fn test_names_and_debug() {
        assert_eq!(ClickResult::RefreshAll.name(), "refresh_all");
        assert_eq!(format!("{:?}", ClickResult::Custom(3)), "Custom(3)");
        assert_eq!(format!("{:?}", ClickResult::CancelAndClose), "CancelAndClose");
        let forward = ClickResult::forward(|_| None);
        assert_eq!(format!("{forward:?}"), "Forward(..)");
    }

    #[test]
    fn test_forward_equality_is_identity() {
        let a = ClickResult::forward(|_| Some(ClickResult::Allow));
        let b = ClickResult::forward(|_| Some(ClickResult::Allow));
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
        assert_ne!(ClickResult::Custom(1), ClickResult::Custom(2));
    }

    #[test]
    fn test_mutates_cell() {
        assert!(ClickResult::Decrement.mutates_cell());
        assert!(!ClickResult::RefreshSlot.mutates_cell());
    }
}
