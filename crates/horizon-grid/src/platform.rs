//! Host collaborator traits.
//!
//! The engine never talks to a game server, terminal or window system
//! directly. A platform adapter implements these traits and forwards the
//! host's click, drag and close notifications into
//! [`MenuSession`](crate::MenuSession).

use std::fmt;
use std::sync::Arc;

use crate::item::DisplayItem;
use crate::menu::MenuId;

/// Stable identity of a viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewerId(pub u64);

impl fmt::Display for ViewerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "viewer#{}", self.0)
    }
}

/// A remote party a menu is shown to.
pub trait Viewer: Send + Sync {
    fn id(&self) -> ViewerId;

    /// Show a chat or status message to the viewer.
    fn send_message(&self, message: &str);

    /// Whether the viewer holds `permission`. Defaults to allowing everything.
    fn has_permission(&self, _permission: &str) -> bool {
        true
    }
}

/// Shared viewer handle.
pub type ViewerRef = Arc<dyn Viewer>;

/// Identity of a materialized container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContainerId(pub u64);

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "container#{}", self.0)
    }
}

/// A grid of cells that can be painted.
///
/// Implementations use interior mutability; painting happens through `&self`.
pub trait Container: Send + Sync {
    fn id(&self) -> ContainerId;

    /// Number of cells.
    fn size(&self) -> usize;

    /// Content of cell `index`, `None` when empty or out of range.
    fn item(&self, index: usize) -> Option<DisplayItem>;

    /// Paint cell `index`. Out-of-range indices are ignored.
    fn set_item(&self, index: usize, item: Option<DisplayItem>);

    /// Empty every cell.
    fn clear(&self) {
        for index in 0..self.size() {
            self.set_item(index, None);
        }
    }
}

/// Shared container handle.
pub type ContainerRef = Arc<dyn Container>;

/// Shape of a materialized container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    /// A chest with `1..=6` rows of nine cells.
    Chest,
    /// Five cells in a single row.
    Hopper,
    /// A 3x3 grid.
    Dispenser,
    /// A 3x3 grid.
    Dropper,
}

impl ContainerKind {
    /// Width of one row of cells.
    pub fn row_width(self) -> usize {
        match self {
            Self::Chest => 9,
            Self::Hopper => 5,
            Self::Dispenser | Self::Dropper => 3,
        }
    }
}

/// Everything a factory needs to build a container for a menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSpec {
    pub kind: ContainerKind,
    pub size: usize,
    pub title: String,
    /// The menu that will own the container.
    pub holder: MenuId,
}

/// Creates containers and shows them to viewers.
pub trait ContainerFactory: Send + Sync {
    /// Build a new, empty container.
    fn build(&self, spec: &ContainerSpec) -> ContainerRef;

    /// Show `container` to `viewer`, replacing whatever view they had.
    fn open(&self, container: &ContainerRef, viewer: &ViewerRef);

    /// Dismiss the viewer's current view.
    fn close_view(&self, viewer: &ViewerRef);

    /// The viewer's own storage grid, if the platform exposes one.
    fn viewer_storage(&self, viewer: &ViewerRef) -> Option<ContainerRef>;
}

static_assertions::assert_obj_safe!(Viewer, Container, ContainerFactory);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_widths() {
        assert_eq!(ContainerKind::Chest.row_width(), 9);
        assert_eq!(ContainerKind::Hopper.row_width(), 5);
        assert_eq!(ContainerKind::Dropper.row_width(), 3);
    }

    #[test]
    fn test_id_display() {
        assert_eq!(ViewerId(7).to_string(), "viewer#7");
        assert_eq!(ContainerId(3).to_string(), "container#3");
    }
}
