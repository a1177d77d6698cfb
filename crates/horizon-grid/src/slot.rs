//! Cell addresses.
//!
//! A [`Slot`] names one cell, either in the menu's own grid or in the
//! viewer's storage grid. Two slots are the same slot when both the index and
//! the grid agree; the optional placement permission is metadata and does not
//! take part in identity.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::button::Button;
use crate::platform::Viewer;

/// Plain, copyable address of a cell. Used as the key of binding maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotKey {
    pub index: usize,
    pub viewer_storage: bool,
}

impl SlotKey {
    pub fn menu(index: usize) -> Self {
        Self {
            index,
            viewer_storage: false,
        }
    }

    pub fn storage(index: usize) -> Self {
        Self {
            index,
            viewer_storage: true,
        }
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.viewer_storage {
            write!(f, "storage[{}]", self.index)
        } else {
            write!(f, "menu[{}]", self.index)
        }
    }
}

/// A cell address with an optional placement permission.
#[derive(Clone)]
pub struct Slot {
    key: SlotKey,
    permission: Option<Arc<str>>,
}

impl Slot {
    /// A cell of the menu's own grid.
    pub fn new(index: usize) -> Self {
        Self {
            key: SlotKey::menu(index),
            permission: None,
        }
    }

    /// A cell of the viewer's storage grid.
    pub fn storage(index: usize) -> Self {
        Self {
            key: SlotKey::storage(index),
            permission: None,
        }
    }

    /// Only paint buttons here for viewers holding `permission`.
    pub fn with_permission(mut self, permission: impl Into<Arc<str>>) -> Self {
        self.permission = Some(permission.into());
        self
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.key.index
    }

    #[inline]
    pub fn is_viewer_storage(&self) -> bool {
        self.key.viewer_storage
    }

    #[inline]
    pub fn key(&self) -> SlotKey {
        self.key
    }

    pub fn permission(&self) -> Option<&str> {
        self.permission.as_deref()
    }

    /// Whether `button` may be placed in this cell for `viewer`.
    ///
    /// Placement is refused when the viewer lacks the slot's permission or
    /// when the button hides itself from the viewer.
    pub fn try_place(&self, button: &dyn Button, viewer: &dyn Viewer) -> bool {
        if let Some(permission) = &self.permission
            && !viewer.has_permission(permission)
        {
            return false;
        }
        button.visible_to(viewer)
    }
}

impl From<SlotKey> for Slot {
    fn from(key: SlotKey) -> Self {
        Self {
            key,
            permission: None,
        }
    }
}

impl PartialEq for Slot {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Slot {}

impl Hash for Slot {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Debug for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Slot");
        s.field("index", &self.key.index)
            .field("viewer_storage", &self.key.viewer_storage);
        if let Some(permission) = &self.permission {
            s.field("permission", permission);
        }
        s.finish()
    }
}
