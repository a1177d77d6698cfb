//! Container shapes a menu can take.

use crate::error::{GridError, Result};
use crate::platform::ContainerKind;

/// The grid a menu is painted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuLayout {
    /// A chest with `rows` rows of nine cells.
    Chest { rows: usize },
    /// A fixed-shape container (hopper, dispenser, dropper).
    Fixed(ContainerKind),
}

impl Default for MenuLayout {
    fn default() -> Self {
        Self::Chest { rows: 3 }
    }
}

impl MenuLayout {
    pub const MAX_CHEST_ROWS: usize = 6;

    pub fn chest(rows: usize) -> Self {
        Self::Chest { rows }
    }

    pub fn kind(&self) -> ContainerKind {
        match self {
            Self::Chest { .. } => ContainerKind::Chest,
            Self::Fixed(kind) => *kind,
        }
    }

    pub fn row_width(&self) -> usize {
        self.kind().row_width()
    }

    pub fn rows(&self) -> usize {
        match self {
            Self::Chest { rows } => *rows,
            Self::Fixed(ContainerKind::Hopper) => 1,
            Self::Fixed(_) => 3,
        }
    }

    /// Number of cells.
    pub fn size(&self) -> usize {
        self.rows() * self.row_width()
    }

    /// Index of the first cell of the bottom row.
    pub fn last_row_start(&self) -> usize {
        self.size().saturating_sub(self.row_width())
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Chest { rows } if *rows == 0 || *rows > Self::MAX_CHEST_ROWS => Err(
                GridError::invalid_layout(format!(
                    "a chest needs 1 to {} rows, got {rows}",
                    Self::MAX_CHEST_ROWS
                )),
            ),
            Self::Fixed(ContainerKind::Chest) => Err(GridError::invalid_layout(
                "chest layouts are declared with MenuLayout::Chest",
            )),
            _ => Ok(()),
        }
    }
}
