//! Click and drag events as delivered by the platform adapter.
//!
//! The adapter fills in a [`ClickEvent`] or [`DragEvent`], hands it to
//! [`MenuSession`](crate::MenuSession) and afterwards reads back
//! `cancelled`, `current` and `cursor` to apply the outcome on the host.

use std::collections::BTreeMap;

use crate::item::DisplayItem;
use crate::platform::{ContainerId, ViewerId};

/// Raw slot index reported for clicks outside the view.
pub const OUTSIDE_SLOT: i32 = -999;

/// Cells in the main part of a viewer's storage grid.
pub const STORAGE_MAIN_SLOTS: usize = 27;

/// Cells in the viewer's hotbar.
pub const HOTBAR_SLOTS: usize = 9;

/// Which mouse button or key produced a click.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ClickKind {
    #[default]
    Left,
    ShiftLeft,
    Right,
    ShiftRight,
    Middle,
    /// A hotbar number key.
    NumberKey,
    DoubleClick,
    Drop,
    ControlDrop,
    SwapOffhand,
    WindowBorderLeft,
    WindowBorderRight,
    Unknown,
}

impl ClickKind {
    pub fn is_shift(self) -> bool {
        matches!(self, Self::ShiftLeft | Self::ShiftRight)
    }

    pub fn is_left(self) -> bool {
        matches!(self, Self::Left | Self::ShiftLeft | Self::DoubleClick | Self::WindowBorderLeft)
    }

    pub fn is_right(self) -> bool {
        matches!(self, Self::Right | Self::ShiftRight | Self::WindowBorderRight)
    }

    /// Clicks made with the keyboard rather than the mouse.
    pub fn is_keyboard(self) -> bool {
        matches!(self, Self::NumberKey | Self::Drop | Self::ControlDrop | Self::SwapOffhand)
    }
}

/// What the host would do with the click if nothing cancelled it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ClickAction {
    #[default]
    Nothing,
    PickupAll,
    PickupSome,
    PickupHalf,
    PickupOne,
    PlaceAll,
    PlaceSome,
    PlaceOne,
    SwapWithCursor,
    DropAllCursor,
    DropOneCursor,
    DropAllSlot,
    DropOneSlot,
    MoveToOtherStorage,
    HotbarMoveAndReadd,
    HotbarSwap,
    CloneStack,
    CollectToCursor,
    Unknown,
}

impl ClickAction {
    /// Actions that put the held cursor content into the clicked cell.
    pub fn deposits_cursor(self) -> bool {
        matches!(
            self,
            Self::PlaceAll | Self::PlaceSome | Self::PlaceOne | Self::SwapWithCursor
        )
    }

    /// Actions that exchange the cell with a hotbar cell.
    pub fn is_hotbar_swap(self) -> bool {
        matches!(self, Self::HotbarSwap | Self::HotbarMoveAndReadd)
    }
}

/// Where a click landed relative to the open view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClickRegion {
    /// The menu's own grid.
    Top,
    /// The viewer's storage grid shown below the menu.
    Bottom,
    /// Outside the view.
    Outside,
    /// The platform could not tell.
    Unknown,
}

/// Map a raw view index onto a region and a region-local index.
///
/// Raw indices run through the menu grid first, then the main storage rows,
/// then the hotbar. Storage-local indices put the hotbar first.
pub fn locate_raw_slot(raw_slot: i32, top_size: usize) -> (ClickRegion, i32) {
    if raw_slot == OUTSIDE_SLOT || raw_slot < 0 {
        return (ClickRegion::Outside, OUTSIDE_SLOT);
    }
    let raw = raw_slot as usize;
    if raw < top_size {
        return (ClickRegion::Top, raw_slot);
    }
    let storage = raw - top_size;
    if storage < STORAGE_MAIN_SLOTS {
        (ClickRegion::Bottom, (storage + HOTBAR_SLOTS) as i32)
    } else if storage < STORAGE_MAIN_SLOTS + HOTBAR_SLOTS {
        (ClickRegion::Bottom, (storage - STORAGE_MAIN_SLOTS) as i32)
    } else {
        (ClickRegion::Unknown, raw_slot)
    }
}

/// One click on an open view.
#[derive(Debug, Clone, PartialEq)]
pub struct ClickEvent {
    pub viewer: ViewerId,
    /// The container clicked, `None` for clicks outside any container.
    pub container: Option<ContainerId>,
    pub region: ClickRegion,
    pub kind: ClickKind,
    pub action: ClickAction,
    /// Index across the whole view.
    pub raw_slot: i32,
    /// Index within `region`.
    pub slot: i32,
    /// The hotbar key pressed for [`ClickKind::NumberKey`].
    pub hotbar_button: Option<u8>,
    /// Content held on the cursor.
    pub cursor: Option<DisplayItem>,
    /// Content of the clicked cell.
    pub current: Option<DisplayItem>,
    pub cancelled: bool,
}

impl ClickEvent {
    /// A left click on cell `slot` of `region`.
    pub fn new(
        viewer: ViewerId,
        container: Option<ContainerId>,
        region: ClickRegion,
        raw_slot: i32,
        slot: i32,
    ) -> Self {
        Self {
            viewer,
            container,
            region,
            kind: ClickKind::Left,
            action: ClickAction::PickupAll,
            raw_slot,
            slot,
            hotbar_button: None,
            cursor: None,
            current: None,
            cancelled: false,
        }
    }

    /// A left click on the menu grid.
    pub fn top(viewer: ViewerId, container: ContainerId, slot: usize) -> Self {
        Self::new(viewer, Some(container), ClickRegion::Top, slot as i32, slot as i32)
    }

    /// A left click on the viewer's storage grid, given the raw view index.
    pub fn bottom(viewer: ViewerId, container: ContainerId, raw_slot: i32, top_size: usize) -> Self {
        let (region, slot) = locate_raw_slot(raw_slot, top_size);
        Self::new(viewer, Some(container), region, raw_slot, slot)
    }

    /// A click outside the view.
    pub fn outside(viewer: ViewerId, container: Option<ContainerId>) -> Self {
        Self::new(viewer, container, ClickRegion::Outside, OUTSIDE_SLOT, OUTSIDE_SLOT)
    }

    pub fn with_kind(mut self, kind: ClickKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_action(mut self, action: ClickAction) -> Self {
        self.action = action;
        self
    }

    pub fn with_cursor(mut self, cursor: Option<DisplayItem>) -> Self {
        self.cursor = cursor;
        self
    }

    pub fn with_current(mut self, current: Option<DisplayItem>) -> Self {
        self.current = current;
        self
    }

    pub fn with_hotbar_button(mut self, button: u8) -> Self {
        self.kind = ClickKind::NumberKey;
        self.action = ClickAction::HotbarSwap;
        self.hotbar_button = Some(button);
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn set_cancelled(&mut self, cancelled: bool) {
        self.cancelled = cancelled;
    }

    /// Whether the click targets the outside of the view.
    pub fn is_outside(&self) -> bool {
        self.container.is_none()
            || self.region == ClickRegion::Outside
            || self.slot == OUTSIDE_SLOT
    }

    /// Whether the click swaps the cell with a hotbar cell.
    pub fn is_hotbar_swap(&self) -> bool {
        self.kind == ClickKind::NumberKey || self.action.is_hotbar_swap()
    }

    /// Region-local index, when the click targets a cell.
    pub fn cell_index(&self) -> Option<usize> {
        usize::try_from(self.slot).ok()
    }
}

/// How a drag distributes the cursor content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DragKind {
    /// One item per cell (right mouse button).
    Single,
    /// The stack split evenly (left mouse button).
    Even,
}

/// A drag across one or more cells.
#[derive(Debug, Clone, PartialEq)]
pub struct DragEvent {
    pub viewer: ViewerId,
    pub container: Option<ContainerId>,
    pub kind: DragKind,
    /// Raw view indices of the cells the drag touches, keyed to the content
    /// the host would place there.
    pub new_items: BTreeMap<i32, DisplayItem>,
    /// Cursor content before the drag.
    pub old_cursor: Option<DisplayItem>,
    /// Cursor content after the drag.
    pub cursor: Option<DisplayItem>,
    pub cancelled: bool,
}

impl DragEvent {
    pub fn new(viewer: ViewerId, container: Option<ContainerId>, kind: DragKind) -> Self {
        Self {
            viewer,
            container,
            kind,
            new_items: BTreeMap::new(),
            old_cursor: None,
            cursor: None,
            cancelled: false,
        }
    }

    /// Add a touched cell.
    pub fn with_cell(mut self, raw_slot: i32, item: DisplayItem) -> Self {
        self.new_items.insert(raw_slot, item);
        self
    }

    pub fn with_cursor(mut self, old_cursor: Option<DisplayItem>, cursor: Option<DisplayItem>) -> Self {
        self.old_cursor = old_cursor;
        self.cursor = cursor;
        self
    }

    /// The touched raw indices in ascending order.
    pub fn raw_slots(&self) -> Vec<i32> {
        self.new_items.keys().copied().collect()
    }

    /// The click a drag over `raw_slot` amounts to.
    pub(crate) fn synthetic_click(&self, raw_slot: i32, top_size: usize) -> ClickEvent {
        let (region, slot) = locate_raw_slot(raw_slot, top_size);
        let (kind, action) = match self.kind {
            DragKind::Single => (ClickKind::Right, ClickAction::PlaceOne),
            DragKind::Even => (ClickKind::Left, ClickAction::PlaceSome),
        };
        ClickEvent {
            viewer: self.viewer,
            container: self.container,
            region,
            kind,
            action,
            raw_slot,
            slot,
            hotbar_button: None,
            cursor: self.old_cursor.clone(),
            current: None,
            cancelled: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate_top_and_outside() {
        assert_eq!(locate_raw_slot(0, 27), (ClickRegion::Top, 0));
        assert_eq!(locate_raw_slot(26, 27), (ClickRegion::Top, 26));
        assert_eq!(locate_raw_slot(OUTSIDE_SLOT, 27), (ClickRegion::Outside, OUTSIDE_SLOT));
        assert_eq!(locate_raw_slot(-1, 27).0, ClickRegion::Outside);
    }

    #[test]
    fn test_locate_storage_rows_then_hotbar() {
        // First main storage cell follows the hotbar in storage order.
        assert_eq!(locate_raw_slot(27, 27), (ClickRegion::Bottom, 9));
        assert_eq!(locate_raw_slot(27 + 26, 27), (ClickRegion::Bottom, 35));
        // Hotbar comes last in the raw view.
        assert_eq!(locate_raw_slot(27 + 27, 27), (ClickRegion::Bottom, 0));
        assert_eq!(locate_raw_slot(27 + 35, 27), (ClickRegion::Bottom, 8));
        assert_eq!(locate_raw_slot(27 + 36, 27).0, ClickRegion::Unknown);
    }

    #[test]
    fn test_outside_detection() {
        let viewer = ViewerId(1);
        assert!(ClickEvent::outside(viewer, None).is_outside());
        assert!(ClickEvent::outside(viewer, Some(ContainerId(1))).is_outside());
        assert!(!ClickEvent::top(viewer, ContainerId(1), 4).is_outside());
        assert_eq!(ClickEvent::top(viewer, ContainerId(1), 4).cell_index(), Some(4));
        assert_eq!(ClickEvent::outside(viewer, None).cell_index(), None);
    }

    #[test]
    fn test_hotbar_swap_detection() {
        let event = ClickEvent::top(ViewerId(1), ContainerId(1), 0).with_hotbar_button(3);
        assert!(event.is_hotbar_swap());
        assert_eq!(event.hotbar_button, Some(3));
        assert!(!ClickEvent::top(ViewerId(1), ContainerId(1), 0).is_hotbar_swap());
    }

    #[test]
    fn test_drag_synthesis() {
        let drag = DragEvent::new(ViewerId(1), Some(ContainerId(2)), DragKind::Single)
            .with_cell(3, DisplayItem::new("dirt"))
            .with_cell(30, DisplayItem::new("dirt"))
            .with_cursor(Some(DisplayItem::new("dirt").with_amount(5)), None);
        assert_eq!(drag.raw_slots(), vec![3, 30]);

        let top = drag.synthetic_click(3, 27);
        assert_eq!(top.region, ClickRegion::Top);
        assert_eq!(top.kind, ClickKind::Right);
        assert_eq!(top.action, ClickAction::PlaceOne);
        assert_eq!(top.cursor.as_ref().map(|c| c.amount()), Some(5));

        let bottom = drag.synthetic_click(30, 27);
        assert_eq!(bottom.region, ClickRegion::Bottom);
        assert_eq!(bottom.slot, 12);
    }

    #[test]
    fn test_kind_predicates() {
        assert!(ClickKind::ShiftLeft.is_shift());
        assert!(ClickKind::ShiftLeft.is_left());
        assert!(ClickKind::ShiftRight.is_right());
        assert!(ClickKind::NumberKey.is_keyboard());
        assert!(ClickAction::SwapWithCursor.deposits_cursor());
        assert!(!ClickAction::PickupAll.deposits_cursor());
    }
}
