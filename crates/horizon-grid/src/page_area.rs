//! Paged regions of a menu.
//!
//! A [`PageArea`] shows a long list of buttons a page at a time in an ordered
//! region of cells. The page's items are bound in the
//! [`Default`](crate::BindingTier::Default) tier and the navigation buttons
//! in the [`Edit`](crate::BindingTier::Edit) tier, so navigation always wins
//! over content when both claim the same cell.
//!
//! ```
//! use horizon_grid::{DisplayItem, PageArea, PageButtonType, Slot, StaticButton};
//!
//! let items = (0..20)
//!     .map(|i| StaticButton::new(DisplayItem::new(format!("item_{i}"))).into_ref());
//! let area = PageArea::new((0..9).map(Slot::new))
//!     .with_items(items)
//!     .with_nav_button(PageButtonType::Next, DisplayItem::new("arrow"));
//! assert_eq!(area.max_page(), 3);
//! ```

use std::fmt;
use std::sync::Arc;

use crate::binding::{BindingRegistry, BindingTier};
use crate::button::{Button, ButtonRef};
use crate::context::ClickContext;
use crate::error::{GridError, Result};
use crate::item::DisplayItem;
use crate::menu::MenuLayout;
use crate::pagination::Pagination;
use crate::platform::Viewer;
use crate::result::ClickResult;
use crate::slot::{Slot, SlotKey};

/// Index of a page area within its menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageAreaId(pub(crate) usize);

impl PageAreaId {
    /// The first area added to a menu, which drives its page state.
    pub const FIRST: Self = Self(0);

    pub fn index(self) -> usize {
        self.0
    }
}

/// The four page navigation controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageButtonType {
    First,
    Previous,
    Next,
    Last,
}

impl PageButtonType {
    pub const ALL: [PageButtonType; 4] = [Self::First, Self::Previous, Self::Next, Self::Last];

    /// The page this control moves to from `current`.
    pub fn target_page<T>(self, current: usize, pagination: &Pagination<T>) -> usize {
        let page = match self {
            Self::First => pagination.min_page(),
            Self::Previous => current.saturating_sub(1),
            Self::Next => current.saturating_add(1),
            Self::Last => pagination.max_page(),
        };
        pagination.clamp_page(page)
    }

    /// Whether the control has anywhere to go from `current`.
    pub fn is_available<T>(self, current: usize, pagination: &Pagination<T>) -> bool {
        match self {
            Self::First => current > pagination.min_page(),
            Self::Previous => pagination.has_previous(current),
            Self::Next => pagination.has_next(current),
            Self::Last => current < pagination.max_page(),
        }
    }

    /// The conventional cell for this control: the bottom row, with first and
    /// last at the edges and previous and next either side of the centre.
    pub fn recommended_slot(self, layout: &MenuLayout) -> Slot {
        let width = layout.row_width();
        let column = match self {
            Self::First => 0,
            Self::Previous => (width / 2).saturating_sub(1),
            Self::Next => (width / 2 + 1).min(width - 1),
            Self::Last => width - 1,
        };
        Slot::new(layout.last_row_start() + column)
    }
}

#[derive(Debug, Clone)]
struct NavButtonSpec {
    kind: PageButtonType,
    /// `None` until resolved against the menu layout.
    slot: Option<Slot>,
    item: DisplayItem,
}

/// The button bound for an available navigation control.
struct PageNavButton {
    area: PageAreaId,
    kind: PageButtonType,
    item: DisplayItem,
}

impl Button for PageNavButton {
    fn display(&self, _viewer: &dyn Viewer) -> Option<DisplayItem> {
        Some(self.item.clone())
    }

    fn on_click(&self, ctx: &mut ClickContext<'_>) -> Option<ClickResult> {
        if let Err(err) = ctx.menu_mut().turn_page(self.area, self.kind) {
            tracing::warn!(
                target: horizon_grid_core::logging::targets::MENU,
                error = %err,
                "page navigation failed"
            );
        }
        Some(ClickResult::Cancel)
    }
}

/// A region of cells showing one page of a button list.
#[derive(Clone)]
pub struct PageArea {
    region: Vec<Slot>,
    pagination: Pagination<ButtonRef>,
    current_page: usize,
    nav_buttons: Vec<NavButtonSpec>,
}

impl PageArea {
    /// A page area over `region`, in display order. Each page holds as many
    /// items as the region has cells.
    pub fn new(region: impl IntoIterator<Item = Slot>) -> Self {
        let region: Vec<Slot> = region.into_iter().collect();
        let per_page = region.len();
        Self {
            region,
            pagination: Pagination::new(Vec::new(), per_page),
            current_page: 1,
            nav_buttons: Vec::new(),
        }
    }

    /// A rectangular region of the menu grid, row by row.
    pub fn rect(top_left: usize, width: usize, height: usize, row_width: usize) -> Self {
        Self::new((0..height).flat_map(move |row| {
            (0..width).map(move |column| Slot::new(top_left + row * row_width + column))
        }))
    }

    pub fn with_items(mut self, items: impl IntoIterator<Item = ButtonRef>) -> Self {
        self.set_items(items.into_iter().collect());
        self
    }

    pub fn with_page(mut self, page: usize) -> Self {
        self.set_page(page);
        self
    }

    /// Add a navigation control in its recommended cell.
    pub fn with_nav_button(mut self, kind: PageButtonType, item: DisplayItem) -> Self {
        self.nav_buttons.push(NavButtonSpec {
            kind,
            slot: None,
            item,
        });
        self
    }

    /// Add a navigation control in a chosen cell.
    pub fn with_nav_button_at(mut self, kind: PageButtonType, slot: Slot, item: DisplayItem) -> Self {
        self.nav_buttons.push(NavButtonSpec {
            kind,
            slot: Some(slot),
            item,
        });
        self
    }

    pub fn region(&self) -> &[Slot] {
        &self.region
    }

    pub fn elements_per_page(&self) -> usize {
        self.region.len()
    }

    pub fn pagination(&self) -> &Pagination<ButtonRef> {
        &self.pagination
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn max_page(&self) -> usize {
        self.pagination.max_page()
    }

    /// The buttons shown on the current page.
    pub fn page_items(&self) -> &[ButtonRef] {
        self.pagination.elements_for(self.current_page)
    }

    /// Replace the item list. The current page is clamped to the new range.
    pub fn set_items(&mut self, items: Vec<ButtonRef>) {
        self.pagination = Pagination::new(items, self.region.len());
        self.current_page = self.pagination.clamp_page(self.current_page);
    }

    /// Move to `page`, clamped into range. Returns the page now shown.
    pub fn set_page(&mut self, page: usize) -> usize {
        self.current_page = self.pagination.clamp_page(page);
        self.current_page
    }

    pub fn can_turn(&self, kind: PageButtonType) -> bool {
        kind.is_available(self.current_page, &self.pagination)
    }

    /// The cell of the `kind` control, once resolved.
    pub fn nav_slot(&self, kind: PageButtonType) -> Option<&Slot> {
        self.nav_buttons
            .iter()
            .find(|nav| nav.kind == kind)
            .and_then(|nav| nav.slot.as_ref())
    }

    /// Every address this area may bind.
    pub fn addresses(&self) -> Vec<SlotKey> {
        self.region
            .iter()
            .chain(self.nav_buttons.iter().filter_map(|nav| nav.slot.as_ref()))
            .map(Slot::key)
            .collect()
    }

    pub(crate) fn resolve_nav_slots(&mut self, layout: &MenuLayout) {
        for nav in &mut self.nav_buttons {
            if nav.slot.is_none() {
                nav.slot = Some(nav.kind.recommended_slot(layout));
            }
        }
    }

    pub(crate) fn validate(&self, size: usize) -> Result<()> {
        if self.region.is_empty() {
            return Err(GridError::invalid_layout("page area region is empty"));
        }
        let cells = self
            .region
            .iter()
            .chain(self.nav_buttons.iter().filter_map(|nav| nav.slot.as_ref()));
        for slot in cells {
            if !slot.is_viewer_storage() && slot.index() >= size {
                return Err(GridError::SlotOutOfBounds {
                    index: slot.index(),
                    size,
                });
            }
        }
        Ok(())
    }

    /// Bind the current page and the available navigation controls.
    pub(crate) fn populate(&self, id: PageAreaId, registry: &mut BindingRegistry) {
        let items = self.page_items();
        for (position, slot) in self.region.iter().enumerate() {
            match items.get(position) {
                Some(button) => {
                    registry.set(BindingTier::Default, slot.clone(), button.clone());
                }
                None => {
                    registry.remove(BindingTier::Default, slot.key());
                }
            }
        }

        for nav in &self.nav_buttons {
            let Some(slot) = &nav.slot else {
                continue;
            };
            if self.can_turn(nav.kind) {
                let button = PageNavButton {
                    area: id,
                    kind: nav.kind,
                    item: nav.item.clone(),
                };
                registry.set(BindingTier::Edit, slot.clone(), Arc::new(button));
            } else {
                registry.remove(BindingTier::Edit, slot.key());
            }
        }
    }
}

impl fmt::Debug for PageArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageArea")
            .field("region", &self.region.len())
            .field("items", &self.pagination.len())
            .field("current_page", &self.current_page)
            .field("max_page", &self.max_page())
            .field("nav_buttons", &self.nav_buttons)
            .finish()
    }
}
