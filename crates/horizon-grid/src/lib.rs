//! Horizon Grid - interactive grid menus for remote viewers.
//!
//! A menu is a grid of cells shown to one viewer. Cells are bound to
//! [`Button`]s in three tiers, clicks are classified and answered with a
//! [`ClickResult`], large collections are shown a page at a time through
//! [`PageArea`]s, and menus opened with history can be left with "back",
//! which rebuilds the previous menu on demand.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use horizon_grid::headless::HeadlessHost;
//! use horizon_grid::{
//!     ClickResult, DisplayItem, MenuLayout, PageArea, PageButtonType, StaticButton,
//! };
//!
//! let host = HeadlessHost::new();
//! let items = (0..20).map(|n| {
//!     StaticButton::new(DisplayItem::new(format!("item_{n}")))
//!         .with_result(ClickResult::Allow)
//!         .into_ref()
//! });
//!
//! let menu = host
//!     .runtime
//!     .menu(host.viewer(1))
//!     .title("Catalogue")
//!     .layout(MenuLayout::chest(2))
//!     .page_area(
//!         PageArea::rect(0, 9, 1, 9)
//!             .with_items(items)
//!             .with_nav_button(PageButtonType::Previous, DisplayItem::new("arrow"))
//!             .with_nav_button(PageButtonType::Next, DisplayItem::new("arrow")),
//!     )
//!     .build()
//!     .unwrap();
//! menu.open().unwrap();
//!
//! assert_eq!(menu.lock().max_page(), Some(3));
//! // Next sits in the recommended cell of the last row.
//! host.click(1, 9 + 5);
//! assert_eq!(menu.lock().current_page(), Some(2));
//! ```
//!
//! # Platform Integration
//!
//! A host implements [`Viewer`], [`Container`] and [`ContainerFactory`],
//! provides a [`Scheduler`](horizon_grid_core::Scheduler) and forwards its
//! events to [`MenuSession::dispatch_click`], [`MenuSession::dispatch_drag`]
//! and [`MenuSession::dispatch_close`]. The [`headless`] module is a
//! complete in-memory host.

mod binding;
mod button;
mod context;
mod error;
mod event;
pub mod headless;
mod item;
mod menu;
mod navigation;
mod options;
mod page_area;
mod pagination;
mod platform;
mod result;
mod runtime;
mod session;
mod slot;

pub use binding::{Binding, BindingRegistry, BindingTier, PaintTarget};
pub use button::{Button, ButtonRef, FnButton, StaticButton};
pub use context::ClickContext;
pub use error::{GridError, Result};
pub use event::{
    ClickAction, ClickEvent, ClickKind, ClickRegion, DragEvent, DragKind, HOTBAR_SLOTS,
    OUTSIDE_SLOT, STORAGE_MAIN_SLOTS, locate_raw_slot,
};
pub use item::DisplayItem;
pub use menu::{
    AllowClickHook, CloseMode, CustomResultHook, DispatchResult, EventHook, Menu, MenuBuilder,
    MenuHandle, MenuHook, MenuHooks, MenuId, MenuLayout, MenuSummary, ParentGetter, ParentLink,
    ParentRunnable, ReopenGuard,
};
pub use navigation::{HISTORY_CLEANUP_DELAY_TICKS, MenuRecipe, recipe};
pub use options::{DEFAULT_ERROR_MESSAGE, MenuOptions};
pub use page_area::{PageArea, PageAreaId, PageButtonType};
pub use pagination::Pagination;
pub use platform::{
    Container, ContainerFactory, ContainerId, ContainerKind, ContainerRef, ContainerSpec, Viewer,
    ViewerId, ViewerRef,
};
pub use result::{ClickResult, ForwardFn, MAX_FORWARD_DEPTH};
pub use runtime::MenuRuntime;
pub use session::MenuSession;
pub use slot::{Slot, SlotKey};

/// Re-export of the core crate.
pub use horizon_grid_core as core;
