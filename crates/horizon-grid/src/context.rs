//! The context a button sees while handling a click.

use crate::button::ButtonRef;
use crate::error::Result;
use crate::event::{ClickAction, ClickEvent, ClickKind};
use crate::menu::{CloseMode, Menu, MenuHandle};
use crate::navigation::MenuRecipe;
use crate::platform::ViewerRef;
use crate::slot::Slot;

/// Everything known about one click while it is being handled.
///
/// The context borrows the menu mutably, so a handler can rebind cells, turn
/// pages or start navigation without locking the menu again.
pub struct ClickContext<'a> {
    menu: &'a mut Menu,
    event: &'a mut ClickEvent,
    slot: Slot,
    source: Option<Slot>,
    button: Option<ButtonRef>,
}

impl<'a> ClickContext<'a> {
    pub(crate) fn new(
        menu: &'a mut Menu,
        event: &'a mut ClickEvent,
        slot: Slot,
        source: Option<Slot>,
        button: Option<ButtonRef>,
    ) -> Self {
        Self {
            menu,
            event,
            slot,
            source,
            button,
        }
    }

    pub fn viewer(&self) -> &ViewerRef {
        self.menu.viewer()
    }

    pub fn menu(&self) -> &Menu {
        self.menu
    }

    pub fn menu_mut(&mut self) -> &mut Menu {
        self.menu
    }

    /// The clicked cell.
    pub fn slot(&self) -> &Slot {
        &self.slot
    }

    /// For clicks synthesized from a drag, the first cell of the drag.
    pub fn source_slot(&self) -> Option<&Slot> {
        self.source.as_ref()
    }

    /// The button that answered the click.
    pub fn button(&self) -> Option<&ButtonRef> {
        self.button.as_ref()
    }

    pub fn event(&self) -> &ClickEvent {
        self.event
    }

    pub fn event_mut(&mut self) -> &mut ClickEvent {
        self.event
    }

    pub fn kind(&self) -> ClickKind {
        self.event.kind
    }

    pub fn action(&self) -> ClickAction {
        self.event.action
    }

    pub fn is_cancelled(&self) -> bool {
        self.event.cancelled
    }

    pub fn set_cancelled(&mut self, cancelled: bool) {
        self.event.cancelled = cancelled;
    }

    /// Close the menu. The close runs once the click has been handled.
    pub fn close(&mut self, mode: CloseMode) {
        self.menu.close(mode);
    }

    /// Open the menu built by `recipe` as the next step of the viewer's
    /// navigation history.
    pub fn open_with_history(&mut self, recipe: MenuRecipe) -> Result<MenuHandle> {
        self.menu.open_with_history(recipe)
    }
}
