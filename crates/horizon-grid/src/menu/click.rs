//! Click classification and result application.
//!
//! # Click Flow
//!
//! Every click is sorted into one of four branches:
//!
//! 1. **Outside**: no container, or the outside sentinel index. Cancelled
//!    when `cancel_outside_clicks` is set.
//! 2. **Menu grid**: the cell is resolved against the binding tiers.
//!    Empty unbound cells fall under the unbound-click policy and the
//!    empty-cell hook. Bound cells pass the allow hook, run the button, pass the cursor
//!    guard and finally apply the button's [`ClickResult`].
//! 3. **Viewer storage**: the bottom-click and shift-move policies apply;
//!    storage bindings are consulted when `storage_interactive` is set, and
//!    the bottom-click hook runs last.
//! 4. **Unknown**: treated as a failure.
//!
//! A failure anywhere (a panicking handler, hook or display, a runaway chain
//! of forwarded results, an unclassifiable click) cancels the interaction,
//! tells the viewer, logs the error and closes the menu.

use std::panic::{AssertUnwindSafe, catch_unwind};

use horizon_grid_core::logging::targets;

use super::{CloseMode, Menu};
use crate::binding::Binding;
use crate::button::ButtonRef;
use crate::context::ClickContext;
use crate::error::{GridError, Result};
use crate::event::{ClickAction, ClickEvent, ClickRegion, DragEvent, locate_raw_slot};
use crate::item::DisplayItem;
use crate::result::{ClickResult, MAX_FORWARD_DEPTH};
use crate::slot::Slot;

/// Result of dispatching a click, drag or close to a menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchResult {
    /// A button handled the click.
    Accepted,
    /// The click hit a menu cell without a binding.
    Unbound,
    /// The click hit the viewer's storage grid.
    Storage,
    /// The click was outside the view.
    Outside,
    /// The allow-click hook vetoed the click.
    Denied,
    /// The event does not concern this menu.
    Ignored,
    /// The viewer has no open menu.
    MenuNotFound,
    /// The menu was busy with another event.
    Busy,
    /// Handling failed and the menu was closed.
    Failed,
}

impl DispatchResult {
    /// Check if a button or hook saw the event.
    pub fn was_handled(&self) -> bool {
        matches!(self, Self::Accepted | Self::Storage | Self::Unbound | Self::Denied)
    }
}

/// Run user code, turning a panic into an error.
pub(super) fn guarded<R>(f: impl FnOnce() -> R) -> Result<R> {
    catch_unwind(AssertUnwindSafe(f)).map_err(GridError::from_panic)
}

impl Menu {
    /// Handle a click on this menu's view.
    #[tracing::instrument(
        skip_all,
        target = "horizon_grid::click",
        level = "trace",
        fields(menu = %self.id, raw_slot = event.raw_slot)
    )]
    pub fn handle_click(&mut self, event: &mut ClickEvent) -> DispatchResult {
        self.run_click(event, None)
    }

    /// Handle a drag by replaying it as one click per touched cell.
    #[tracing::instrument(
        skip_all,
        target = "horizon_grid::click",
        level = "trace",
        fields(menu = %self.id, cells = drag.new_items.len())
    )]
    pub fn handle_drag(&mut self, drag: &mut DragEvent) -> DispatchResult {
        if self.container.is_none() {
            return DispatchResult::Ignored;
        }
        let top_size = self.size();
        let raw_slots = drag.raw_slots();
        let origin = raw_slots
            .first()
            .and_then(|raw| match locate_raw_slot(*raw, top_size) {
                (ClickRegion::Top, index) => Some(Slot::new(index as usize)),
                (ClickRegion::Bottom, index) => Some(Slot::storage(index as usize)),
                _ => None,
            });

        let mut any_cancelled = false;
        let mut cursor_restored = false;
        let mut outcome = DispatchResult::Ignored;
        for raw in raw_slots {
            let mut click = drag.synthetic_click(raw, top_size);
            if click.region == ClickRegion::Top {
                click.current = click
                    .cell_index()
                    .and_then(|index| self.container.as_ref()?.item(index));
            }

            let result = self.run_click(&mut click, origin.clone());
            if result == DispatchResult::Failed {
                drag.cancelled = true;
                return DispatchResult::Failed;
            }
            any_cancelled |= click.cancelled;
            if click.cursor != drag.old_cursor {
                cursor_restored = true;
                drag.cursor = click.cursor;
            }
            if result.was_handled() {
                outcome = DispatchResult::Accepted;
            } else if outcome == DispatchResult::Ignored {
                outcome = result;
            }
        }

        drag.cancelled = any_cancelled;
        if drag.old_cursor.is_none() && !cursor_restored {
            drag.cursor = None;
        }
        outcome
    }

    /// One pass through the engine. The processing flags are always cleared
    /// before returning.
    fn run_click(&mut self, event: &mut ClickEvent, source: Option<Slot>) -> DispatchResult {
        let viewer_id = self.viewer.id();
        let session = self.runtime.session().clone();

        self.processing_click = true;
        session.begin_click(viewer_id);
        // Painting runs button code too, so the whole pass is guarded.
        let outcome = guarded(|| self.classify(event, source)).and_then(|result| result);
        self.processing_click = false;
        session.end_click(viewer_id);

        match outcome {
            Ok(result) => {
                tracing::trace!(target: targets::CLICK, ?result, cancelled = event.cancelled, "click handled");
                result
            }
            Err(err) => {
                self.fail_click(event, &err);
                DispatchResult::Failed
            }
        }
    }

    fn classify(&mut self, event: &mut ClickEvent, source: Option<Slot>) -> Result<DispatchResult> {
        let Some(own) = self.container.as_ref().map(|container| container.id()) else {
            return Ok(DispatchResult::Ignored);
        };
        if event.is_outside() {
            return Ok(self.outside_click(event));
        }
        match event.region {
            ClickRegion::Top if event.container != Some(own) => Ok(DispatchResult::Ignored),
            ClickRegion::Top => self.top_click(event, source),
            ClickRegion::Bottom => self.bottom_click(event, source),
            ClickRegion::Outside => Ok(self.outside_click(event)),
            ClickRegion::Unknown => Err(GridError::UnclassifiedRegion {
                raw_slot: event.raw_slot,
            }),
        }
    }

    fn outside_click(&mut self, event: &mut ClickEvent) -> DispatchResult {
        if self.options.cancel_outside_clicks {
            event.cancelled = true;
        }
        DispatchResult::Outside
    }

    fn top_click(&mut self, event: &mut ClickEvent, source: Option<Slot>) -> Result<DispatchResult> {
        let Some(index) = event.cell_index() else {
            return Ok(self.outside_click(event));
        };
        let viewer = self.viewer.clone();
        let binding = self
            .bindings
            .resolve(index, false, |binding| binding.placeable_for(viewer.as_ref()))
            .cloned();
        match binding {
            Some(binding) => self.invoke(binding, event, source),
            None => self.unbound_click(event),
        }
    }

    /// Unbound cells that still show something (content the host placed
    /// there) are left to the platform.
    fn unbound_click(&mut self, event: &mut ClickEvent) -> Result<DispatchResult> {
        if event.current.is_none() {
            if self.options.cancel_unbound_clicks {
                event.cancelled = true;
            }
            if let Some(hook) = self.hooks.on_empty_click.clone() {
                guarded(|| hook(self, event))?;
            }
            if self.options.cancel_hotbar_swaps && event.is_hotbar_swap() {
                event.cancelled = true;
            }
        }
        Ok(DispatchResult::Unbound)
    }

    fn bottom_click(&mut self, event: &mut ClickEvent, source: Option<Slot>) -> Result<DispatchResult> {
        if self.options.cancel_bottom_clicks {
            event.cancelled = true;
        }
        if self.options.cancel_shift_moves
            && (event.kind.is_shift() || event.action == ClickAction::MoveToOtherStorage)
        {
            event.cancelled = true;
        }

        let mut outcome = DispatchResult::Storage;
        if self.options.storage_interactive
            && let Some(index) = event.cell_index()
        {
            let viewer = self.viewer.clone();
            let binding = self
                .bindings
                .resolve(index, true, |binding| binding.placeable_for(viewer.as_ref()))
                .cloned();
            if let Some(binding) = binding {
                outcome = self.invoke(binding, event, source)?;
            }
        }

        if let Some(hook) = self.hooks.on_bottom_click.clone() {
            guarded(|| hook(self, event))?;
        }
        Ok(outcome)
    }

    fn invoke(
        &mut self,
        binding: Binding,
        event: &mut ClickEvent,
        source: Option<Slot>,
    ) -> Result<DispatchResult> {
        let slot = binding.slot().clone();
        let button = binding.button().clone();

        if let Some(allow) = self.hooks.allow_click.clone() {
            let ctx = ClickContext::new(self, event, slot.clone(), source.clone(), Some(button.clone()));
            if !guarded(|| allow(&ctx))? {
                event.cancelled = true;
                return Ok(DispatchResult::Denied);
            }
        }

        let result = {
            let mut ctx = ClickContext::new(self, event, slot.clone(), source.clone(), Some(button.clone()));
            guarded(|| button.on_click(&mut ctx))?
        }
        .unwrap_or_default();

        if self.options.guard_cursor_deposit
            && event.cursor.is_some()
            && event.action.deposits_cursor()
        {
            event.cancelled = true;
        }

        tracing::trace!(target: targets::CLICK, slot = %slot.key(), result = result.name(), "button answered");
        self.apply_result(result, event, &slot, source.as_ref(), &button, 0)?;
        Ok(DispatchResult::Accepted)
    }

    /// Apply a button's result. `depth` counts the forwards followed so far.
    fn apply_result(
        &mut self,
        result: ClickResult,
        event: &mut ClickEvent,
        slot: &Slot,
        source: Option<&Slot>,
        button: &ButtonRef,
        depth: usize,
    ) -> Result<()> {
        match result {
            ClickResult::Cancel => event.cancelled = true,
            ClickResult::Allow => event.cancelled = false,
            ClickResult::Clear => {
                event.cancelled = true;
                self.set_cell(slot, event, None);
            }
            ClickResult::Decrement => {
                event.cancelled = true;
                let next = self.cell_item(slot, event).and_then(|item| item.decremented());
                self.set_cell(slot, event, next);
            }
            ClickResult::Increment => {
                event.cancelled = true;
                if let Some(item) = self.cell_item(slot, event) {
                    self.set_cell(slot, event, Some(item.incremented()));
                }
            }
            ClickResult::RefreshSlot => {
                event.cancelled = true;
                self.refresh_slots(&[slot.key()]);
            }
            ClickResult::RefreshAll => {
                event.cancelled = true;
                self.refresh_all();
            }
            ClickResult::CancelAndClose => {
                event.cancelled = true;
                self.close(CloseMode::ReopenParent);
            }
            ClickResult::Forward(handler) => {
                let depth = depth + 1;
                if depth > MAX_FORWARD_DEPTH {
                    return Err(GridError::ForwardDepthExceeded {
                        depth: MAX_FORWARD_DEPTH,
                    });
                }
                let next = {
                    let mut ctx = ClickContext::new(
                        self,
                        event,
                        slot.clone(),
                        source.cloned(),
                        Some(button.clone()),
                    );
                    guarded(|| handler(&mut ctx))?
                }
                .unwrap_or_default();
                self.apply_result(next, event, slot, source, button, depth)?;
            }
            ClickResult::Custom(kind) => {
                if let Some(hook) = self.hooks.custom_result.clone() {
                    let mut ctx = ClickContext::new(
                        self,
                        event,
                        slot.clone(),
                        source.cloned(),
                        Some(button.clone()),
                    );
                    guarded(|| hook(&mut ctx, kind))?;
                } else {
                    tracing::debug!(target: targets::CLICK, kind, "custom result without a hook");
                }
            }
        }
        Ok(())
    }

    /// Current content of the clicked cell.
    fn cell_item(&self, slot: &Slot, event: &ClickEvent) -> Option<DisplayItem> {
        self.cell_container(slot)
            .and_then(|container| container.item(slot.index()))
            .or_else(|| event.current.clone())
    }

    fn set_cell(&self, slot: &Slot, event: &mut ClickEvent, item: Option<DisplayItem>) {
        if let Some(container) = self.cell_container(slot) {
            container.set_item(slot.index(), item.clone());
        }
        event.current = item;
    }

    fn fail_click(&mut self, event: &mut ClickEvent, err: &GridError) {
        tracing::error!(
            target: targets::CLICK,
            menu = %self.id,
            viewer = %self.viewer.id(),
            raw_slot = event.raw_slot,
            error = %err,
            "click handling failed, closing menu"
        );
        event.cancelled = true;
        self.viewer.send_message(&self.options.error_message);
        self.close(CloseMode::Dismiss);
    }
}
