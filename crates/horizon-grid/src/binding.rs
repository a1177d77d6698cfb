//! Three-tier slot/button bindings.
//!
//! A menu binds buttons to cells in three tiers:
//!
//! - [`BindingTier::Edit`]: engine-owned controls such as page navigation
//!   buttons
//! - [`BindingTier::Attached`]: overlays added by the menu's author
//! - [`BindingTier::Default`]: bulk content, such as the items of a page
//!
//! When several tiers bind the same address the highest tier the viewer may
//! see wins. Painting and click lookup resolve an address the same way, so
//! the cell a viewer sees is always the cell that answers their click. A
//! binding whose slot refuses the viewer is skipped and the tier below shows
//! through. Shadowed bindings are kept, not discarded: removing an edit
//! binding uncovers whatever sits underneath it.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use horizon_grid_core::PerfSpan;
use horizon_grid_core::logging::{span_names, targets};

use crate::button::ButtonRef;
use crate::platform::{Container, Viewer};
use crate::slot::{Slot, SlotKey};

/// One of the three binding tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingTier {
    /// Engine-owned controls. Highest priority.
    Edit,
    /// Author overlays.
    Attached,
    /// Bulk content. Lowest priority.
    Default,
}

impl BindingTier {
    /// Lookup order, highest priority first.
    pub const PRIORITY: [BindingTier; 3] = [Self::Edit, Self::Attached, Self::Default];

    fn position(self) -> usize {
        match self {
            Self::Edit => 0,
            Self::Attached => 1,
            Self::Default => 2,
        }
    }
}

/// A button bound to a slot. Equality and hashing use the address only.
#[derive(Clone)]
pub struct Binding {
    slot: Slot,
    button: ButtonRef,
}

impl Binding {
    pub fn new(slot: Slot, button: ButtonRef) -> Self {
        Self { slot, button }
    }

    pub fn slot(&self) -> &Slot {
        &self.slot
    }

    pub fn button(&self) -> &ButtonRef {
        &self.button
    }

    pub fn key(&self) -> SlotKey {
        self.slot.key()
    }

    /// Whether this binding may be painted for `viewer`.
    pub fn placeable_for(&self, viewer: &dyn Viewer) -> bool {
        self.slot.try_place(self.button.as_ref(), viewer)
    }
}

impl PartialEq for Binding {
    fn eq(&self, other: &Self) -> bool {
        self.slot == other.slot
    }
}

impl Eq for Binding {}

impl std::hash::Hash for Binding {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.slot.hash(state);
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("slot", &self.slot)
            .finish_non_exhaustive()
    }
}

/// The containers a fill or refresh paints into.
#[derive(Clone, Copy)]
pub struct PaintTarget<'a> {
    /// The menu's own grid.
    pub menu: &'a dyn Container,
    /// The viewer's storage grid, when storage cells are bound.
    pub storage: Option<&'a dyn Container>,
    pub viewer: &'a dyn Viewer,
}

/// Three tiers of bindings keyed by address.
#[derive(Default)]
pub struct BindingRegistry {
    tiers: [BTreeMap<SlotKey, Binding>; 3],
    /// Storage cells painted by the last fill, cleared by the next one.
    painted_storage: BTreeSet<usize>,
}

impl BindingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `button` to `slot` in `tier`, returning the binding it replaced.
    pub fn set(&mut self, tier: BindingTier, slot: Slot, button: ButtonRef) -> Option<Binding> {
        self.insert(tier, Binding::new(slot, button))
    }

    pub fn insert(&mut self, tier: BindingTier, binding: Binding) -> Option<Binding> {
        self.tiers[tier.position()].insert(binding.key(), binding)
    }

    pub fn remove(&mut self, tier: BindingTier, key: SlotKey) -> Option<Binding> {
        self.tiers[tier.position()].remove(&key)
    }

    /// Remove `key` from every tier. Returns the number of bindings removed.
    pub fn remove_everywhere(&mut self, key: SlotKey) -> usize {
        self.tiers
            .iter_mut()
            .filter_map(|tier| tier.remove(&key))
            .count()
    }

    pub fn clear_tier(&mut self, tier: BindingTier) {
        self.tiers[tier.position()].clear();
    }

    /// Every binding of `tier`, shadowed or not, in address order.
    pub fn bindings(&self, tier: BindingTier) -> impl Iterator<Item = &Binding> {
        self.tiers[tier.position()].values()
    }

    pub fn contains(&self, tier: BindingTier, key: SlotKey) -> bool {
        self.tiers[tier.position()].contains_key(&key)
    }

    /// Total number of bindings across all tiers.
    pub fn len(&self) -> usize {
        self.tiers.iter().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.iter().all(BTreeMap::is_empty)
    }

    /// The tier that answers for `key`, if any.
    pub fn owner_tier(&self, key: SlotKey) -> Option<BindingTier> {
        BindingTier::PRIORITY
            .into_iter()
            .find(|tier| self.contains(*tier, key))
    }

    /// Find the binding that answers a click on `index`.
    ///
    /// Tiers are searched from highest to lowest priority and the first
    /// binding at the address that satisfies `predicate` is returned.
    pub fn resolve<P>(&self, index: usize, viewer_storage: bool, predicate: P) -> Option<&Binding>
    where
        P: Fn(&Binding) -> bool,
    {
        let key = SlotKey {
            index,
            viewer_storage,
        };
        BindingTier::PRIORITY
            .into_iter()
            .filter_map(|tier| self.tiers[tier.position()].get(&key))
            .find(|binding| predicate(*binding))
    }

    /// The highest binding at `key`, ignoring placement.
    pub fn get(&self, key: SlotKey) -> Option<&Binding> {
        self.resolve(key.index, key.viewer_storage, |_| true)
    }

    /// The binding `viewer` sees, and clicks, at `key`.
    pub fn visible(&self, key: SlotKey, viewer: &dyn Viewer) -> Option<&Binding> {
        self.resolve(key.index, key.viewer_storage, |binding| binding.placeable_for(viewer))
    }

    /// Every address bound in any tier, in address order.
    pub fn addresses(&self) -> BTreeSet<SlotKey> {
        self.tiers.iter().flat_map(|tier| tier.keys().copied()).collect()
    }

    /// The bindings a fill paints for `viewer`: at most one per address.
    pub fn fill_items(&self, viewer: &dyn Viewer) -> Vec<&Binding> {
        self.addresses()
            .into_iter()
            .filter_map(|key| self.visible(key, viewer))
            .collect()
    }

    /// Does any binding target the viewer's storage grid?
    pub fn has_storage_bindings(&self) -> bool {
        self.tiers
            .iter()
            .any(|tier| tier.keys().any(|key| key.viewer_storage))
    }

    /// Paint every effective binding.
    ///
    /// With `clear_first` the menu grid is emptied and any storage cell
    /// painted by a previous fill is emptied before painting. Returns the
    /// number of cells painted.
    pub fn fill(&mut self, target: PaintTarget<'_>, clear_first: bool) -> usize {
        let _span = PerfSpan::new(span_names::FILL);

        if clear_first {
            target.menu.clear();
            if let Some(storage) = target.storage {
                for index in &self.painted_storage {
                    storage.set_item(*index, None);
                }
            }
        }

        let mut painted = 0;
        let mut painted_storage = BTreeSet::new();
        for key in self.addresses() {
            if paint(key, self.visible(key, target.viewer), target) {
                painted += 1;
                if key.viewer_storage {
                    painted_storage.insert(key.index);
                }
            }
        }
        if clear_first || target.storage.is_some() {
            self.painted_storage = painted_storage;
        }

        tracing::trace!(target: targets::MENU, painted, clear_first, "filled menu");
        painted
    }

    /// Repaint only `keys`.
    ///
    /// A key with no binding leaves its cell untouched; a key whose bindings
    /// all refuse the viewer is emptied. Passing no target (the menu has not
    /// been materialized yet) is a no-op. Returns the number of cells painted.
    pub fn refresh_slots(&self, target: Option<PaintTarget<'_>>, keys: &[SlotKey]) -> usize {
        let Some(target) = target else {
            return 0;
        };
        keys.iter()
            .filter(|key| self.owner_tier(**key).is_some())
            .filter(|key| paint(**key, self.visible(**key, target.viewer), target))
            .count()
    }
}

impl fmt::Debug for BindingRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingRegistry")
            .field("edit", &self.tiers[0].len())
            .field("attached", &self.tiers[1].len())
            .field("default", &self.tiers[2].len())
            .finish()
    }
}

/// Paint the cell at `key` with `binding`, or empty it when there is none.
/// Returns whether a binding was painted.
fn paint(key: SlotKey, binding: Option<&Binding>, target: PaintTarget<'_>) -> bool {
    let container = if key.viewer_storage {
        match target.storage {
            Some(storage) => storage,
            None => return false,
        }
    } else {
        target.menu
    };

    if key.index >= container.size() {
        tracing::warn!(
            target: targets::MENU,
            slot = %key,
            size = container.size(),
            "binding outside container, skipped"
        );
        return false;
    }

    match binding {
        Some(binding) => {
            container.set_item(key.index, binding.button().display(target.viewer));
            true
        }
        None => {
            container.set_item(key.index, None);
            false
        }
    }
}
