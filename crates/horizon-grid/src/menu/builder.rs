//! Builder for [`Menu`].

use std::sync::Arc;

use horizon_grid_core::logging::targets;
use parking_lot::Mutex;

use super::{
    AllowClickHook, EventHook, Menu, MenuHandle, MenuHook, MenuHooks, MenuId, MenuLayout,
    MenuSummary, ParentLink,
};
use crate::binding::{BindingRegistry, BindingTier};
use crate::button::ButtonRef;
use crate::context::ClickContext;
use crate::error::{GridError, Result};
use crate::event::ClickEvent;
use crate::options::MenuOptions;
use crate::page_area::PageArea;
use crate::platform::ViewerRef;
use crate::runtime::MenuRuntime;
use crate::slot::Slot;

/// Builder for configuring and creating a [`Menu`].
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use horizon_grid::headless::{HeadlessContainers, HeadlessViewer};
/// use horizon_grid::{
///     ClickResult, DisplayItem, FnButton, MenuLayout, MenuRuntime, Slot, StaticButton,
/// };
/// use horizon_grid_core::TickScheduler;
///
/// let runtime = MenuRuntime::new(
///     Arc::new(TickScheduler::new()),
///     Arc::new(HeadlessContainers::new()),
/// );
/// let viewer = HeadlessViewer::new(1).into_ref();
///
/// let menu = runtime
///     .menu(viewer)
///     .title("Shop")
///     .layout(MenuLayout::chest(3))
///     .button(Slot::new(13), FnButton::new(DisplayItem::new("diamond"), |_| {
///         Some(ClickResult::RefreshSlot)
///     }).into_ref())
///     .attach(Slot::new(26), StaticButton::new(DisplayItem::new("barrier"))
///         .with_result(ClickResult::CancelAndClose)
///         .into_ref())
///     .build()
///     .unwrap();
/// menu.open().unwrap();
/// ```
pub struct MenuBuilder {
    runtime: MenuRuntime,
    viewer: ViewerRef,
    title: String,
    layout: MenuLayout,
    options: MenuOptions,
    hooks: MenuHooks,
    bindings: Vec<(BindingTier, Slot, ButtonRef)>,
    page_areas: Vec<PageArea>,
    parent: ParentLink,
    reopen_guard: Option<super::ReopenGuard>,
}

impl MenuBuilder {
    pub fn new(runtime: &MenuRuntime, viewer: ViewerRef) -> Self {
        Self {
            runtime: runtime.clone(),
            viewer,
            title: String::new(),
            layout: MenuLayout::default(),
            options: MenuOptions::default(),
            hooks: MenuHooks::default(),
            bindings: Vec::new(),
            page_areas: Vec::new(),
            parent: ParentLink::None,
            reopen_guard: None,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn layout(mut self, layout: MenuLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Shorthand for a chest layout with `rows` rows.
    pub fn rows(self, rows: usize) -> Self {
        self.layout(MenuLayout::chest(rows))
    }

    pub fn options(mut self, options: MenuOptions) -> Self {
        self.options = options;
        self
    }

    /// Bind content in the default tier.
    pub fn button(self, slot: Slot, button: ButtonRef) -> Self {
        self.bind(BindingTier::Default, slot, button)
    }

    /// Bind an overlay in the attached tier.
    pub fn attach(self, slot: Slot, button: ButtonRef) -> Self {
        self.bind(BindingTier::Attached, slot, button)
    }

    pub fn bind(mut self, tier: BindingTier, slot: Slot, button: ButtonRef) -> Self {
        self.bindings.push((tier, slot, button));
        self
    }

    /// Add a page area. Page areas own the default tier of their region.
    pub fn page_area(mut self, area: PageArea) -> Self {
        self.page_areas.push(area);
        self
    }

    pub fn on_open(mut self, hook: impl Fn(&mut Menu) + Send + Sync + 'static) -> Self {
        self.hooks.on_open = Some(Arc::new(hook) as MenuHook);
        self
    }

    pub fn on_close(mut self, hook: impl Fn(&mut Menu) + Send + Sync + 'static) -> Self {
        self.hooks.on_close = Some(Arc::new(hook) as MenuHook);
        self
    }

    pub fn on_empty_click(
        mut self,
        hook: impl Fn(&mut Menu, &mut ClickEvent) + Send + Sync + 'static,
    ) -> Self {
        self.hooks.on_empty_click = Some(Arc::new(hook) as EventHook);
        self
    }

    pub fn on_bottom_click(
        mut self,
        hook: impl Fn(&mut Menu, &mut ClickEvent) + Send + Sync + 'static,
    ) -> Self {
        self.hooks.on_bottom_click = Some(Arc::new(hook) as EventHook);
        self
    }

    pub fn allow_click(
        mut self,
        hook: impl Fn(&ClickContext<'_>) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.hooks.allow_click = Some(Arc::new(hook) as AllowClickHook);
        self
    }

    pub fn on_custom_result(
        mut self,
        hook: impl Fn(&mut ClickContext<'_>, u32) + Send + Sync + 'static,
    ) -> Self {
        self.hooks.custom_result = Some(Arc::new(hook));
        self
    }

    /// Return to the menu produced by `getter` on close.
    pub fn parent(
        mut self,
        getter: impl Fn(&ViewerRef) -> Option<MenuHandle> + Send + Sync + 'static,
    ) -> Self {
        self.parent = ParentLink::Getter(Arc::new(getter));
        self
    }

    /// Return to a fixed menu on close.
    pub fn parent_menu(self, parent: MenuHandle) -> Self {
        self.parent(move |_| Some(parent.clone()))
    }

    /// Run `callback` instead of reopening a parent on close.
    pub fn parent_callback(mut self, callback: impl Fn(&ViewerRef) + Send + Sync + 'static) -> Self {
        self.parent = ParentLink::Runnable(Arc::new(callback));
        self
    }

    /// Decide which closing children may reopen this menu.
    pub fn allow_reopen_from(
        mut self,
        guard: impl Fn(&MenuSummary) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.reopen_guard = Some(Arc::new(guard));
        self
    }

    /// Build the menu. It is not shown until opened.
    pub fn build(self) -> Result<MenuHandle> {
        let Self {
            runtime,
            viewer,
            title,
            layout,
            options,
            hooks,
            bindings,
            page_areas,
            parent,
            reopen_guard,
        } = self;

        layout.validate()?;
        let size = layout.size();
        if let Some((_, slot, _)) = bindings
            .iter()
            .find(|(_, slot, _)| !slot.is_viewer_storage() && slot.index() >= size)
        {
            return Err(GridError::SlotOutOfBounds {
                index: slot.index(),
                size,
            });
        }

        let id = MenuId::next();
        let scheduler = runtime.scheduler().clone();
        let inner = Arc::new_cyclic(|self_ref| {
            Mutex::new(Menu {
                id,
                title,
                layout,
                viewer,
                runtime,
                options,
                hooks,
                bindings: BindingRegistry::new(),
                page_areas: Vec::new(),
                parent,
                reopen_guard,
                container: None,
                navigation_owned: false,
                shown: false,
                processing_click: false,
                closing: false,
                close_pending: false,
                refresh_task: None,
                self_ref: self_ref.clone(),
            })
        });
        let handle = MenuHandle {
            id,
            inner,
            scheduler,
        };

        {
            let mut menu = handle.lock();
            for (tier, slot, button) in bindings {
                menu.bindings.set(tier, slot, button);
            }
            for area in page_areas {
                menu.add_page_area(area)?;
            }
            tracing::debug!(
                target: targets::MENU,
                menu = %id,
                viewer = %menu.viewer.id(),
                bindings = menu.bindings.len(),
                page_areas = menu.page_areas.len(),
                "menu built"
            );
        }
        Ok(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::button::StaticButton;
    use crate::headless::HeadlessHost;
    use crate::item::DisplayItem;

    #[test]
    fn test_build_rejects_bad_layout() {
        let host = HeadlessHost::new();
        let result = host.runtime.menu(host.viewer(1)).rows(9).build();
        assert!(matches!(result, Err(GridError::InvalidLayout(_))));
    }

    #[test]
    fn test_build_rejects_out_of_range_binding() {
        let host = HeadlessHost::new();
        let result = host
            .runtime
            .menu(host.viewer(1))
            .rows(1)
            .button(Slot::new(9), StaticButton::empty().into_ref())
            .build();
        assert!(matches!(result, Err(GridError::SlotOutOfBounds { index: 9, size: 9 })));
    }

    #[test]
    fn test_build_is_not_shown() {
        let host = HeadlessHost::new();
        let handle = host
            .runtime
            .menu(host.viewer(1))
            .title("Idle")
            .button(Slot::new(0), StaticButton::new(DisplayItem::new("stone")).into_ref())
            .build()
            .unwrap();
        let menu = handle.lock();
        assert_eq!(menu.title(), "Idle");
        assert!(!menu.is_materialized());
        assert!(!menu.is_shown());
        assert_eq!(menu.bindings().len(), 1);
    }

    #[test]
    fn test_menu_ids_are_unique() {
        let host = HeadlessHost::new();
        let a = host.runtime.menu(host.viewer(1)).build().unwrap();
        let b = host.runtime.menu(host.viewer(1)).build().unwrap();
        assert_ne!(a.id(), b.id());
        assert!(!a.ptr_eq(&b));
        assert!(a.ptr_eq(&a.clone()));
    }
}
