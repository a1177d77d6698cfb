//! Buttons: what a cell shows and what a click on it does.

use std::fmt;
use std::sync::Arc;

use crate::context::ClickContext;
use crate::item::DisplayItem;
use crate::platform::Viewer;
use crate::result::ClickResult;

/// A clickable cell.
///
/// Returning `None` from [`on_click`](Self::on_click) is the same as
/// returning [`ClickResult::Cancel`].
pub trait Button: Send + Sync {
    /// Content to paint for `viewer`. `None` paints an empty cell.
    fn display(&self, viewer: &dyn Viewer) -> Option<DisplayItem>;

    /// React to a click.
    fn on_click(&self, ctx: &mut ClickContext<'_>) -> Option<ClickResult>;

    /// Whether the button is shown to `viewer` at all.
    fn visible_to(&self, _viewer: &dyn Viewer) -> bool {
        true
    }
}

/// Shared button handle, as stored in bindings and page areas.
pub type ButtonRef = Arc<dyn Button>;

type DisplayFn = Box<dyn Fn(&dyn Viewer) -> Option<DisplayItem> + Send + Sync>;
type ClickFn = Box<dyn Fn(&mut ClickContext<'_>) -> Option<ClickResult> + Send + Sync>;
type VisibilityFn = Box<dyn Fn(&dyn Viewer) -> bool + Send + Sync>;

/// A button assembled from closures.
///
/// # Example
///
/// ```
/// use horizon_grid::{ClickResult, DisplayItem, FnButton};
///
/// let button = FnButton::new(DisplayItem::new("emerald"), |ctx| {
///     ctx.viewer().send_message("clicked!");
///     Some(ClickResult::Cancel)
/// });
/// # let _ = button;
/// ```
pub struct FnButton {
    display: DisplayFn,
    click: ClickFn,
    visibility: Option<VisibilityFn>,
}

impl FnButton {
    /// A button showing a fixed item.
    pub fn new<C>(item: DisplayItem, click: C) -> Self
    where
        C: Fn(&mut ClickContext<'_>) -> Option<ClickResult> + Send + Sync + 'static,
    {
        Self {
            display: Box::new(move |_| Some(item.clone())),
            click: Box::new(click),
            visibility: None,
        }
    }

    /// A button whose content depends on the viewer.
    pub fn dynamic<D, C>(display: D, click: C) -> Self
    where
        D: Fn(&dyn Viewer) -> Option<DisplayItem> + Send + Sync + 'static,
        C: Fn(&mut ClickContext<'_>) -> Option<ClickResult> + Send + Sync + 'static,
    {
        Self {
            display: Box::new(display),
            click: Box::new(click),
            visibility: None,
        }
    }

    /// Hide the button from viewers for which `visible` returns `false`.
    pub fn visible_when<V>(mut self, visible: V) -> Self
    where
        V: Fn(&dyn Viewer) -> bool + Send + Sync + 'static,
    {
        self.visibility = Some(Box::new(visible));
        self
    }

    /// Convert into a shared handle.
    pub fn into_ref(self) -> ButtonRef {
        Arc::new(self)
    }
}

impl Button for FnButton {
    fn display(&self, viewer: &dyn Viewer) -> Option<DisplayItem> {
        (self.display)(viewer)
    }

    fn on_click(&self, ctx: &mut ClickContext<'_>) -> Option<ClickResult> {
        (self.click)(ctx)
    }

    fn visible_to(&self, viewer: &dyn Viewer) -> bool {
        self.visibility.as_ref().is_none_or(|visible| visible(viewer))
    }
}

impl fmt::Debug for FnButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnButton")
            .field("conditional", &self.visibility.is_some())
            .finish_non_exhaustive()
    }
}

/// A decorative button: fixed content and a fixed result.
#[derive(Debug, Clone)]
pub struct StaticButton {
    item: Option<DisplayItem>,
    result: ClickResult,
}

impl StaticButton {
    /// Show `item`; clicks are cancelled.
    pub fn new(item: DisplayItem) -> Self {
        Self {
            item: Some(item),
            result: ClickResult::Cancel,
        }
    }

    /// An empty cell that still owns its address.
    pub fn empty() -> Self {
        Self {
            item: None,
            result: ClickResult::Cancel,
        }
    }

    /// Answer every click with `result`.
    pub fn with_result(mut self, result: ClickResult) -> Self {
        self.result = result;
        self
    }

    pub fn into_ref(self) -> ButtonRef {
        Arc::new(self)
    }
}

impl Button for StaticButton {
    fn display(&self, _viewer: &dyn Viewer) -> Option<DisplayItem> {
        self.item.clone()
    }

    fn on_click(&self, _ctx: &mut ClickContext<'_>) -> Option<ClickResult> {
        Some(self.result.clone())
    }
}

static_assertions::assert_impl_all!(FnButton: Send, Sync);
static_assertions::assert_impl_all!(StaticButton: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessViewer;

    #[test]
    fn test_static_button_display() {
        let viewer = HeadlessViewer::new(1);
        let button = StaticButton::new(DisplayItem::new("glass_pane"));
        assert_eq!(
            button.display(&viewer).map(|i| i.material().to_string()),
            Some("glass_pane".to_string())
        );
        assert!(StaticButton::empty().display(&viewer).is_none());
    }

    #[test]
    fn test_dynamic_display_and_visibility() {
        let button = FnButton::dynamic(
            |viewer| Some(DisplayItem::new(format!("head_{}", viewer.id().0))),
            |_| None,
        )
        .visible_when(|viewer| viewer.id().0 != 2);

        let one = HeadlessViewer::new(1);
        let two = HeadlessViewer::new(2);
        assert_eq!(button.display(&one).unwrap().material(), "head_1");
        assert!(button.visible_to(&one));
        assert!(!button.visible_to(&two));
    }
}
