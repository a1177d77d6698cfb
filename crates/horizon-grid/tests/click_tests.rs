//! Tests for click dispatch through a session.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use horizon_grid::headless::HeadlessHost;
use horizon_grid::{
    BindingTier, ButtonRef, ClickEvent, ClickResult, Container, DEFAULT_ERROR_MESSAGE, DispatchResult,
    DisplayItem, DragEvent, DragKind, FnButton, MenuBuilder, MenuHandle, MenuOptions, Slot, StaticButton,
};

fn counting(result: ClickResult, calls: &Arc<AtomicUsize>) -> ButtonRef {
    let calls = calls.clone();
    FnButton::new(DisplayItem::new("counter"), move |_| {
        calls.fetch_add(1, Ordering::SeqCst);
        Some(result.clone())
    })
    .into_ref()
}

fn open(menu: MenuBuilder) -> MenuHandle {
    let handle = menu.build().expect("Failed to build menu");
    handle.open().expect("Failed to open menu");
    handle
}

#[test]
fn test_unbound_cell_is_cancelled_without_handler() {
    let host = HeadlessHost::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let _menu = open(
        host.runtime
            .menu(host.viewer(1))
            .button(Slot::new(0), counting(ClickResult::Allow, &calls))
            .button(Slot::new(8), counting(ClickResult::Allow, &calls)),
    );

    let (result, event) = host.click(1, 4);
    assert_eq!(result, DispatchResult::Unbound);
    assert!(event.cancelled);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_panicking_handler_closes_menu() {
    let host = HeadlessHost::new();
    let menu = open(
        host.runtime.menu(host.viewer(1)).button(
            Slot::new(0),
            FnButton::new(DisplayItem::new("tnt"), |_| panic!("handler exploded")).into_ref(),
        ),
    );

    let (result, event) = host.click(1, 0);
    assert_eq!(result, DispatchResult::Failed);
    assert!(event.cancelled);
    assert!(host.containers.open_view(host.viewer_id(1)).is_none());
    assert_eq!(host.messages(1), vec![DEFAULT_ERROR_MESSAGE.to_owned()]);

    let menu = menu.lock();
    assert!(!menu.is_shown());
    assert!(!menu.is_processing_click());
    assert!(!host.runtime.session().is_processing(host.viewer_id(1)));
}

#[test]
fn test_panicking_display_during_refresh_closes_menu() {
    let host = HeadlessHost::new();
    let paints = Arc::new(AtomicUsize::new(0));
    let counted = paints.clone();
    let menu = open(host.runtime.menu(host.viewer(1)).button(
        Slot::new(4),
        FnButton::dynamic(
            move |_| {
                if counted.fetch_add(1, Ordering::SeqCst) > 0 {
                    panic!("display exploded");
                }
                Some(DisplayItem::new("clock"))
            },
            |_| Some(ClickResult::RefreshSlot),
        )
        .into_ref(),
    ));
    let other = host
        .runtime
        .menu(host.viewer(1))
        .title("Other")
        .build()
        .expect("Failed to build menu");

    let (result, event) = host.click(1, 4);
    assert_eq!(result, DispatchResult::Failed);
    assert!(event.cancelled);
    assert!(!menu.lock().is_shown());
    assert!(!menu.lock().is_processing_click());
    assert!(!host.runtime.session().is_processing(host.viewer_id(1)));
    assert_eq!(host.messages(1), vec![DEFAULT_ERROR_MESSAGE.to_owned()]);

    // Nothing is left deferring opens for this viewer.
    other.open().expect("Failed to open menu");
    assert!(other.lock().is_shown());
}

#[test]
fn test_panicking_allow_hook_closes_menu() {
    let host = HeadlessHost::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let _menu = open(
        host.runtime
            .menu(host.viewer(1))
            .options(MenuOptions::default().with_error_message("Menu failed"))
            .button(Slot::new(0), counting(ClickResult::Allow, &calls))
            .allow_click(|_| panic!("veto exploded")),
    );

    let (result, _) = host.click(1, 0);
    assert_eq!(result, DispatchResult::Failed);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(host.messages(1), vec!["Menu failed".to_owned()]);
}

#[test]
fn test_attached_overlay_shadows_content() {
    let host = HeadlessHost::new();
    let content = Arc::new(AtomicUsize::new(0));
    let overlay = Arc::new(AtomicUsize::new(0));
    let menu = open(
        host.runtime
            .menu(host.viewer(1))
            .button(Slot::new(2), counting(ClickResult::Cancel, &content))
            .attach(Slot::new(2), counting(ClickResult::Cancel, &overlay)),
    );

    host.click(1, 2);
    assert_eq!((content.load(Ordering::SeqCst), overlay.load(Ordering::SeqCst)), (0, 1));

    menu.with(|m| m.unbind(BindingTier::Attached, Slot::new(2).key()));
    host.click(1, 2);
    assert_eq!((content.load(Ordering::SeqCst), overlay.load(Ordering::SeqCst)), (1, 1));
}

#[test]
fn test_permission_gated_slot_falls_through() {
    let host = HeadlessHost::new();
    host.add_viewer(horizon_grid::headless::HeadlessViewer::new(1).with_permissions(["menu.use"]));
    let content = Arc::new(AtomicUsize::new(0));
    let admin = Arc::new(AtomicUsize::new(0));
    let _menu = open(
        host.runtime
            .menu(host.viewer(1))
            .button(Slot::new(5), counting(ClickResult::Cancel, &content))
            .attach(Slot::new(5).with_permission("menu.admin"), counting(ClickResult::Cancel, &admin)),
    );

    let container = host
        .containers
        .viewed_container(host.viewer_id(1))
        .expect("No open view");
    assert_eq!(container.materials()[5].as_deref(), Some("counter"));

    host.click(1, 5);
    assert_eq!(admin.load(Ordering::SeqCst), 0);
    assert_eq!(content.load(Ordering::SeqCst), 1);
}

#[test]
fn test_refused_overlay_paints_what_answers_the_click() {
    let host = HeadlessHost::new();
    host.add_viewer(horizon_grid::headless::HeadlessViewer::new(1).with_permissions(["menu.use"]));
    let admin = Arc::new(AtomicUsize::new(0));
    let menu = open(
        host.runtime
            .menu(host.viewer(1))
            .button(Slot::new(5), StaticButton::new(DisplayItem::new("content")).into_ref())
            .attach(
                Slot::new(5).with_permission("menu.admin"),
                counting(ClickResult::Cancel, &admin),
            ),
    );
    let container = host
        .containers
        .viewed_container(host.viewer_id(1))
        .expect("No open view");
    assert_eq!(container.materials()[5].as_deref(), Some("content"));

    let (result, _) = host.click(1, 5);
    assert_eq!(result, DispatchResult::Accepted);
    assert_eq!(admin.load(Ordering::SeqCst), 0);

    menu.with(|m| m.refresh_all());
    assert_eq!(container.materials()[5].as_deref(), Some("content"));
}

#[test]
fn test_dispatch_without_menu() {
    let host = HeadlessHost::new();
    let (result, _) = host.click(3, 0);
    assert_eq!(result, DispatchResult::MenuNotFound);
    let mut event = ClickEvent::outside(host.viewer_id(3), None);
    assert_eq!(
        host.runtime.session().dispatch_click(&mut event),
        DispatchResult::MenuNotFound
    );
}

#[test]
fn test_drag_through_session() {
    let host = HeadlessHost::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let _menu = open(
        host.runtime
            .menu(host.viewer(1))
            .options(MenuOptions::permissive())
            .button(Slot::new(1), counting(ClickResult::Allow, &calls))
            .button(Slot::new(2), counting(ClickResult::Allow, &calls)),
    );
    let container = host.containers.open_view(host.viewer_id(1));

    let mut drag = DragEvent::new(host.viewer_id(1), container, DragKind::Single)
        .with_cell(1, DisplayItem::new("seed"))
        .with_cell(2, DisplayItem::new("seed"))
        .with_cursor(Some(DisplayItem::new("seed").with_amount(5)), Some(DisplayItem::new("seed").with_amount(3)));
    let result = host.runtime.session().dispatch_drag(&mut drag);
    assert_eq!(result, DispatchResult::Accepted);
    assert!(!drag.cancelled);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_refresh_slot_repaints_dynamic_content() {
    let host = HeadlessHost::new();
    let clicks = Arc::new(AtomicUsize::new(0));
    let shown = clicks.clone();
    let counted = clicks.clone();
    let button = FnButton::dynamic(
        move |_| Some(DisplayItem::new("clock").with_amount(shown.load(Ordering::SeqCst) as u32 + 1)),
        move |_| {
            counted.fetch_add(1, Ordering::SeqCst);
            Some(ClickResult::RefreshSlot)
        },
    );
    let _menu = open(host.runtime.menu(host.viewer(1)).button(Slot::new(4), button.into_ref()));
    let container = host
        .containers
        .viewed_container(host.viewer_id(1))
        .expect("No open view");
    assert_eq!(container.item(4).map(|i| i.amount()), Some(1));

    host.click(1, 4);
    host.click(1, 4);
    assert_eq!(container.item(4).map(|i| i.amount()), Some(3));
}

#[test]
fn test_storage_clicks_with_default_options() {
    let host = HeadlessHost::new();
    let seen = Arc::new(AtomicUsize::new(0));
    let hook = seen.clone();
    let menu = open(
        host.runtime
            .menu(host.viewer(1))
            .button(Slot::new(0), StaticButton::new(DisplayItem::new("stone")).into_ref())
            .on_bottom_click(move |_, _| {
                hook.fetch_add(1, Ordering::SeqCst);
            }),
    );
    let container = host.containers.open_view(host.viewer_id(1)).expect("No open view");
    let top_size = menu.lock().size();

    let mut event = ClickEvent::bottom(host.viewer_id(1), container, top_size as i32 + 30, top_size);
    let result = host.runtime.session().dispatch_click(&mut event);
    assert_eq!(result, DispatchResult::Storage);
    assert!(!event.cancelled);
    assert_eq!(seen.load(Ordering::SeqCst), 1);
}
