//! Tests for back navigation and history cleanup.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use horizon_grid::headless::HeadlessHost;
use horizon_grid::{
    ButtonRef, ClickResult, CloseMode, DisplayItem, FnButton, GridError,
    HISTORY_CLEANUP_DELAY_TICKS, MenuHandle, MenuRecipe, MenuRuntime, PageArea, PageButtonType,
    Slot, StaticButton, recipe,
};

const OPEN_CHILD: usize = 13;
const BACK: usize = 22;
const NEXT: usize = 23;

fn items(count: usize) -> Vec<ButtonRef> {
    (0..count)
        .map(|n| StaticButton::new(DisplayItem::new(format!("item_{n}"))).into_ref())
        .collect()
}

fn back_button() -> ButtonRef {
    StaticButton::new(DisplayItem::new("barrier"))
        .with_result(ClickResult::CancelAndClose)
        .into_ref()
}

/// A paginated child menu with a back button.
fn child_recipe(runtime: &MenuRuntime) -> MenuRecipe {
    let runtime = runtime.clone();
    recipe(move |viewer, _| {
        runtime
            .menu(viewer.clone())
            .title("Details")
            .rows(3)
            .page_area(PageArea::rect(0, 9, 1, 9).with_items(items(4)))
            .button(Slot::new(BACK), back_button())
            .build()
    })
}

/// A paginated parent whose size is read at build time, with a button that
/// opens `child` with history.
fn parent_recipe(
    runtime: &MenuRuntime,
    count: Arc<AtomicUsize>,
    rebuilds: Arc<AtomicUsize>,
    child: MenuRecipe,
) -> MenuRecipe {
    let runtime = runtime.clone();
    recipe(move |viewer, rebuilding| {
        if rebuilding {
            rebuilds.fetch_add(1, Ordering::SeqCst);
        }
        let child = child.clone();
        runtime
            .menu(viewer.clone())
            .title("Catalogue")
            .rows(3)
            .page_area(
                PageArea::rect(0, 9, 1, 9)
                    .with_items(items(count.load(Ordering::SeqCst)))
                    .with_nav_button(PageButtonType::Next, DisplayItem::new("arrow")),
            )
            .button(
                Slot::new(OPEN_CHILD),
                FnButton::new(DisplayItem::new("book"), move |ctx| {
                    if let Err(err) = ctx.open_with_history(child.clone()) {
                        ctx.viewer().send_message(&err.to_string());
                    }
                    Some(ClickResult::Cancel)
                })
                .into_ref(),
            )
            .build()
    })
}

fn open_menu(host: &HeadlessHost) -> Option<MenuHandle> {
    host.runtime.session().open_menu(host.viewer_id(1))
}

#[test]
fn test_back_rebuilds_parent_with_clamped_page() {
    let host = HeadlessHost::new();
    let count = Arc::new(AtomicUsize::new(27));
    let rebuilds = Arc::new(AtomicUsize::new(0));
    let parent = parent_recipe(&host.runtime, count.clone(), rebuilds.clone(), child_recipe(&host.runtime));
    let session = host.runtime.session();
    let viewer = host.viewer_id(1);

    let first = host
        .runtime
        .open_with_history(&host.viewer(1), parent)
        .expect("Failed to open parent");
    assert_eq!(session.history_len(viewer), 1);
    assert!(first.lock().is_navigation_owned());

    host.click(1, NEXT);
    host.click(1, NEXT);
    assert_eq!(first.lock().current_page(), Some(3));

    // Opening from a click is deferred until the click has been handled.
    host.click(1, OPEN_CHILD);
    assert!(open_menu(&host).expect("No open menu").ptr_eq(&first));
    host.tick();
    let child = open_menu(&host).expect("No open menu");
    assert_eq!(child.lock().title(), "Details");
    assert!(!first.lock().is_shown());
    assert_eq!(session.history_len(viewer), 2);

    // The parent shrinks to two pages while the child is open.
    count.store(12, Ordering::SeqCst);
    host.click(1, BACK);
    host.tick();

    let rebuilt = open_menu(&host).expect("No open menu");
    assert!(!rebuilt.ptr_eq(&first));
    assert_eq!(rebuilt.lock().title(), "Catalogue");
    assert_eq!(rebuilt.lock().current_page(), Some(2));
    assert_eq!(rebuilds.load(Ordering::SeqCst), 1);
    assert!(!child.lock().is_shown());
    assert_eq!(session.history_len(viewer), 1);

    // The rebuilt menu is still the current entry, so cleanup keeps it.
    host.advance(HISTORY_CLEANUP_DELAY_TICKS as usize + 1);
    assert_eq!(session.history_len(viewer), 1);
    assert!(session.is_navigation_current(viewer));
}

#[test]
fn test_back_keeps_saved_page_when_still_valid() {
    let host = HeadlessHost::new();
    let count = Arc::new(AtomicUsize::new(27));
    let parent = parent_recipe(
        &host.runtime,
        count,
        Arc::new(AtomicUsize::new(0)),
        child_recipe(&host.runtime),
    );
    host.runtime
        .open_with_history(&host.viewer(1), parent)
        .expect("Failed to open parent");

    host.click(1, NEXT);
    host.click(1, OPEN_CHILD);
    host.tick();
    host.click(1, BACK);
    host.tick();

    let rebuilt = open_menu(&host).expect("No open menu");
    assert_eq!(rebuilt.lock().current_page(), Some(2));
}

#[test]
fn test_back_without_previous_entry_dismisses() {
    let host = HeadlessHost::new();
    let root = host
        .runtime
        .open_with_history(&host.viewer(1), child_recipe(&host.runtime))
        .expect("Failed to open menu");

    root.close(CloseMode::ReopenParent);
    assert!(host.containers.open_view(host.viewer_id(1)).is_none());
    assert!(open_menu(&host).is_none());
    assert!(!host.runtime.session().has_history(host.viewer_id(1)));
}

#[test]
fn test_history_discarded_after_leaving_chain() {
    let host = HeadlessHost::new();
    let viewer = host.viewer_id(1);
    let session = host.runtime.session();
    host.runtime
        .open_with_history(&host.viewer(1), child_recipe(&host.runtime))
        .expect("Failed to open menu");

    // The viewer walks away and something unrelated opens.
    assert!(host.close_by_viewer(1));
    let other = host
        .runtime
        .menu(host.viewer(1))
        .title("Unrelated")
        .build()
        .expect("Failed to build menu");
    other.open().expect("Failed to open menu");

    host.tick();
    assert!(session.has_history(viewer));
    host.advance(HISTORY_CLEANUP_DELAY_TICKS as usize);
    assert!(!session.has_history(viewer));
}

#[test]
fn test_history_from_unrelated_menu_starts_new_chain() {
    let host = HeadlessHost::new();
    let viewer = host.viewer_id(1);
    let session = host.runtime.session();

    host.runtime
        .open_with_history(&host.viewer(1), child_recipe(&host.runtime))
        .expect("Failed to open menu");
    host.runtime
        .open_with_history(&host.viewer(1), child_recipe(&host.runtime))
        .expect("Failed to open menu");
    assert_eq!(session.history_len(viewer), 2);

    let other = host
        .runtime
        .menu(host.viewer(1))
        .build()
        .expect("Failed to build menu");
    other.open().expect("Failed to open menu");
    host.runtime
        .open_with_history(&host.viewer(1), child_recipe(&host.runtime))
        .expect("Failed to open menu");
    assert_eq!(session.history_len(viewer), 1);
}

#[test]
fn test_failed_rebuild_dismisses_and_discards() {
    let host = HeadlessHost::new();
    let viewer = host.viewer_id(1);
    let built = Arc::new(AtomicUsize::new(0));
    let runtime = host.runtime.clone();
    let counter = built.clone();
    let fragile = recipe(move |viewer, rebuilding| {
        counter.fetch_add(1, Ordering::SeqCst);
        if rebuilding {
            return Err(GridError::Reconstruction("shop closed".into()));
        }
        runtime.menu(viewer.clone()).title("Shop").build()
    });

    host.runtime
        .open_with_history(&host.viewer(1), fragile)
        .expect("Failed to open shop");
    let child = host
        .runtime
        .open_with_history(&host.viewer(1), child_recipe(&host.runtime))
        .expect("Failed to open child");
    assert_eq!(host.runtime.session().history_len(viewer), 2);

    child.close(CloseMode::ReopenParent);
    assert_eq!(built.load(Ordering::SeqCst), 2);
    assert!(host.containers.open_view(viewer).is_none());
    assert!(!host.runtime.session().has_history(viewer));
}

#[test]
fn test_forget_viewer_drops_history() {
    let host = HeadlessHost::new();
    let viewer = host.viewer_id(1);
    host.runtime
        .open_with_history(&host.viewer(1), child_recipe(&host.runtime))
        .expect("Failed to open menu");
    host.runtime.session().forget_viewer(viewer);
    assert!(!host.runtime.session().has_history(viewer));
    assert!(open_menu(&host).is_none());
}
