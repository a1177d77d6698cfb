//! Tests for opening, closing, parents and auto refresh.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use horizon_grid::headless::HeadlessHost;
use horizon_grid::{
    ClickResult, CloseMode, Container, DEFAULT_ERROR_MESSAGE, DisplayItem, FnButton, MenuHandle, MenuOptions, ParentLink, Slot,
    StaticButton, ViewerRef,
};

fn plain(host: &HeadlessHost, title: &str) -> MenuHandle {
    host.runtime
        .menu(host.viewer(1))
        .title(title)
        .button(Slot::new(0), StaticButton::new(DisplayItem::new("stone")).into_ref())
        .build()
        .expect("Failed to build menu")
}

fn counter() -> (Arc<AtomicUsize>, impl Fn(&mut horizon_grid::Menu) + Send + Sync + 'static) {
    let count = Arc::new(AtomicUsize::new(0));
    let hook = count.clone();
    (count, move |_: &mut horizon_grid::Menu| {
        hook.fetch_add(1, Ordering::SeqCst);
    })
}

#[test]
fn test_open_paints_and_registers() {
    let host = HeadlessHost::new();
    let (opened, on_open) = counter();
    let menu = host
        .runtime
        .menu(host.viewer(1))
        .title("Vault")
        .on_open(on_open)
        .button(Slot::new(4), StaticButton::new(DisplayItem::new("gold")).into_ref())
        .build()
        .expect("Failed to build menu");
    menu.open().expect("Failed to open menu");

    let container = host
        .containers
        .viewed_container(host.viewer_id(1))
        .expect("No open view");
    assert_eq!(container.title(), "Vault");
    assert_eq!(container.item(4).map(|i| i.material().to_owned()).as_deref(), Some("gold"));
    assert_eq!(opened.load(Ordering::SeqCst), 1);
    assert!(menu.lock().is_shown());

    // Reopening reuses the container.
    menu.open().expect("Failed to reopen menu");
    assert_eq!(host.containers.built_count(), 1);
}

#[test]
fn test_open_from_click_is_deferred() {
    let host = HeadlessHost::new();
    let next = plain(&host, "Next");
    let target = next.clone();
    let menu = host
        .runtime
        .menu(host.viewer(1))
        .button(
            Slot::new(0),
            FnButton::new(DisplayItem::new("door"), move |_| {
                target.open().expect("Failed to queue open");
                Some(ClickResult::Cancel)
            })
            .into_ref(),
        )
        .build()
        .expect("Failed to build menu");
    menu.open().expect("Failed to open menu");

    host.click(1, 0);
    assert!(!next.lock().is_shown());
    host.tick();
    assert!(next.lock().is_shown());
    assert!(!menu.lock().is_shown());
}

#[test]
fn test_open_off_primary_thread_is_deferred() {
    let host = HeadlessHost::new();
    let menu = plain(&host, "Remote");
    std::thread::scope(|scope| {
        scope.spawn(|| menu.open().expect("Failed to queue open"));
    });
    assert!(!menu.lock().is_shown());
    host.tick();
    assert!(menu.lock().is_shown());
}

#[test]
fn test_close_from_click_runs_once() {
    let host = HeadlessHost::new();
    let (closed, on_close) = counter();
    let menu = host
        .runtime
        .menu(host.viewer(1))
        .on_close(on_close)
        .button(
            Slot::new(0),
            FnButton::new(DisplayItem::new("exit"), |ctx| {
                ctx.close(CloseMode::Dismiss);
                Some(ClickResult::CancelAndClose)
            })
            .into_ref(),
        )
        .build()
        .expect("Failed to build menu");
    menu.open().expect("Failed to open menu");

    let (_, event) = host.click(1, 0);
    assert!(event.cancelled);
    assert!(menu.lock().is_shown());

    host.advance(3);
    assert!(!menu.lock().is_shown());
    assert_eq!(closed.load(Ordering::SeqCst), 1);
    assert!(host.containers.open_view(host.viewer_id(1)).is_none());
}

#[test]
fn test_close_reopens_parent() {
    let host = HeadlessHost::new();
    let parent = plain(&host, "Parent");
    let child = host
        .runtime
        .menu(host.viewer(1))
        .title("Child")
        .parent_menu(parent.clone())
        .build()
        .expect("Failed to build menu");
    child.open().expect("Failed to open menu");

    child.close(CloseMode::ReopenParent);
    assert!(parent.lock().is_shown());
    assert!(!child.lock().is_shown());
    let open = host.runtime.session().open_menu(host.viewer_id(1)).expect("No open menu");
    assert!(open.ptr_eq(&parent));
}

#[test]
fn test_parent_guard_and_force() {
    let host = HeadlessHost::new();
    let parent = host
        .runtime
        .menu(host.viewer(1))
        .title("Parent")
        .allow_reopen_from(|child| child.title != "Locked")
        .build()
        .expect("Failed to build menu");
    let build_child = || {
        host.runtime
            .menu(host.viewer(1))
            .title("Locked")
            .parent_menu(parent.clone())
            .build()
            .expect("Failed to build menu")
    };

    let refused = build_child();
    refused.open().expect("Failed to open menu");
    refused.close(CloseMode::ReopenParent);
    assert!(!parent.lock().is_shown());
    assert!(host.containers.open_view(host.viewer_id(1)).is_none());

    let forced = build_child();
    forced.open().expect("Failed to open menu");
    forced.close(CloseMode::ForceReopenParent);
    assert!(parent.lock().is_shown());
}

#[test]
fn test_menu_as_its_own_parent_dismisses() {
    let host = HeadlessHost::new();
    let menu = plain(&host, "Loop");
    let this = menu.clone();
    menu.lock().set_parent(ParentLink::Getter(Arc::new(move |_: &ViewerRef| {
        Some(this.clone())
    })));
    menu.open().expect("Failed to open menu");

    menu.close(CloseMode::ReopenParent);
    assert!(!menu.lock().is_shown());
    assert!(host.containers.open_view(host.viewer_id(1)).is_none());
}

#[test]
fn test_parent_callback_runs() {
    let host = HeadlessHost::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = calls.clone();
    let menu = host
        .runtime
        .menu(host.viewer(1))
        .parent_callback(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        })
        .build()
        .expect("Failed to build menu");
    menu.open().expect("Failed to open menu");

    menu.close(CloseMode::ReopenParent);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_viewer_close_reopens_parent_when_enabled() {
    let host = HeadlessHost::new();
    let parent = plain(&host, "Parent");
    let child = host
        .runtime
        .menu(host.viewer(1))
        .options(MenuOptions {
            reopen_parent_on_close: true,
            ..MenuOptions::default()
        })
        .parent_menu(parent.clone())
        .build()
        .expect("Failed to build menu");
    child.open().expect("Failed to open menu");

    assert!(host.close_by_viewer(1));
    assert!(!child.lock().is_shown());
    assert!(!parent.lock().is_shown());
    host.tick();
    assert!(parent.lock().is_shown());
}

#[test]
fn test_viewer_close_without_option_stays_closed() {
    let host = HeadlessHost::new();
    let parent = plain(&host, "Parent");
    let (closed, on_close) = counter();
    let child = host
        .runtime
        .menu(host.viewer(1))
        .on_close(on_close)
        .parent_menu(parent.clone())
        .build()
        .expect("Failed to build menu");
    child.open().expect("Failed to open menu");

    host.close_by_viewer(1);
    host.advance(2);
    assert!(!parent.lock().is_shown());
    assert_eq!(closed.load(Ordering::SeqCst), 1);
}

#[test]
fn test_auto_refresh_while_open() {
    let host = HeadlessHost::new();
    let paints = Arc::new(AtomicUsize::new(0));
    let counted = paints.clone();
    let menu = host
        .runtime
        .menu(host.viewer(1))
        .options(MenuOptions::default().with_refresh_interval(2))
        .button(
            Slot::new(0),
            FnButton::dynamic(
                move |_| {
                    counted.fetch_add(1, Ordering::SeqCst);
                    Some(DisplayItem::new("clock"))
                },
                |_| None,
            )
            .into_ref(),
        )
        .build()
        .expect("Failed to build menu");
    menu.open().expect("Failed to open menu");
    assert_eq!(paints.load(Ordering::SeqCst), 1);

    host.advance(4);
    assert_eq!(paints.load(Ordering::SeqCst), 3);

    menu.close(CloseMode::Dismiss);
    host.advance(4);
    assert_eq!(paints.load(Ordering::SeqCst), 3);
    assert!(!host.scheduler.has_pending());
}

#[test]
fn test_auto_refresh_display_panic_closes_menu() {
    let host = HeadlessHost::new();
    let paints = Arc::new(AtomicUsize::new(0));
    let counted = paints.clone();
    let menu = host
        .runtime
        .menu(host.viewer(1))
        .options(MenuOptions::default().with_refresh_interval(2))
        .button(
            Slot::new(0),
            FnButton::dynamic(
                move |_| {
                    if counted.fetch_add(1, Ordering::SeqCst) > 0 {
                        panic!("clock broke");
                    }
                    Some(DisplayItem::new("clock"))
                },
                |_| None,
            )
            .into_ref(),
        )
        .build()
        .expect("Failed to build menu");
    menu.open().expect("Failed to open menu");

    host.advance(2);
    assert!(!menu.lock().is_shown());
    assert!(host.containers.open_view(host.viewer_id(1)).is_none());
    assert_eq!(host.messages(1), vec![DEFAULT_ERROR_MESSAGE.to_owned()]);
    assert!(!host.scheduler.has_pending());
}

#[test]
fn test_replaced_view_detaches_previous_menu() {
    let host = HeadlessHost::new();
    let (closed, on_close) = counter();
    let first = host
        .runtime
        .menu(host.viewer(1))
        .on_close(on_close)
        .build()
        .expect("Failed to build menu");
    let second = plain(&host, "Second");

    first.open().expect("Failed to open menu");
    second.open().expect("Failed to open menu");
    assert!(!first.lock().is_shown());
    assert!(second.lock().is_shown());
    // Being replaced is not a close.
    assert_eq!(closed.load(Ordering::SeqCst), 0);
}
