//! Primary-thread verification for Horizon Grid.
//!
//! Menus are mutated, painted and clicked on the host's primary thread (the
//! thread that drives its main-loop tick). Work that arrives anywhere else is
//! not executed inline: it is re-queued through the scheduler so that it runs
//! one tick later on the primary thread.
//!
//! # Usage
//!
//! The host registers its primary thread once at startup:
//!
//! ```
//! use horizon_grid_core::thread_check::{is_primary_thread, set_primary_thread};
//!
//! set_primary_thread();
//! assert!(is_primary_thread());
//! ```
//!
//! Before registration every thread counts as primary, so single-threaded
//! hosts and unit tests never need to call [`set_primary_thread`].
//!
//! # Affinity
//!
//! A [`ThreadAffinity`] records the thread a component was created on. The
//! tick scheduler can be bound to one so that its notion of "primary context"
//! is local to that scheduler rather than process-wide.

use std::sync::OnceLock;
use std::thread::ThreadId;

/// Global storage for the primary thread ID.
static PRIMARY_THREAD_ID: OnceLock<ThreadId> = OnceLock::new();

/// Register the current thread as the primary thread.
///
/// # Panics
///
/// Panics if a different thread was already registered.
pub fn set_primary_thread() {
    let current = std::thread::current().id();
    if PRIMARY_THREAD_ID.set(current).is_err() && PRIMARY_THREAD_ID.get() != Some(&current) {
        panic!(
            "set_primary_thread() called from a different thread than the original. \
             The primary thread can only be registered once."
        );
    }
}

/// Get the primary thread ID if it has been registered.
#[inline]
pub fn primary_thread_id() -> Option<ThreadId> {
    PRIMARY_THREAD_ID.get().copied()
}

/// Check if the current thread is the primary thread.
///
/// Returns `true` when no primary thread has been registered yet.
#[inline]
pub fn is_primary_thread() -> bool {
    primary_thread_id().is_none_or(|primary| primary == std::thread::current().id())
}

/// Thread affinity tracker.
///
/// ```
/// use horizon_grid_core::thread_check::ThreadAffinity;
///
/// let affinity = ThreadAffinity::current();
/// assert!(affinity.is_same_thread());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ThreadAffinity {
    thread_id: ThreadId,
}

impl Default for ThreadAffinity {
    fn default() -> Self {
        Self::current()
    }
}

impl ThreadAffinity {
    /// Create an affinity for the current thread.
    #[inline]
    pub fn current() -> Self {
        Self {
            thread_id: std::thread::current().id(),
        }
    }

    /// The thread this affinity is bound to.
    #[inline]
    pub fn thread_id(&self) -> ThreadId {
        self.thread_id
    }

    /// Check if the current thread matches this affinity.
    #[inline]
    pub fn is_same_thread(&self) -> bool {
        std::thread::current().id() == self.thread_id
    }
}
