//! Logging facilities for Horizon Grid.
//!
//! Horizon Grid uses the `tracing` crate for instrumentation. To see logs,
//! install a subscriber in the host application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("horizon_grid=debug")
//!     .init();
//! ```
//!
//! Every event emitted by the workspace uses one of the [`targets`] below so
//! subsystems can be filtered independently.

/// Target names for log filtering.
pub mod targets {
    /// Scheduler target.
    pub const SCHEDULER: &str = "horizon_grid::scheduler";
    /// Click classification and result application.
    pub const CLICK: &str = "horizon_grid::click";
    /// Menu lifecycle (build, open, close, refresh).
    pub const MENU: &str = "horizon_grid::menu";
    /// Navigation history and session bookkeeping.
    pub const NAVIGATION: &str = "horizon_grid::navigation";
    /// Performance spans.
    pub const PERF: &str = "horizon_grid::perf";
}

/// Span names used for performance tracing.
pub mod span_names {
    /// Whole-container fill.
    pub const FILL: &str = "horizon_grid::fill";
}

/// A guard that keeps a `debug` span named after an operation entered until
/// dropped. Subscribers that record span timings see its duration.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Enter a new performance span for `name`.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::debug_span!(target: targets::PERF, "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perf_span_with_subscriber() {
        let subscriber = tracing_subscriber::fmt().with_test_writer().finish();
        tracing::subscriber::with_default(subscriber, || {
            let _span = PerfSpan::new(span_names::FILL);
            tracing::debug!(target: targets::MENU, "inside span");
        });
    }
}
