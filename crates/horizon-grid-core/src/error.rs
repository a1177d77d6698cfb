//! Error types for Horizon Grid core services.

/// Scheduler-specific errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchedulerError {
    /// The task ID is invalid, the task already ran, or it was cancelled.
    #[error("Invalid or expired scheduled task ID")]
    InvalidTaskId,
    /// A repeating task was requested with a zero-tick period.
    #[error("Repeating task period must be at least one tick")]
    ZeroPeriod,
}

/// A specialized Result type for Horizon Grid core operations.
pub type Result<T> = std::result::Result<T, SchedulerError>;
