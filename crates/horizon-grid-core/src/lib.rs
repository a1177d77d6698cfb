//! Core systems for Horizon Grid.
//!
//! This crate provides the host-facing services the menu engine builds on:
//!
//! - **Scheduler**: tick-based deferred, delayed and repeating work
//! - **Task Queue**: next-tick tasks
//! - **Thread Checks**: primary-thread registration and affinity
//! - **Logging**: tracing targets and performance spans
//!
//! # Example
//!
//! ```
//! use horizon_grid_core::{Scheduler, TickScheduler};
//!
//! let scheduler = TickScheduler::new();
//! scheduler.run(Box::new(|| println!("next tick")));
//! let id = scheduler
//!     .run_repeating(1, 20, Box::new(|| println!("every second")))
//!     .unwrap();
//!
//! // Host main loop:
//! for _ in 0..40 {
//!     scheduler.tick();
//! }
//! scheduler.cancel(id).unwrap();
//! ```

mod error;
pub mod logging;
mod scheduler;
mod task;
pub mod thread_check;

pub use error::{Result, SchedulerError};
pub use logging::PerfSpan;
pub use scheduler::{
    RepeatingTask, ScheduledTaskId, ScheduledTaskKind, Scheduler, Tick, TickScheduler,
};
pub use task::{Task, TaskId};
