//! Tick-based scheduler for deferred and periodic work.
//!
//! Everything in Horizon Grid that cannot run inline (a close requested while
//! a click is still being handled, an open requested off the primary thread,
//! periodic menu refreshes, navigation history cleanup) goes through the
//! [`Scheduler`] trait. Hosts either implement the trait on top of their own
//! tick source or drive the bundled [`TickScheduler`] by calling
//! [`TickScheduler::tick`] once per main-loop iteration.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! use horizon_grid_core::{Scheduler, TickScheduler};
//!
//! let scheduler = TickScheduler::new();
//! let fired = Arc::new(AtomicUsize::new(0));
//!
//! let counter = fired.clone();
//! scheduler.run_later(2, Box::new(move || {
//!     counter.fetch_add(1, Ordering::SeqCst);
//! }));
//!
//! scheduler.tick();
//! assert_eq!(fired.load(Ordering::SeqCst), 0);
//! scheduler.tick();
//! assert_eq!(fired.load(Ordering::SeqCst), 1);
//! ```

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

use crate::error::{Result, SchedulerError};
use crate::logging::targets;
use crate::task::{Task, TaskId, TaskQueue};
use crate::thread_check::{self, ThreadAffinity};

/// A scheduler tick count.
pub type Tick = u64;

new_key_type! {
    /// A unique identifier for a delayed or repeating task.
    pub struct ScheduledTaskId;
}

/// The type of scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduledTaskKind {
    /// Executes once at the scheduled tick.
    OneShot,
    /// Executes repeatedly every `period` ticks.
    Repeating,
}

/// A boxed repeating task closure.
pub type RepeatingTask = Box<dyn FnMut() + Send + 'static>;

/// Deferred-work collaborator used by menus.
///
/// All methods take `&self`; implementations are shared behind an `Arc`.
pub trait Scheduler: Send + Sync {
    /// Run `task` at the start of the next tick.
    fn run(&self, task: Task) -> TaskId;

    /// Run `task` once, `delay` ticks from now. A delay of zero still defers
    /// to the next tick.
    fn run_later(&self, delay: Tick, task: Task) -> ScheduledTaskId;

    /// Run `task` after `initial_delay` ticks and then every `period` ticks
    /// until cancelled.
    fn run_repeating(
        &self,
        initial_delay: Tick,
        period: Tick,
        task: RepeatingTask,
    ) -> Result<ScheduledTaskId>;

    /// Cancel a delayed or repeating task.
    fn cancel(&self, id: ScheduledTaskId) -> Result<()>;

    /// Whether the caller is on the context that is allowed to touch menus.
    fn is_primary_context(&self) -> bool {
        thread_check::is_primary_thread()
    }
}

enum TaskBody {
    Once(Task),
    Repeating(RepeatingTask),
}

struct ScheduledTaskData {
    /// The tick at which this task should next execute.
    next_run: Tick,
    /// The period for repeating tasks.
    interval: Tick,
    kind: ScheduledTaskKind,
    /// Taken out while the task is executing.
    body: Option<TaskBody>,
}

/// An entry in the scheduler queue (min-heap by tick, FIFO within a tick).
#[derive(Debug, Clone, Copy)]
struct SchedulerQueueEntry {
    id: ScheduledTaskId,
    run_tick: Tick,
    sequence: u64,
}

impl PartialEq for SchedulerQueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.run_tick == other.run_tick && self.sequence == other.sequence
    }
}

impl Eq for SchedulerQueueEntry {}

impl PartialOrd for SchedulerQueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SchedulerQueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for a min-heap; older entries first within the same tick.
        other
            .run_tick
            .cmp(&self.run_tick)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

enum DueTask {
    Once(Task),
    Repeating {
        id: ScheduledTaskId,
        run_tick: Tick,
        task: RepeatingTask,
    },
}

struct SchedulerState {
    current_tick: Tick,
    sequence: u64,
    next_tick: TaskQueue,
    tasks: SlotMap<ScheduledTaskId, ScheduledTaskData>,
    queue: BinaryHeap<SchedulerQueueEntry>,
}

impl SchedulerState {
    fn new() -> Self {
        Self {
            current_tick: 0,
            sequence: 0,
            next_tick: TaskQueue::new(),
            tasks: SlotMap::with_key(),
            queue: BinaryHeap::new(),
        }
    }

    fn enqueue(&mut self, id: ScheduledTaskId, run_tick: Tick) {
        self.sequence += 1;
        self.queue.push(SchedulerQueueEntry {
            id,
            run_tick,
            sequence: self.sequence,
        });
    }

    fn insert(
        &mut self,
        delay: Tick,
        interval: Tick,
        kind: ScheduledTaskKind,
        body: TaskBody,
    ) -> ScheduledTaskId {
        let next_run = self.current_tick + delay;
        let id = self.tasks.insert(ScheduledTaskData {
            next_run,
            interval,
            kind,
            body: Some(body),
        });
        self.enqueue(id, next_run);
        id
    }

    /// Pop every task due at or before the current tick.
    fn take_due(&mut self) -> Vec<DueTask> {
        let mut due = Vec::new();

        while let Some(entry) = self.queue.peek().copied() {
            if entry.run_tick > self.current_tick {
                break;
            }
            self.queue.pop();

            let Some(data) = self.tasks.get_mut(entry.id) else {
                continue;
            };
            // Stale entry from an earlier schedule of the same task.
            if entry.run_tick != data.next_run {
                continue;
            }

            let kind = data.kind;
            match kind {
                ScheduledTaskKind::OneShot => {
                    if let Some(TaskBody::Once(task)) =
                        self.tasks.remove(entry.id).and_then(|d| d.body)
                    {
                        due.push(DueTask::Once(task));
                    }
                }
                ScheduledTaskKind::Repeating => {
                    if let Some(TaskBody::Repeating(task)) =
                        self.tasks.get_mut(entry.id).and_then(|d| d.body.take())
                    {
                        due.push(DueTask::Repeating {
                            id: entry.id,
                            run_tick: entry.run_tick,
                            task,
                        });
                    }
                }
            }
        }

        due
    }

    fn pending_count(&self) -> usize {
        self.next_tick.pending_count() + self.tasks.len()
    }
}

/// The bundled [`Scheduler`] implementation.
///
/// Tasks never run while the scheduler's own lock is held, so a task may
/// freely schedule or cancel other tasks; anything it schedules runs on a
/// later tick.
pub struct TickScheduler {
    state: Mutex<SchedulerState>,
    affinity: Option<ThreadAffinity>,
}

impl TickScheduler {
    /// Create a scheduler whose primary context is the process-wide primary
    /// thread (see [`thread_check`](crate::thread_check)).
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SchedulerState::new()),
            affinity: None,
        }
    }

    /// Create a scheduler whose primary context is the calling thread.
    pub fn bound_to_current_thread() -> Self {
        Self {
            state: Mutex::new(SchedulerState::new()),
            affinity: Some(ThreadAffinity::current()),
        }
    }

    /// The number of ticks processed so far.
    pub fn current_tick(&self) -> Tick {
        self.state.lock().current_tick
    }

    /// Advance one tick and run everything that became due.
    ///
    /// Returns the number of tasks executed.
    #[tracing::instrument(skip(self), target = "horizon_grid::scheduler", level = "trace")]
    pub fn tick(&self) -> usize {
        let (immediate, due) = {
            let mut state = self.state.lock();
            state.current_tick += 1;
            let immediate = state.next_tick.drain();
            let due = state.take_due();
            (immediate, due)
        };

        let mut executed = 0;
        for task in immediate {
            task();
            executed += 1;
        }

        for entry in due {
            match entry {
                DueTask::Once(task) => task(),
                DueTask::Repeating {
                    id,
                    run_tick,
                    mut task,
                } => {
                    task();
                    let mut state = self.state.lock();
                    let next_run = match state.tasks.get_mut(id) {
                        Some(data) => {
                            data.body = Some(TaskBody::Repeating(task));
                            // Base on the scheduled tick to avoid drift.
                            data.next_run = run_tick + data.interval;
                            Some(data.next_run)
                        }
                        // Cancelled while running.
                        None => None,
                    };
                    if let Some(next_run) = next_run {
                        state.enqueue(id, next_run);
                    }
                }
            }
            executed += 1;
        }

        if executed > 0 {
            tracing::trace!(target: targets::SCHEDULER, executed, "tick processed");
        }
        executed
    }

    /// Tick until nothing is pending or `max_ticks` ticks have run.
    ///
    /// Repeating tasks keep the scheduler busy, so they always consume the
    /// full budget. Returns the number of ticks run.
    pub fn run_until_idle(&self, max_ticks: usize) -> usize {
        let mut ticks = 0;
        while ticks < max_ticks && self.has_pending() {
            self.tick();
            ticks += 1;
        }
        ticks
    }

    /// Check if a delayed or repeating task is still registered.
    pub fn is_active(&self, id: ScheduledTaskId) -> bool {
        self.state.lock().tasks.contains_key(id)
    }

    /// Cancel a task posted with [`Scheduler::run`].
    pub fn cancel_next_tick(&self, id: TaskId) -> bool {
        self.state.lock().next_tick.cancel(id)
    }

    /// Number of pending next-tick, delayed and repeating tasks.
    pub fn pending_count(&self) -> usize {
        self.state.lock().pending_count()
    }

    /// Check if any work is pending.
    pub fn has_pending(&self) -> bool {
        self.pending_count() > 0
    }

    /// Ticks until the next queued work becomes due, if any.
    pub fn ticks_until_next(&self) -> Option<Tick> {
        let mut state = self.state.lock();
        if state.next_tick.pending_count() > 0 {
            return Some(1);
        }

        // Drop cancelled entries from the front of the queue.
        while let Some(entry) = state.queue.peek().copied() {
            if state.tasks.get(entry.id).is_some_and(|t| t.next_run == entry.run_tick) {
                break;
            }
            state.queue.pop();
        }

        let current = state.current_tick;
        state
            .queue
            .peek()
            .map(|entry| entry.run_tick.saturating_sub(current).max(1))
    }
}

impl Default for TickScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for TickScheduler {
    fn run(&self, task: Task) -> TaskId {
        self.state.lock().next_tick.post(task)
    }

    fn run_later(&self, delay: Tick, task: Task) -> ScheduledTaskId {
        self.state
            .lock()
            .insert(delay, delay, ScheduledTaskKind::OneShot, TaskBody::Once(task))
    }

    fn run_repeating(
        &self,
        initial_delay: Tick,
        period: Tick,
        task: RepeatingTask,
    ) -> Result<ScheduledTaskId> {
        if period == 0 {
            return Err(SchedulerError::ZeroPeriod);
        }
        Ok(self.state.lock().insert(
            initial_delay,
            period,
            ScheduledTaskKind::Repeating,
            TaskBody::Repeating(task),
        ))
    }

    fn cancel(&self, id: ScheduledTaskId) -> Result<()> {
        self.state
            .lock()
            .tasks
            .remove(id)
            .map(|_| ())
            .ok_or(SchedulerError::InvalidTaskId)
    }

    fn is_primary_context(&self) -> bool {
        match self.affinity {
            Some(affinity) => affinity.is_same_thread(),
            None => thread_check::is_primary_thread(),
        }
    }
}

static_assertions::assert_impl_all!(TickScheduler: Send, Sync);
