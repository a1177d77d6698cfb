//! Next-tick task queue.
//!
//! Tasks posted here run, in posting order, at the start of the next
//! scheduler tick.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

/// A unique identifier for a next-tick task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

impl TaskId {
    /// Get the raw u64 value of this task ID.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(1);

fn next_task_id() -> TaskId {
    TaskId(NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed))
}

/// A boxed one-shot task closure.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

struct TaskData {
    id: TaskId,
    task: Task,
}

/// FIFO of tasks waiting for the next tick.
#[derive(Default)]
pub(crate) struct TaskQueue {
    tasks: VecDeque<TaskData>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn post(&mut self, task: Task) -> TaskId {
        let id = next_task_id();
        self.tasks.push_back(TaskData { id, task });
        id
    }

    /// Returns `true` if the task was still pending.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        if let Some(pos) = self.tasks.iter().position(|t| t.id == id) {
            self.tasks.remove(pos);
            true
        } else {
            false
        }
    }

    pub fn pending_count(&self) -> usize {
        self.tasks.len()
    }

    /// Take every pending task so they can run without the owner's lock held.
    pub fn drain(&mut self) -> Vec<Task> {
        self.tasks.drain(..).map(|data| data.task).collect()
    }
}
