//! Ordered ledger of named tasks with a monotonically advancing cursor.
//!
//! The ledger is driven by the install workflow (`start` / `stop_current`)
//! and read by the progress renderer (`snapshot`). Status reporting is
//! best-effort: out-of-order or redundant calls are logged, never raised.

use super::clock::Clock;
use std::sync::Arc;
use uoi_protocol::{Task, TaskStatus};

/// Ordered list of tasks plus the index of the active (or next) task.
///
/// Tasks before `current_index` are done, the task at `current_index` is
/// pending or running, and everything after it is pending.
pub struct TaskLedger {
    tasks: Vec<Task>,
    current_index: usize,
    max_name_width: usize,
    clock: Arc<dyn Clock>,
}

impl TaskLedger {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            tasks: Vec::new(),
            current_index: 0,
            max_name_width: 0,
            clock,
        }
    }

    /// Replace the ledger with one pending task per name and reset the cursor.
    pub fn register<S: AsRef<str>>(&mut self, names: &[S]) {
        self.tasks = names.iter().map(|n| Task::pending(n.as_ref())).collect();
        self.current_index = 0;
        self.max_name_width = self
            .tasks
            .iter()
            .map(|t| t.name.chars().count())
            .max()
            .unwrap_or(0);
    }

    /// Stamp a start time on the task at the cursor.
    ///
    /// A task still running at the cursor is stopped first. If `name` does not
    /// match the task at the cursor, a warning is logged and the task at the
    /// cursor is stamped anyway.
    ///
    /// Returns `false` if there was no task left to start.
    pub fn start(&mut self, name: &str) -> bool {
        if self.is_exhausted() {
            tracing::error!(task = name, "ran off end of task list, can't start task");
            return false;
        }

        if self.tasks[self.current_index].status() == TaskStatus::Running {
            self.stop_current();
            if self.is_exhausted() {
                tracing::error!(task = name, "ran off end of task list");
                return false;
            }
        }

        let expected = &self.tasks[self.current_index].name;
        if expected != name {
            tracing::warn!(
                expected = %expected,
                got = name,
                cursor = self.current_index,
                "task started out of declared order"
            );
            tracing::info!(tasks = ?self.names(), "declared task list");
        }

        let now = self.clock.now();
        let task = &mut self.tasks[self.current_index];
        task.started_at = Some(now);
        task.ended_at = None;
        true
    }

    /// Stamp an end time on the task at the cursor and advance the cursor.
    ///
    /// Calling this with the cursor already past the end is a logged no-op.
    /// Returns `false` in that case.
    pub fn stop_current(&mut self) -> bool {
        if self.is_exhausted() {
            tracing::error!(
                cursor = self.current_index,
                tasks = ?self.names(),
                "stop_current called too many times, skipping"
            );
            return false;
        }

        let now = self.clock.now();
        let task = &mut self.tasks[self.current_index];
        if task.started_at.is_none() {
            // Keep `ended_at => started_at` even when a task is stopped
            // without ever being started.
            task.started_at = Some(now);
        }
        task.ended_at = Some(now);
        self.current_index += 1;
        true
    }

    /// Copy of every task, in declared order.
    pub fn snapshot(&self) -> Vec<Task> {
        self.tasks.clone()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Length of the longest registered name, for right-aligning output.
    pub fn max_name_width(&self) -> usize {
        self.max_name_width
    }

    fn is_exhausted(&self) -> bool {
        self.current_index >= self.tasks.len()
    }

    fn names(&self) -> Vec<&str> {
        self.tasks.iter().map(|t| t.name.as_str()).collect()
    }
}
