//! The progress-reporting seam between the workflow and a display.

/// Progress sink driven by the install workflow.
///
/// Every implementation accepts the same calls in the same order; a workflow
/// must work unmodified against any of them. None of these methods may fail:
/// progress reporting never aborts an installation.
pub trait ProgressReporter: Send + Sync {
    /// Declare the full, ordered list of task names for this run.
    fn register_tasks(&self, names: &[&str]);

    /// Mark `name` as started, stopping whatever task is still running.
    fn start_task(&self, name: &str);

    /// Mark the running task as finished.
    fn stop_current_task(&self);

    /// Stop periodic rendering. Safe to call from any thread.
    fn halt(&self);
}
