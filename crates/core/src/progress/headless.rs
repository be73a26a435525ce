//! Progress reporter for runs without an interactive display.

use super::reporter::ProgressReporter;

/// Accepts every progress call and only leaves a debug trace.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeadlessProgress;

impl HeadlessProgress {
    pub fn new() -> Self {
        Self
    }
}

impl ProgressReporter for HeadlessProgress {
    fn register_tasks(&self, names: &[&str]) {
        tracing::debug!(tasks = ?names, "headless: register_tasks");
    }

    fn start_task(&self, name: &str) {
        tracing::debug!(task = name, "headless: start_task");
    }

    fn stop_current_task(&self) {
        tracing::debug!("headless: stop_current_task");
    }

    fn halt(&self) {
        tracing::debug!("headless: halt");
    }
}
