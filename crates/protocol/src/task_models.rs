//! Progress task models.
//!
//! This module defines the records kept for each named installation
//! checkpoint and the rendered status lines pushed to a display.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a single named task.
///
/// A task moves Pending -> Running -> Done and never back.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Task has not been started yet.
    Pending,

    /// Task has a start timestamp but no end timestamp.
    Running,

    /// Task has both timestamps.
    Done,
}

/// A named installation checkpoint with its start/end timestamps.
///
/// `ended_at` is only ever set when `started_at` is set.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// Display name, e.g. "Creating container".
    pub name: String,

    /// When the task was started, if it has been.
    pub started_at: Option<DateTime<Utc>>,

    /// When the task was stopped, if it has been.
    pub ended_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Create a pending task.
    pub fn pending(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            started_at: None,
            ended_at: None,
        }
    }

    /// Derive the status from which timestamps are present.
    pub fn status(&self) -> TaskStatus {
        match (self.started_at, self.ended_at) {
            (None, _) => TaskStatus::Pending,
            (Some(_), None) => TaskStatus::Running,
            (Some(_), Some(_)) => TaskStatus::Done,
        }
    }

    /// Elapsed seconds for a started task.
    ///
    /// Running tasks are measured against `now`, done tasks against their
    /// own end timestamp. Pending tasks have no elapsed time.
    pub fn elapsed_secs(&self, now: DateTime<Utc>) -> Option<f64> {
        let started = self.started_at?;
        let end = self.ended_at.unwrap_or(now);
        Some((end - started).num_microseconds().unwrap_or(0) as f64 / 1_000_000.0)
    }
}

/// One rendered line of the progress view.
///
/// `emphasis` marks finished tasks; backends that support styling render
/// these differently, others ignore the flag.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub text: String,
    pub emphasis: bool,
}

impl StatusLine {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            emphasis: false,
        }
    }

    pub fn emphasized(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            emphasis: true,
        }
    }
}
