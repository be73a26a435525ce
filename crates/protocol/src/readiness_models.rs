//! Decoded cloud-init status artifact.
//!
//! The in-container init system writes `/run/cloud-init/result.json` once
//! its configuration phase is over:
//!
//! ```json
//! { "v1": { "datasource": "DataSourceNoCloud", "errors": [] } }
//! ```

use serde::{Deserialize, Serialize};

/// Top-level shape of the status artifact.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ReadinessSnapshot {
    pub v1: ReadinessResult,
}

/// Versioned body of the status artifact.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ReadinessResult {
    #[serde(default)]
    pub datasource: Option<String>,

    /// Errors recorded by the init system, in the order they occurred.
    #[serde(default)]
    pub errors: Vec<String>,
}

impl ReadinessSnapshot {
    pub fn errors(&self) -> &[String] {
        &self.v1.errors
    }
}

/// State of the container's init system as seen by a single poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadinessState {
    /// Artifact unreadable or empty; poll again.
    NotReady,

    /// Artifact present with no recorded errors.
    Ready,

    /// Artifact present with recorded errors.
    ReadyWithErrors(Vec<String>),
}
