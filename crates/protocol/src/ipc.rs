//! Core-to-UI event protocol.
//!
//! The installer core runs on a background task and reports to whatever
//! frontend is attached by sending `Event`s over a channel. The frontend
//! never calls back into the core.
//!
//! Uses tagged enum serialization:
//! ```json
//! {
//!   "type": "infoMessage",
//!   "payload": { "message": "Building environment" }
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::install_models::InstallOutcome;
use crate::task_models::StatusLine;

/// Events sent from the installer core to the UI.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Event {
    /// A fresh rendering of the task list.
    ///
    /// Replaces whatever the UI showed before.
    ProgressRendered { lines: Vec<StatusLine> },

    /// A one-line status message for the operator.
    InfoMessage { message: String },

    /// The workflow is about to attach the status watch to the terminal.
    ///
    /// The UI must give up the terminal before the watch starts.
    StatusWatchStarting,

    /// The workflow hit a fatal error and stopped.
    InstallFailed { error: String },

    /// The workflow finished successfully.
    InstallFinished { outcome: InstallOutcome },
}
