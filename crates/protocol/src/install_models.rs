//! Operator-facing install options and workflow outcomes.

use serde::{Deserialize, Serialize};

/// How the installer interacts with the operator.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum InstallMode {
    /// Full-screen terminal UI with live progress.
    #[default]
    Interactive,

    /// Plain console output, no live progress.
    Headless,
}

/// Options supplied by the operator for a single install run.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallOptions {
    pub mode: InstallMode,

    /// Stop after the orchestration agent is bootstrapped.
    #[serde(default)]
    pub install_only: bool,

    /// Extra trusted package source added to the container's init config.
    #[serde(default)]
    pub extra_ppa: Option<String>,
}

/// How a successful workflow run ended.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum InstallOutcome {
    /// Bootstrap finished and the operator asked to stop there.
    InstalledOnly,

    /// The long-running status watch returned.
    StatusWatchExited,
}
