//! Polling for the container's cloud-init completion.
//!
//! Completion is not directly observable, so the poller repeatedly reads the
//! status artifact cloud-init writes when its configuration phase is over.
//! Unreadable or empty artifacts mean "not yet"; the wait has no upper bound.

use super::error::{InstallError, InstallResult};
use crate::container::ContainerRuntime;
use std::time::Duration;
use uoi_protocol::{ReadinessSnapshot, ReadinessState};

/// Command that prints the status artifact from inside the container.
pub const STATUS_ARTIFACT_COMMAND: &str = "sudo cat /run/cloud-init/result.json";

/// Delay between two polls.
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Decode a status artifact read from the container.
///
/// Empty (or whitespace-only) content is `NotReady`. Content that is present
/// but cannot be decoded is a fatal [`InstallError::StatusArtifact`].
pub fn evaluate_artifact(raw: &[u8]) -> InstallResult<ReadinessState> {
    let text = String::from_utf8_lossy(raw);
    if text.trim().is_empty() {
        return Ok(ReadinessState::NotReady);
    }

    let snapshot: ReadinessSnapshot =
        serde_json::from_str(&text).map_err(|e| InstallError::StatusArtifact {
            reason: e.to_string(),
        })?;

    if snapshot.errors().is_empty() {
        Ok(ReadinessState::Ready)
    } else {
        Ok(ReadinessState::ReadyWithErrors(snapshot.errors().to_vec()))
    }
}

/// Waits for cloud-init inside a container to finish.
pub struct ReadinessPoller<'a> {
    runtime: &'a dyn ContainerRuntime,
    container: &'a str,
    interval: Duration,
}

impl<'a> ReadinessPoller<'a> {
    pub fn new(runtime: &'a dyn ContainerRuntime, container: &'a str) -> Self {
        Self {
            runtime,
            container,
            interval: POLL_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Poll once.
    ///
    /// Runtime failures are absorbed as `NotReady`: the container may not be
    /// reachable yet, or the artifact may not exist yet.
    pub async fn check(&self) -> InstallResult<ReadinessState> {
        match self.runtime.run(self.container, STATUS_ARTIFACT_COMMAND).await {
            Ok(raw) => {
                tracing::debug!(artifact = %String::from_utf8_lossy(&raw), "read status artifact");
                evaluate_artifact(&raw)
            }
            Err(e) => {
                tracing::debug!(error = %e, "waiting for cloud-init status result");
                Ok(ReadinessState::NotReady)
            }
        }
    }

    /// Poll until cloud-init reports completion.
    ///
    /// Returns `Ready` or `ReadyWithErrors`. Errors recorded by cloud-init
    /// are logged but do not fail the install.
    pub async fn wait(&self) -> InstallResult<ReadinessState> {
        let mut attempts: u32 = 1;
        loop {
            let state = self.check().await?;
            match &state {
                ReadinessState::NotReady => {
                    tokio::time::sleep(self.interval).await;
                    attempts += 1;
                }
                ReadinessState::Ready => {
                    tracing::info!(container = self.container, attempts, "cloud-init finished");
                    return Ok(state);
                }
                ReadinessState::ReadyWithErrors(errors) => {
                    // Known noisy failures (pollinate) do not affect the install.
                    tracing::error!(
                        container = self.container,
                        attempts,
                        ?errors,
                        "container cloud-init finished with errors"
                    );
                    return Ok(state);
                }
            }
        }
    }
}
