//! The installation workflow and its readiness check.

pub mod error;
pub mod readiness;
pub mod workflow;

pub use error::{InstallError, InstallResult};
pub use readiness::{evaluate_artifact, ReadinessPoller, POLL_INTERVAL, STATUS_ARTIFACT_COMMAND};
pub use workflow::{
    InstallWorkflow, INSTALL_TASKS, TASK_CREATING_CONTAINER, TASK_INITIALIZING,
    TASK_STARTING_JUJU,
};
