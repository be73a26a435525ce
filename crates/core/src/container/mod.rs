//! Container runtime abstraction.
//!
//! The installer drives exactly one system container. All interaction goes
//! through [`ContainerRuntime`] so the workflow can be exercised against a
//! scripted runtime in tests; [`LxcRuntime`] is the production implementation.

pub mod lxc;

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

pub use lxc::LxcRuntime;

/// Errors raised by a container runtime.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// The command could not be spawned at all.
    #[error("Failed to run '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The command ran but exited unsuccessfully.
    #[error("Command '{command}' failed ({}): {stderr}", exit_code_label(.code))]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    /// The container has no reachable address yet.
    #[error("Container '{name}' is not responsive")]
    NotResponsive { name: String },

    /// A required host tool is not installed.
    #[error("Required tool not found on PATH: {0}")]
    ToolMissing(String),
}

pub(crate) fn exit_code_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    }
}

pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Operations the installer needs from a container runtime.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Create the container, seeding it with the given cloud-init user data.
    async fn create(&self, name: &str, userdata: &Path) -> RuntimeResult<()>;

    /// Start the container in the background.
    async fn start(&self, name: &str) -> RuntimeResult<()>;

    /// Block until the container reports the running state.
    async fn wait_until_running(&self, name: &str) -> RuntimeResult<()>;

    /// Run `command` inside the container and return its stdout.
    async fn run(&self, name: &str, command: &str) -> RuntimeResult<Vec<u8>>;

    /// Copy a host file or directory to `dest` inside the container.
    ///
    /// Relative destinations resolve against the container user's home.
    async fn copy(&self, name: &str, src: &Path, dest: &str) -> RuntimeResult<()>;

    /// Run an interactive command attached to the operator's terminal.
    ///
    /// Returns once the command exits.
    async fn run_status(&self, name: &str, command: &str) -> RuntimeResult<()>;
}
