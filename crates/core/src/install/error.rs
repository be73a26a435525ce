//! Error types for the installation workflow.

use crate::container::RuntimeError;
use crate::host::HostError;
use crate::templates::TemplateError;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors raised by [`super::InstallWorkflow`].
#[derive(Error, Debug)]
pub enum InstallError {
    /// A container with the target name already exists on disk.
    #[error(
        "Container '{name}' already exists at {path}; uninstall or remove the existing cloud before proceeding"
    )]
    ConflictingInstallation { name: String, path: PathBuf },

    /// Restricting permissions on host or in-container files failed.
    #[error("Unable to set permissions on {target}: {reason}")]
    PermissionSetup { target: String, reason: String },

    #[error(transparent)]
    ContainerRuntime(#[from] RuntimeError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    /// The readiness artifact was present but could not be decoded.
    #[error("Malformed cloud-init status artifact: {reason}")]
    StatusArtifact { reason: String },

    #[error("SSH key setup failed for {path}: {source}")]
    SshKey {
        path: PathBuf,
        #[source]
        source: HostError,
    },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl InstallError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type InstallResult<T> = Result<T, InstallError>;
