//! Host-side helpers: writing files, SSH keys and permissions.

use crate::container::exit_code_label;
use std::io;
use std::path::Path;
use thiserror::Error;
use tokio::process::Command;

#[derive(Error, Debug)]
pub enum HostError {
    #[error("ssh-keygen not found: {0}")]
    ToolMissing(#[from] which::Error),

    #[error("Failed to spawn ssh-keygen: {0}")]
    Spawn(#[source] io::Error),

    #[error("ssh-keygen failed ({}): {stderr}", exit_code_label(.code))]
    KeygenFailed { code: Option<i32>, stderr: String },

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Write `content` to `path`, creating parent directories as needed.
pub fn spew(path: &Path, content: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)
}

/// Generate an RSA keypair at `private_key` unless one already exists.
///
/// Returns `true` if a new key was generated.
pub async fn ensure_ssh_keypair(private_key: &Path) -> Result<bool, HostError> {
    if private_key.exists() {
        tracing::debug!(path = %private_key.display(), "ssh key already present");
        return Ok(false);
    }

    if let Some(parent) = private_key.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let keygen = which::which("ssh-keygen")?;
    let output = Command::new(keygen)
        .args(["-t", "rsa", "-N", "", "-q", "-f"])
        .arg(private_key)
        .output()
        .await
        .map_err(HostError::Spawn)?;

    if !output.status.success() {
        return Err(HostError::KeygenFailed {
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    tracing::info!(path = %private_key.display(), "generated ssh keypair");
    Ok(true)
}

/// Read a public key file, trimmed of surrounding whitespace.
pub fn read_public_key(path: &Path) -> io::Result<String> {
    Ok(std::fs::read_to_string(path)?.trim().to_string())
}

/// Restrict `dir` to its owner: mode 700 on directories, 600 on files.
#[cfg(unix)]
pub fn restrict_permissions(dir: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    for entry in walkdir::WalkDir::new(dir) {
        let entry = entry.map_err(io::Error::other)?;
        let mode = if entry.file_type().is_dir() { 0o700 } else { 0o600 };
        std::fs::set_permissions(entry.path(), std::fs::Permissions::from_mode(mode))?;
    }
    Ok(())
}

#[cfg(not(unix))]
pub fn restrict_permissions(_dir: &Path) -> io::Result<()> {
    Ok(())
}
