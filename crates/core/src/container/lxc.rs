//! LXC-backed [`ContainerRuntime`].
//!
//! Lifecycle commands go through `sudo lxc-*`; everything that happens inside
//! the container uses ssh/scp against the address reported by `lxc-info`.

use super::{ContainerRuntime, RuntimeError, RuntimeResult};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

const SSH_OPTIONS: [&str; 6] = [
    "-o",
    "StrictHostKeyChecking=no",
    "-o",
    "UserKnownHostsFile=/dev/null",
    "-o",
    "LogLevel=quiet",
];

/// Host tools that must be present before an install can proceed.
pub const REQUIRED_TOOLS: [&str; 7] = [
    "sudo",
    "lxc-create",
    "lxc-start",
    "lxc-wait",
    "lxc-info",
    "ssh",
    "scp",
];

/// Container runtime backed by the LXC userspace tools.
#[derive(Debug, Clone)]
pub struct LxcRuntime {
    user: String,
}

impl Default for LxcRuntime {
    fn default() -> Self {
        Self {
            user: "ubuntu".to_string(),
        }
    }
}

impl LxcRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Verify every tool in [`REQUIRED_TOOLS`] is on `PATH`.
    pub fn check_tools() -> RuntimeResult<()> {
        for tool in REQUIRED_TOOLS {
            which::which(tool).map_err(|_| RuntimeError::ToolMissing(tool.to_string()))?;
        }
        Ok(())
    }

    fn create_args(name: &str, userdata: &Path) -> Vec<String> {
        vec![
            "lxc-create".to_string(),
            "-t".to_string(),
            "ubuntu-cloud".to_string(),
            "-n".to_string(),
            name.to_string(),
            "--".to_string(),
            "-u".to_string(),
            userdata.display().to_string(),
        ]
    }

    fn ssh_args(&self, ip: &str, command: &str, tty: bool) -> Vec<String> {
        let mut args: Vec<String> = SSH_OPTIONS.iter().map(|s| s.to_string()).collect();
        if tty {
            args.push("-t".to_string());
        }
        args.push(format!("{}@{}", self.user, ip));
        args.push(command.to_string());
        args
    }

    fn scp_args(&self, ip: &str, src: &Path, dest: &str) -> Vec<String> {
        let mut args: Vec<String> = SSH_OPTIONS.iter().map(|s| s.to_string()).collect();
        args.push("-r".to_string());
        args.push(src.display().to_string());
        args.push(format!("{}@{}:{}", self.user, ip, dest));
        args
    }

    /// Address of the running container, or `NotResponsive` if none yet.
    async fn ip(&self, name: &str) -> RuntimeResult<String> {
        let out = exec("sudo", &["lxc-info", "-n", name, "-iH"]).await?;
        let text = String::from_utf8_lossy(&out);
        text.lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(str::to_string)
            .ok_or_else(|| RuntimeError::NotResponsive {
                name: name.to_string(),
            })
    }
}

/// Run `program` with `args`, returning stdout on success.
async fn exec<S: AsRef<str>>(program: &str, args: &[S]) -> RuntimeResult<Vec<u8>> {
    let command = render_command(program, args);
    tracing::debug!(%command, "exec");

    let output = Command::new(program)
        .args(args.iter().map(|a| a.as_ref()))
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|source| RuntimeError::Spawn {
            command: command.clone(),
            source,
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        tracing::debug!(%command, code = ?output.status.code(), %stderr, "command failed");
        return Err(RuntimeError::CommandFailed {
            command,
            code: output.status.code(),
            stderr,
        });
    }
    Ok(output.stdout)
}

fn render_command<S: AsRef<str>>(program: &str, args: &[S]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(|a| a.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}

#[async_trait]
impl ContainerRuntime for LxcRuntime {
    async fn create(&self, name: &str, userdata: &Path) -> RuntimeResult<()> {
        exec("sudo", &Self::create_args(name, userdata)).await?;
        Ok(())
    }

    async fn start(&self, name: &str) -> RuntimeResult<()> {
        exec("sudo", &["lxc-start", "-n", name, "-d"]).await?;
        Ok(())
    }

    async fn wait_until_running(&self, name: &str) -> RuntimeResult<()> {
        exec("sudo", &["lxc-wait", "-n", name, "-s", "RUNNING"]).await?;
        Ok(())
    }

    async fn run(&self, name: &str, command: &str) -> RuntimeResult<Vec<u8>> {
        let ip = self.ip(name).await?;
        exec("ssh", &self.ssh_args(&ip, command, false)).await
    }

    async fn copy(&self, name: &str, src: &Path, dest: &str) -> RuntimeResult<()> {
        let ip = self.ip(name).await?;
        exec("scp", &self.scp_args(&ip, src, dest)).await?;
        Ok(())
    }

    async fn run_status(&self, name: &str, command: &str) -> RuntimeResult<()> {
        let ip = self.ip(name).await?;
        let args = self.ssh_args(&ip, command, true);
        let rendered = render_command("ssh", &args);

        let status = Command::new("ssh")
            .args(&args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|source| RuntimeError::Spawn {
                command: rendered.clone(),
                source,
            })?;

        if !status.success() {
            return Err(RuntimeError::CommandFailed {
                command: rendered,
                code: status.code(),
                stderr: String::new(),
            });
        }
        Ok(())
    }
}
