//! The single-node install sequence.
//!
//! [`InstallWorkflow::spawn`] registers the task list, marks the first task
//! started and then runs every step on a background tokio task, so the
//! caller (usually a UI event loop) is never blocked. Any fatal error is
//! logged, halts progress rendering and is handed to the [`ErrorNotifier`]
//! before the task completes with it.

use super::error::{InstallError, InstallResult};
use super::readiness::{ReadinessPoller, POLL_INTERVAL};
use crate::config::models::InstallerConfig;
use crate::container::ContainerRuntime;
use crate::display::{ErrorNotifier, StatusDisplay, TerminalHandoff};
use crate::host;
use crate::progress::ProgressReporter;
use crate::templates;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use uoi_protocol::{InstallOptions, InstallOutcome};

pub const TASK_INITIALIZING: &str = "Initializing Environment";
pub const TASK_CREATING_CONTAINER: &str = "Creating container";
pub const TASK_STARTING_JUJU: &str = "Starting Juju server";

/// Progress checkpoints, in execution order.
pub const INSTALL_TASKS: [&str; 3] = [
    TASK_INITIALIZING,
    TASK_CREATING_CONTAINER,
    TASK_STARTING_JUJU,
];

/// Packages cloud-init installs in the container.
const CONTAINER_PACKAGES: [&str; 1] = ["juju-local"];

const STATUS_WATCH_COMMAND: &str = "openstack-status";
const INSTALL_TYPE_MARKER: &str = "auto-generated";

/// In-container directory receiving the host configuration directory.
const CONTAINER_CFG_DIR: &str = ".cloud-install";

/// Drives one install run against a container runtime.
pub struct InstallWorkflow {
    config: InstallerConfig,
    options: InstallOptions,
    runtime: Arc<dyn ContainerRuntime>,
    progress: Arc<dyn ProgressReporter>,
    display: Arc<dyn StatusDisplay>,
    notifier: Arc<dyn ErrorNotifier>,
    handoff: Option<TerminalHandoff>,
    poll_interval: Duration,
}

impl InstallWorkflow {
    pub fn new(
        config: InstallerConfig,
        options: InstallOptions,
        runtime: Arc<dyn ContainerRuntime>,
        progress: Arc<dyn ProgressReporter>,
        display: Arc<dyn StatusDisplay>,
        notifier: Arc<dyn ErrorNotifier>,
    ) -> Self {
        Self {
            config,
            options,
            runtime,
            progress,
            display,
            notifier,
            handoff: None,
            poll_interval: POLL_INTERVAL,
        }
    }

    /// Override the readiness poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Wait for the frontend to release the terminal before the status watch.
    pub fn with_terminal_handoff(mut self, handoff: TerminalHandoff) -> Self {
        self.handoff = Some(handoff);
        self
    }

    /// Start the install on a background task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(self) -> JoinHandle<InstallResult<InstallOutcome>> {
        self.progress.register_tasks(&INSTALL_TASKS);
        self.progress.start_task(TASK_INITIALIZING);

        tokio::spawn(async move {
            let result = self.run().await;
            if let Err(err) = &result {
                tracing::error!(error = %err, "install failed");
                self.progress.halt();
                self.notifier.notify(err);
            }
            result
        })
    }

    async fn run(&self) -> InstallResult<InstallOutcome> {
        let name = self.config.container_name.as_str();
        self.display.info_message("Building environment");

        let abspath = self.config.container_abspath();
        if abspath.exists() {
            return Err(InstallError::ConflictingInstallation {
                name: name.to_string(),
                path: abspath,
            });
        }

        std::fs::create_dir_all(&self.config.cfg_path)
            .map_err(|e| InstallError::io(&self.config.cfg_path, e))?;
        let marker = self.config.install_type_path();
        host::spew(&marker, INSTALL_TYPE_MARKER).map_err(|e| InstallError::io(&marker, e))?;

        let private_key = self.config.ssh_private_key();
        host::ensure_ssh_keypair(&private_key)
            .await
            .map_err(|source| InstallError::SshKey {
                path: private_key.clone(),
                source,
            })?;
        self.prep_userdata()?;

        self.create_container_and_wait().await?;
        self.configure_juju_environment().await?;
        self.copy_installdata_and_set_perms().await?;

        self.display.info_message("Bootstrapping Juju ..");
        self.progress.start_task(TASK_STARTING_JUJU);
        self.container_run("juju bootstrap").await?;
        self.container_run("juju status").await?;
        self.progress.stop_current_task();

        if self.options.install_only {
            tracing::info!("Done installing, stopping here per --install-only");
            return Ok(InstallOutcome::InstalledOnly);
        }

        self.display.info_message("Starting cloud deployment ..");
        self.display.status_watch_starting();
        if let Some(handoff) = &self.handoff {
            handoff.wait_released().await;
        }
        self.runtime.run_status(name, STATUS_WATCH_COMMAND).await?;
        Ok(InstallOutcome::StatusWatchExited)
    }

    /// Render cloud-init user data into `cfg_path`.
    fn prep_userdata(&self) -> InstallResult<()> {
        let public_key = self.config.ssh_public_key();
        let key = host::read_public_key(&public_key).map_err(|e| InstallError::SshKey {
            path: public_key.clone(),
            source: host::HostError::Io(e),
        })?;

        let userdata = templates::render_userdata(
            &[key],
            &CONTAINER_PACKAGES,
            self.options.extra_ppa.as_deref(),
        )?;
        write_file(&self.config.userdata_path(), &userdata)
    }

    async fn create_container_and_wait(&self) -> InstallResult<()> {
        let name = self.config.container_name.as_str();
        self.progress.start_task(TASK_CREATING_CONTAINER);

        self.runtime.create(name, &self.config.userdata_path()).await?;
        self.runtime.start(name).await?;
        self.runtime.wait_until_running(name).await?;

        ReadinessPoller::new(self.runtime.as_ref(), name)
            .with_interval(self.poll_interval)
            .wait()
            .await?;
        Ok(())
    }

    async fn configure_juju_environment(&self) -> InstallResult<()> {
        let env = templates::render_juju_env(&self.config.openstack_password)?;
        let env_path = self.config.cfg_path.join("environments.yaml");
        write_file(&env_path, &env)?;

        self.container_run("mkdir -p .juju").await?;
        self.runtime
            .copy(&self.config.container_name, &env_path, ".juju/environments.yaml")
            .await?;
        Ok(())
    }

    async fn copy_installdata_and_set_perms(&self) -> InstallResult<()> {
        let name = self.config.container_name.as_str();
        let cfg_path = &self.config.cfg_path;

        let charmconf = templates::render_charmconf(&self.config.openstack_password)?;
        write_file(&self.config.charmconf_path(), &charmconf)?;

        host::restrict_permissions(cfg_path).map_err(|e| InstallError::PermissionSetup {
            target: cfg_path.display().to_string(),
            reason: e.to_string(),
        })?;

        self.container_run(&format!("mkdir -p {CONTAINER_CFG_DIR}")).await?;
        self.container_run("sudo mkdir -p /etc/openstack").await?;

        for entry in config_entries(cfg_path)? {
            self.runtime
                .copy(name, &entry, &format!("{CONTAINER_CFG_DIR}/"))
                .await?;
        }

        self.container_chmod(&format!("chmod 700 {CONTAINER_CFG_DIR}"), CONTAINER_CFG_DIR)
            .await?;
        self.container_chmod(
            &format!("chmod 600 -R {CONTAINER_CFG_DIR}/*"),
            CONTAINER_CFG_DIR,
        )
        .await?;

        for key in [self.config.ssh_private_key(), self.config.ssh_public_key()] {
            self.runtime.copy(name, &key, ".ssh/").await?;
        }
        self.container_chmod("chmod 600 .ssh/id_rsa*", ".ssh/id_rsa*")
            .await?;
        Ok(())
    }

    async fn container_run(&self, command: &str) -> InstallResult<Vec<u8>> {
        Ok(self
            .runtime
            .run(&self.config.container_name, command)
            .await?)
    }

    /// Run a permission change inside the container; failure is a
    /// `PermissionSetup` error rather than a runtime error.
    async fn container_chmod(&self, command: &str, target: &str) -> InstallResult<()> {
        self.runtime
            .run(&self.config.container_name, command)
            .await
            .map_err(|e| InstallError::PermissionSetup {
                target: format!("{}:{}", self.config.container_name, target),
                reason: e.to_string(),
            })?;
        Ok(())
    }
}

fn write_file(path: &Path, content: &str) -> InstallResult<()> {
    host::spew(path, content).map_err(|e| InstallError::io(path, e))
}

/// Top-level entries of the host configuration directory, sorted by name.
fn config_entries(cfg_path: &Path) -> InstallResult<Vec<PathBuf>> {
    let mut entries = std::fs::read_dir(cfg_path)
        .map_err(|e| InstallError::io(cfg_path, e))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| InstallError::io(cfg_path, e))?;
    entries.sort();
    Ok(entries)
}
