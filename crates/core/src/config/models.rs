//! Installer configuration model.
//!
//! `InstallerConfig` is the resolved configuration for one install run:
//! values from `config.toml` merged with defaults, plus every path the
//! workflow derives from the configuration directory.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default name of the bootstrap container.
pub const DEFAULT_CONTAINER_NAME: &str = "uoi-bootstrap";

/// Default directory where the container runtime keeps container roots.
pub const DEFAULT_CONTAINER_PATH: &str = "/var/lib/lxc";

/// Name of the configuration directory under the installing user's home.
pub const CONFIG_DIR_NAME: &str = ".cloud-install";

/// Raw contents of `config.toml`. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ConfigFile {
    pub container_name: Option<String>,
    pub container_path: Option<PathBuf>,
    pub openstack_password: Option<String>,
}

/// Resolved configuration for an install run.
#[derive(Debug, Clone)]
pub struct InstallerConfig {
    /// Host-side state directory, e.g. `~/.cloud-install`.
    pub cfg_path: PathBuf,

    /// Home directory of the installing user (holds `.ssh/`).
    pub home: PathBuf,

    /// Name of the container to create.
    pub container_name: String,

    /// Directory where the container runtime stores container roots.
    pub container_path: PathBuf,

    /// Password rendered into the charm and Juju environment configs.
    pub openstack_password: String,
}

impl InstallerConfig {
    /// On-disk root of the target container. Its existence means a prior
    /// installation is present.
    pub fn container_abspath(&self) -> PathBuf {
        self.container_path.join(&self.container_name)
    }

    pub fn userdata_path(&self) -> PathBuf {
        self.cfg_path.join("userdata.yaml")
    }

    pub fn charmconf_path(&self) -> PathBuf {
        self.cfg_path.join("charmconf.yaml")
    }

    /// Side-channel timing record rewritten on every task start.
    pub fn timings_path(&self) -> PathBuf {
        self.cfg_path.join("timings.yaml")
    }

    /// Marker recording which kind of install produced this directory.
    pub fn install_type_path(&self) -> PathBuf {
        self.cfg_path.join("single")
    }

    pub fn log_path(&self) -> PathBuf {
        self.cfg_path.join("commands.log")
    }

    pub fn ssh_dir(&self) -> PathBuf {
        self.home.join(".ssh")
    }

    /// Private key copied into the container; the public key sits next to it.
    pub fn ssh_private_key(&self) -> PathBuf {
        self.ssh_dir().join("id_rsa")
    }

    pub fn ssh_public_key(&self) -> PathBuf {
        self.ssh_dir().join("id_rsa.pub")
    }

    /// Build a config rooted at `cfg_path` with defaults for everything else.
    pub fn with_defaults(cfg_path: &Path, home: &Path, openstack_password: String) -> Self {
        Self {
            cfg_path: cfg_path.to_path_buf(),
            home: home.to_path_buf(),
            container_name: DEFAULT_CONTAINER_NAME.to_string(),
            container_path: PathBuf::from(DEFAULT_CONTAINER_PATH),
            openstack_password,
        }
    }
}
