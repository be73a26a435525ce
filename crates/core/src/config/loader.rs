//! Configuration loader for the installer state directory.
//!
//! The state directory holds:
//! - `config.toml`: optional overrides for container name/path and password
//! - `openstack.passwd`: fallback location of the OpenStack password

use crate::config::error::ConfigError;
use crate::config::error::ConfigResult;
use crate::config::models::{
    ConfigFile, InstallerConfig, CONFIG_DIR_NAME, DEFAULT_CONTAINER_NAME, DEFAULT_CONTAINER_PATH,
};
use std::path::{Path, PathBuf};

/// Home directory of the user the install is performed for.
///
/// When running under `sudo`, this is the invoking user's home rather than
/// root's, so keys and config land where the operator expects them.
pub fn install_home() -> ConfigResult<PathBuf> {
    if let Some(user) = std::env::var_os("SUDO_USER") {
        let candidate = Path::new("/home").join(user);
        if candidate.is_dir() {
            return Ok(candidate);
        }
    }
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .ok_or(ConfigError::HomeNotFound)
}

/// Default state directory: `<home>/.cloud-install`.
pub fn default_cfg_path(home: &Path) -> PathBuf {
    home.join(CONFIG_DIR_NAME)
}

/// Loads the installer configuration from `cfg_path`.
///
/// A missing `config.toml` is not an error; defaults are used. The password
/// is taken from `config.toml` if present, otherwise from
/// `openstack.passwd`.
///
/// # Errors
///
/// Returns `ConfigError` if:
/// - A file exists but cannot be read
/// - `config.toml` has invalid syntax or unknown keys
/// - No OpenStack password is configured anywhere
pub fn load_config(cfg_path: &Path, home: &Path) -> ConfigResult<InstallerConfig> {
    let file = load_config_file(cfg_path)?;

    let openstack_password = match file.openstack_password {
        Some(password) => password,
        None => load_password_file(cfg_path)?,
    };

    let container_name = file
        .container_name
        .unwrap_or_else(|| DEFAULT_CONTAINER_NAME.to_string());
    if container_name.trim().is_empty() {
        return Err(ConfigError::InvalidConfig {
            path: cfg_path.join("config.toml"),
            reason: "container-name must not be empty".to_string(),
        });
    }

    Ok(InstallerConfig {
        cfg_path: cfg_path.to_path_buf(),
        home: home.to_path_buf(),
        container_name,
        container_path: file
            .container_path
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONTAINER_PATH)),
        openstack_password,
    })
}

/// Reads `config.toml`, returning defaults if it does not exist.
fn load_config_file(cfg_path: &Path) -> ConfigResult<ConfigFile> {
    let config_path = cfg_path.join("config.toml");

    if !config_path.exists() {
        return Ok(ConfigFile::default());
    }

    let content =
        std::fs::read_to_string(&config_path).map_err(|source| ConfigError::FileRead {
            path: config_path.clone(),
            source,
        })?;

    toml::from_str(&content).map_err(|source| ConfigError::TomlParse {
        path: config_path,
        source,
    })
}

/// Reads the password fallback file.
fn load_password_file(cfg_path: &Path) -> ConfigResult<String> {
    let passwd_path = cfg_path.join("openstack.passwd");

    if !passwd_path.exists() {
        return Err(ConfigError::InvalidConfig {
            path: cfg_path.join("config.toml"),
            reason: "no openstack-password set and openstack.passwd not found".to_string(),
        });
    }

    let content =
        std::fs::read_to_string(&passwd_path).map_err(|source| ConfigError::FileRead {
            path: passwd_path.clone(),
            source,
        })?;

    let password = content.trim().to_string();
    if password.is_empty() {
        return Err(ConfigError::InvalidConfig {
            path: passwd_path,
            reason: "password file is empty".to_string(),
        });
    }

    Ok(password)
}
