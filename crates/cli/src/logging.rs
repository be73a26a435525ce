//! Tracing subscriber setup.
//!
//! The interactive UI owns the terminal, so its logs go to
//! `<cfg_path>/commands.log`; headless runs log to stderr.

use color_eyre::eyre::eyre;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;
use uoi_protocol::InstallMode;

pub fn init(level: &str, mode: InstallMode, log_path: &Path) -> color_eyre::Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let result = match mode {
        InstallMode::Interactive => {
            if let Some(parent) = log_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        InstallMode::Headless => builder.with_writer(std::io::stderr).try_init(),
    };
    result.map_err(|e| eyre!(e))
}
