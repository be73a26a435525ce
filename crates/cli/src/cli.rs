//! Command-line arguments.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use uoi_protocol::{InstallMode, InstallOptions};

#[derive(Parser, Debug)]
#[command(name = "cloud-install", version, about = "Single-node private cloud installer")]
pub struct Cli {
    /// Installer state directory [default: ~/.cloud-install]
    #[arg(long, global = true, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    /// Log level filter; RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "info", value_name = "LEVEL")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Install with a live progress screen
    Interactive(InstallArgs),

    /// Install printing plain messages to the console
    Headless(InstallArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct InstallArgs {
    /// Stop once the Juju server is bootstrapped
    #[arg(long)]
    pub install_only: bool,

    /// Extra PPA enabled inside the container, e.g. cloud-installer/testing
    /// (a leading `ppa:` is accepted)
    #[arg(long, value_name = "PPA")]
    pub extra_ppa: Option<String>,
}

impl Cli {
    pub fn install_options(&self) -> InstallOptions {
        let (mode, args) = match &self.command {
            Command::Interactive(args) => (InstallMode::Interactive, args),
            Command::Headless(args) => (InstallMode::Headless, args),
        };
        InstallOptions {
            mode,
            install_only: args.install_only,
            extra_ppa: args.extra_ppa.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headless_options() {
        let cli = Cli::try_parse_from([
            "cloud-install",
            "headless",
            "--install-only",
            "--extra-ppa",
            "cloud-installer/testing",
        ])
        .expect("valid arguments");

        assert_eq!(
            cli.install_options(),
            InstallOptions {
                mode: InstallMode::Headless,
                install_only: true,
                extra_ppa: Some("cloud-installer/testing".to_string()),
            }
        );
        assert_eq!(cli.log_level, "info");
        assert_eq!(cli.config_dir, None);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "cloud-install",
            "interactive",
            "--config-dir",
            "/tmp/cfg",
            "--log-level",
            "debug",
        ])
        .expect("valid arguments");

        assert_eq!(cli.install_options().mode, InstallMode::Interactive);
        assert!(!cli.install_options().install_only);
        assert_eq!(cli.config_dir, Some(PathBuf::from("/tmp/cfg")));
        assert_eq!(cli.log_level, "debug");
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["cloud-install"]).is_err());
        assert!(Cli::try_parse_from(["cloud-install", "multi"]).is_err());
    }
}
