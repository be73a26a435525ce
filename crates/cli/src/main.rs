//! `cloud-install`: single-node private cloud installer.

mod cli;
mod logging;

use clap::Parser;
use cli::Cli;
use color_eyre::eyre::eyre;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::sync::mpsc::unbounded_channel;
use uoi_core::config::loader::{default_cfg_path, install_home, load_config};
use uoi_core::config::models::InstallerConfig;
use uoi_core::container::LxcRuntime;
use uoi_core::display::{ChannelDisplay, ConsoleDisplay, ErrorNotifier, TerminalHandoff};
use uoi_core::install::{InstallResult, InstallWorkflow};
use uoi_core::progress::{HeadlessProgress, LiveProgress, LiveProgressOptions, ProgressReporter};
use uoi_protocol::{InstallMode, InstallOptions, InstallOutcome};
use uoi_tui::ExitReason;

#[tokio::main]
async fn main() -> color_eyre::Result<ExitCode> {
    color_eyre::install()?;
    let cli = Cli::parse();
    let options = cli.install_options();

    let home = install_home()?;
    let cfg_path = cli
        .config_dir
        .clone()
        .unwrap_or_else(|| default_cfg_path(&home));
    logging::init(&cli.log_level, options.mode, &cfg_path.join("commands.log"))?;

    let config = load_config(&cfg_path, &home)?;
    LxcRuntime::check_tools()?;
    tracing::info!(
        container = %config.container_name,
        cfg_path = %config.cfg_path.display(),
        mode = ?options.mode,
        "starting install"
    );

    match options.mode {
        InstallMode::Interactive => run_interactive(config, options).await,
        InstallMode::Headless => run_headless(config, options).await,
    }
}

async fn run_headless(
    config: InstallerConfig,
    options: InstallOptions,
) -> color_eyre::Result<ExitCode> {
    let console = Arc::new(ConsoleDisplay);
    let workflow = InstallWorkflow::new(
        config,
        options,
        Arc::new(LxcRuntime::new()),
        Arc::new(HeadlessProgress::new()),
        console.clone(),
        console,
    );

    // The notifier has already reported any failure.
    Ok(exit_code(&workflow.spawn().await?))
}

async fn run_interactive(
    config: InstallerConfig,
    options: InstallOptions,
) -> color_eyre::Result<ExitCode> {
    let (events_tx, events_rx) = unbounded_channel();
    let channel = ChannelDisplay::new(events_tx);
    let display = Arc::new(channel.clone());

    let progress = Arc::new(LiveProgress::new(
        display.clone(),
        tokio::runtime::Handle::current(),
        LiveProgressOptions {
            timings_path: Some(config.timings_path()),
            ..Default::default()
        },
    ));
    let handoff = TerminalHandoff::new();

    let install = InstallWorkflow::new(
        config,
        options,
        Arc::new(LxcRuntime::new()),
        progress.clone(),
        display.clone(),
        display,
    )
    .with_terminal_handoff(handoff.clone())
    .spawn();

    // Tell the UI about successful endings; failures reach it through the notifier.
    let workflow = tokio::spawn(async move {
        let result = install.await;
        if let Ok(Ok(outcome)) = &result {
            channel.finished(*outcome);
        }
        result
    });

    let reason = uoi_tui::run_app(events_rx)
        .await
        .map_err(|e| eyre!(e))?;
    tracing::debug!(?reason, "ui exited");

    match reason {
        ExitReason::StatusWatch => handoff.release(),
        ExitReason::UserQuit if !workflow.is_finished() => {
            progress.halt();
            workflow.abort();
            eprintln!("Installation interrupted.");
            return Ok(ExitCode::FAILURE);
        }
        _ => {}
    }

    let result = workflow.await??;
    if let Err(err) = &result {
        // The UI is gone; repeat the error on the restored terminal.
        ConsoleDisplay.notify(err);
    }
    Ok(exit_code(&result))
}

fn exit_code(result: &InstallResult<InstallOutcome>) -> ExitCode {
    match result {
        Ok(outcome) => {
            tracing::info!(?outcome, "install finished");
            ExitCode::SUCCESS
        }
        Err(_) => ExitCode::FAILURE,
    }
}
