//! Output seams between the installer core and its frontend.
//!
//! The workflow talks to the operator only through these two traits:
//! - [`StatusDisplay`]: progress lines and informational messages
//! - [`ErrorNotifier`]: the single channel fatal errors are funneled to
//!
//! Two implementations are provided: [`ChannelDisplay`] forwards everything
//! as [`Event`]s to the terminal UI, and [`ConsoleDisplay`] prints to the
//! terminal for headless runs.

use crate::install::InstallError;
use colored::Colorize;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::Notify;
use uoi_protocol::{Event, InstallOutcome, StatusLine};

/// Renders progress and short status messages for the operator.
pub trait StatusDisplay: Send + Sync {
    /// Replace the progress view with `lines`.
    fn render_progress(&self, lines: Vec<StatusLine>);

    /// Show a one-line informational message.
    fn info_message(&self, message: &str);

    /// Called right before an interactive command takes over the terminal.
    fn status_watch_starting(&self) {}
}

/// Receives every fatal error raised by the background workflow.
pub trait ErrorNotifier: Send + Sync {
    fn notify(&self, error: &InstallError);
}

/// Forwards display calls and errors to the UI as [`Event`]s.
///
/// Sends never block; if the UI has gone away the event is dropped.
#[derive(Debug, Clone)]
pub struct ChannelDisplay {
    events_tx: UnboundedSender<Event>,
}

impl ChannelDisplay {
    pub fn new(events_tx: UnboundedSender<Event>) -> Self {
        Self { events_tx }
    }

    /// Tell the UI the workflow finished successfully.
    pub fn finished(&self, outcome: InstallOutcome) {
        self.send(Event::InstallFinished { outcome });
    }

    fn send(&self, event: Event) {
        if self.events_tx.send(event).is_err() {
            tracing::trace!("UI event receiver dropped");
        }
    }
}

impl StatusDisplay for ChannelDisplay {
    fn render_progress(&self, lines: Vec<StatusLine>) {
        self.send(Event::ProgressRendered { lines });
    }

    fn info_message(&self, message: &str) {
        self.send(Event::InfoMessage {
            message: message.to_string(),
        });
    }

    fn status_watch_starting(&self) {
        self.send(Event::StatusWatchStarting);
    }
}

impl ErrorNotifier for ChannelDisplay {
    fn notify(&self, error: &InstallError) {
        self.send(Event::InstallFailed {
            error: error.to_string(),
        });
    }
}

/// Hands the operator's terminal from the UI to the status watch.
///
/// The workflow waits on [`TerminalHandoff::wait_released`] before attaching
/// the status watch; the frontend calls [`TerminalHandoff::release`] once it
/// has restored the terminal.
#[derive(Debug, Default, Clone)]
pub struct TerminalHandoff {
    released: Arc<Notify>,
}

impl TerminalHandoff {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn release(&self) {
        self.released.notify_one();
    }

    pub async fn wait_released(&self) {
        self.released.notified().await;
    }
}

/// Prints messages and errors straight to the terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleDisplay;

impl StatusDisplay for ConsoleDisplay {
    fn render_progress(&self, lines: Vec<StatusLine>) {
        for line in lines {
            if line.emphasis {
                println!("{}", line.text.bold());
            } else {
                println!("{}", line.text);
            }
        }
    }

    fn info_message(&self, message: &str) {
        println!("{} {}", "[info]".cyan(), message);
    }
}

impl ErrorNotifier for ConsoleDisplay {
    fn notify(&self, error: &InstallError) {
        eprintln!("{} {}", "[error]".red().bold(), error);
    }
}
