//! # uoi-tui
//!
//! Terminal User Interface for the single-node cloud installer.
//!
//! This crate renders install progress, informational messages and fatal
//! errors. It receives everything from `uoi-core` as `Event`s over a
//! channel and never calls back into the core.

pub mod app;
pub mod event_handler;
pub mod tui;
pub mod widgets;

pub use app::{App, ExitReason};
pub use tui::Tui;

use anyhow::Result;
use tokio::sync::mpsc::UnboundedReceiver;
use uoi_protocol::Event;

/// Run the installer UI until it exits, restoring the terminal afterwards.
pub async fn run_app(event_rx: UnboundedReceiver<Event>) -> Result<ExitReason> {
    let mut tui = Tui::init()?;
    let mut app = App::new(event_rx);

    let result = app.run(&mut tui).await;
    tui.restore()?;
    result
}
