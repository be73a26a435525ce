//! Event handling for the installer TUI.
//!
//! This module provides functions for handling:
//! - Core events (from uoi-core, via the event channel)
//! - Keyboard events (user input)

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use uoi_protocol::{Event, InstallOutcome, StatusLine};

/// Everything the UI knows about the running install.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstallView {
    /// Latest rendering of the task list.
    pub lines: Vec<StatusLine>,
    /// Latest informational message.
    pub info: Option<String>,
    /// Fatal error reported by the workflow, if any.
    pub error: Option<String>,
    /// How the workflow ended, if it ended successfully.
    pub outcome: Option<InstallOutcome>,
    /// The workflow wants the terminal for the status watch.
    pub status_watch_pending: bool,
}

/// Apply an event received from the core.
pub fn handle_core_event(view: &mut InstallView, event: Event) {
    match event {
        Event::ProgressRendered { lines } => {
            view.lines = lines;
        }
        Event::InfoMessage { message } => {
            tracing::debug!(%message, "info message");
            view.info = Some(message);
        }
        Event::StatusWatchStarting => {
            view.status_watch_pending = true;
        }
        Event::InstallFailed { error } => {
            view.error = Some(error);
        }
        Event::InstallFinished { outcome } => {
            view.outcome = Some(outcome);
        }
    }
}

/// Handle a keyboard event from the user.
///
/// Returns `true` if the application should exit, `false` otherwise.
pub fn handle_keyboard_event(key_event: KeyEvent) -> bool {
    if key_event.kind != KeyEventKind::Press {
        return false;
    }

    match key_event.code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => true,
        KeyCode::Char('c') => key_event.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}
