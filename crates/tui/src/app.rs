//! TUI application state and event loop.
//!
//! This module defines the main `App` struct that renders the install
//! progress and decides when the UI should give the terminal back.

use anyhow::Result;
use crossterm::event::KeyEvent;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use tokio::select;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_stream::StreamExt;
use uoi_protocol::{Event, InstallOutcome};

use crate::event_handler::{self, InstallView};
use crate::tui::{Tui, TuiEvent};
use crate::widgets;

/// Why the event loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// The operator quit.
    UserQuit,
    /// The workflow finished on its own.
    Finished(InstallOutcome),
    /// The workflow is waiting for the terminal to run the status watch.
    StatusWatch,
    /// The core dropped its event sender.
    Disconnected,
}

/// Main TUI application state.
pub struct App {
    /// What the core has reported so far.
    pub view: InstallView,
    /// Channel to receive events from the core.
    pub event_rx: UnboundedReceiver<Event>,
    /// Set once the loop should stop.
    pub exit: Option<ExitReason>,
}

impl App {
    pub fn new(event_rx: UnboundedReceiver<Event>) -> Self {
        Self {
            view: InstallView::default(),
            event_rx,
            exit: None,
        }
    }

    /// Main event loop.
    ///
    /// Uses `tokio::select!` to handle keyboard input and core events concurrently.
    pub async fn run(&mut self, tui: &mut Tui) -> Result<ExitReason> {
        let mut tui_events = tui.event_stream();
        tui.schedule_frame();

        loop {
            if let Some(reason) = self.exit {
                // Show the final state before handing the terminal back.
                tui.draw(|frame| self.render(frame))?;
                return Ok(reason);
            }

            select! {
                event = self.event_rx.recv() => {
                    match event {
                        Some(event) => {
                            self.handle_core_event(event);
                            tui.schedule_frame();
                        }
                        None => {
                            // Keep the error on screen until the operator quits.
                            if self.view.error.is_none() {
                                self.exit = Some(ExitReason::Disconnected);
                            }
                            self.drain_tui_events(tui, &mut tui_events).await?;
                        }
                    }
                }
                Some(tui_event) = tui_events.next() => {
                    self.handle_tui_event(tui, tui_event)?;
                }
            }
        }
    }

    /// Serve only terminal events once the core has gone away.
    async fn drain_tui_events(
        &mut self,
        tui: &mut Tui,
        tui_events: &mut (impl tokio_stream::Stream<Item = TuiEvent> + Unpin),
    ) -> Result<()> {
        while self.exit.is_none() {
            match tui_events.next().await {
                Some(tui_event) => self.handle_tui_event(tui, tui_event)?,
                None => self.exit = Some(ExitReason::UserQuit),
            }
        }
        Ok(())
    }

    /// Handle events from the core (uoi-core).
    fn handle_core_event(&mut self, event: Event) {
        event_handler::handle_core_event(&mut self.view, event);

        if self.view.status_watch_pending {
            self.exit = Some(ExitReason::StatusWatch);
        } else if let Some(outcome) = self.view.outcome {
            self.exit = Some(ExitReason::Finished(outcome));
        }
    }

    /// Handle TUI events (keyboard input, resize, draw).
    fn handle_tui_event(&mut self, tui: &mut Tui, event: TuiEvent) -> Result<()> {
        match event {
            TuiEvent::Key(key_event) => {
                self.handle_key_event(key_event);
                tui.schedule_frame();
            }
            TuiEvent::Draw => {
                tui.draw(|frame| self.render(frame))?;
            }
        }
        Ok(())
    }

    fn handle_key_event(&mut self, key_event: KeyEvent) {
        if event_handler::handle_keyboard_event(key_event) {
            self.exit = Some(ExitReason::UserQuit);
        }
    }

    /// Render the TUI.
    pub fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header / info message
                Constraint::Min(5),    // Task list
                Constraint::Length(4), // Error
                Constraint::Length(1), // Footer
            ])
            .split(area);

        self.render_header(frame, chunks[0]);
        widgets::render_progress(frame, chunks[1], &self.view.lines);
        self.render_error(frame, chunks[2]);
        self.render_footer(frame, chunks[3]);
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title("Cloud Installer");

        let text = self.view.info.clone().unwrap_or_default();
        let paragraph = Paragraph::new(text)
            .block(block)
            .style(Style::default().fg(Color::Yellow));
        frame.render_widget(paragraph, area);
    }

    fn render_error(&self, frame: &mut Frame, area: Rect) {
        let Some(error) = &self.view.error else {
            return;
        };

        let paragraph = Paragraph::new(error.as_str())
            .block(Block::default().borders(Borders::ALL).title("Error"))
            .style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        let paragraph =
            Paragraph::new("q to quit").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(paragraph, area);
    }
}
