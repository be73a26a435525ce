//! Terminal setup and the TUI event stream.
//!
//! This module provides the `Tui` wrapper around ratatui's Terminal. It
//! owns raw mode and the alternate screen, merges keyboard input with
//! redraw requests into one stream, and coalesces redraw requests so a
//! burst of progress events produces a single frame.

use anyhow::Result;
use crossterm::event::{Event as TermEvent, KeyEvent};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io::{stdout, Stdout};
use std::pin::Pin;
use std::time::Duration;
use tokio::select;
use tokio::sync::{broadcast, mpsc};
use tokio_stream::{Stream, StreamExt};

/// Type alias for the terminal backend we're using.
pub type TerminalBackend = CrosstermBackend<Stdout>;

/// Minimum spacing between two frames.
const FRAME_SPACING: Duration = Duration::from_millis(16);

/// Events produced by the terminal.
#[derive(Debug)]
pub enum TuiEvent {
    /// Keyboard event.
    Key(KeyEvent),
    /// A frame should be drawn.
    Draw,
}

/// Main TUI wrapper.
pub struct Tui {
    terminal: Terminal<TerminalBackend>,
    frame_tx: mpsc::UnboundedSender<()>,
    draw_tx: broadcast::Sender<()>,
    restored: bool,
}

impl Tui {
    /// Enter raw mode and the alternate screen.
    pub fn init() -> Result<Self> {
        enable_raw_mode()?;
        execute!(stdout(), EnterAlternateScreen)?;
        set_panic_hook();

        let terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

        let (frame_tx, mut frame_rx) = mpsc::unbounded_channel::<()>();
        let (draw_tx, _) = broadcast::channel(1);

        // Coalesce frame requests: one draw per burst.
        let coalesced_tx = draw_tx.clone();
        tokio::spawn(async move {
            while frame_rx.recv().await.is_some() {
                tokio::time::sleep(FRAME_SPACING).await;
                while frame_rx.try_recv().is_ok() {}
                if coalesced_tx.send(()).is_err() {
                    tracing::trace!("no draw subscribers");
                }
            }
        });

        Ok(Self {
            terminal,
            frame_tx,
            draw_tx,
            restored: false,
        })
    }

    /// Leave raw mode and the alternate screen. Idempotent.
    pub fn restore(&mut self) -> Result<()> {
        if self.restored {
            return Ok(());
        }
        disable_raw_mode()?;
        execute!(stdout(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        self.restored = true;
        Ok(())
    }

    /// Ask for a frame to be drawn soon.
    pub fn schedule_frame(&self) {
        let _ = self.frame_tx.send(());
    }

    /// Stream of key presses and draw requests.
    pub fn event_stream(&self) -> Pin<Box<dyn Stream<Item = TuiEvent> + Send + 'static>> {
        let mut term_events = crossterm::event::EventStream::new();
        let mut draw_rx = self.draw_tx.subscribe();

        let stream = async_stream::stream! {
            loop {
                select! {
                    Some(Ok(event)) = term_events.next() => {
                        match event {
                            TermEvent::Key(key) => yield TuiEvent::Key(key),
                            TermEvent::Resize(_, _) => yield TuiEvent::Draw,
                            _ => {}
                        }
                    }
                    result = draw_rx.recv() => {
                        match result {
                            Ok(()) | Err(broadcast::error::RecvError::Lagged(_)) => {
                                yield TuiEvent::Draw;
                            }
                            Err(broadcast::error::RecvError::Closed) => break,
                        }
                    }
                }
            }
        };

        Box::pin(stream)
    }

    /// Draw the UI with the provided function.
    pub fn draw<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut ratatui::Frame),
    {
        self.terminal.draw(f)?;
        Ok(())
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}

/// Restore the terminal before the default panic output.
fn set_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));
}
