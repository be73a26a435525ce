//! Progress widget showing one line per install task.
//!
//! Finished tasks arrive as emphasized lines and are highlighted; other
//! lines are drawn plain.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;
use uoi_protocol::StatusLine;

/// Style applied to emphasized (finished) task lines.
pub fn emphasis_style() -> Style {
    Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD)
}

/// Renders the task list into `area`.
pub fn render_progress(frame: &mut Frame, area: Rect, lines: &[StatusLine]) {
    let text: Vec<Line> = if lines.is_empty() {
        vec![Line::from(Span::styled(
            "Waiting for the installer to start...",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        lines
            .iter()
            .map(|line| {
                if line.emphasis {
                    Line::from(Span::styled(line.text.clone(), emphasis_style()))
                } else {
                    Line::from(line.text.clone())
                }
            })
            .collect()
    };

    let paragraph = Paragraph::new(text).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Installing")
            .style(Style::default().fg(Color::White)),
    );
    frame.render_widget(paragraph, area);
}
