//! Ratatui rendering for the TUI.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::app::App;

pub fn draw(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // conversation
            Constraint::Length(3), // status panel
            Constraint::Length(3), // input
        ])
        .split(frame.area());

    draw_messages(frame, app, chunks[0]);
    draw_status(frame, app, chunks[1]);
    draw_input(frame, app, chunks[2]);
}

fn draw_messages(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Chat ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let inner_height = inner.height as usize;
    let scroll = app.scroll as usize;

    // Window of lines ending `scroll` lines above the bottom.
    let total = app.messages.len();
    let end = total.saturating_sub(scroll);
    let start = end.saturating_sub(inner_height);

    let mut y = inner.y;
    for line in app.messages.iter().skip(start).take(end - start) {
        let rendered = if line.is_system {
            Line::from(vec![
                Span::styled(
                    format!("{} ", line.timestamp),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(format!("*** {}", line.text), Style::default().fg(Color::Cyan)),
            ])
        } else if line.timestamp.is_empty() {
            // Preloaded history lines already carry their own timestamps.
            Line::from(Span::styled(
                line.text.clone(),
                Style::default().fg(Color::DarkGray),
            ))
        } else {
            Line::from(vec![
                Span::styled(
                    format!("{} ", line.timestamp),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::raw(line.text.as_str()),
            ])
        };
        let line_area = Rect::new(inner.x, y, inner.width, 1);
        frame.render_widget(Paragraph::new(rendered), line_area);
        y += 1;
        if y >= inner.y + inner.height {
            break;
        }
    }
}

fn draw_status(frame: &mut Frame, app: &App, area: Rect) {
    let status = Paragraph::new(Line::from(vec![
        Span::styled("Username: ", Style::default().fg(Color::DarkGray)),
        Span::raw(app.nickname.as_str()),
        Span::styled("  Reading: ", Style::default().fg(Color::DarkGray)),
        Span::raw(app.read_state),
        Span::styled("  Sending: ", Style::default().fg(Color::DarkGray)),
        Span::raw(app.write_state),
    ]))
    .block(Block::default().borders(Borders::ALL).title(" Connection "));
    frame.render_widget(status, area);
}

fn draw_input(frame: &mut Frame, app: &App, area: Rect) {
    let input = Paragraph::new(app.input.as_str())
        .block(Block::default().borders(Borders::ALL).title(" Message "));
    frame.render_widget(input, area);

    let cursor_x = area.x + 1 + app.cursor as u16;
    let cursor_y = area.y + 1;
    frame.set_cursor_position((cursor_x, cursor_y));
}
