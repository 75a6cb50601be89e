mod popup;
mod results;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::{App, InputMode};

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);
    results::render(frame, app, chunks[1]);
    render_status_bar(frame, app, chunks[2]);

    if let InputMode::Goto(input) = &app.mode {
        popup::render_input(frame, "Go to item #", input);
    }
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::styled(
        format!("pokescroll - {}", app.source_name()),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )];
    if app.autoscroll {
        spans.push(Span::styled(
            "  ▶ autoscroll",
            Style::default().fg(Color::Green),
        ));
    }

    let header = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let status = if let Some(error) = &app.error {
        Line::from(vec![Span::styled(
            format!("Error: {}", error),
            Style::default().fg(Color::Red),
        )])
    } else if app.loading() {
        Line::from(vec![Span::styled(
            format!("Loading page {}...", app.pagination.current_page + 1),
            Style::default().fg(Color::Yellow),
        )])
    } else if let Some(notice) = &app.notice {
        Line::from(vec![Span::styled(
            notice.clone(),
            Style::default().fg(Color::Green),
        )])
    } else {
        let help = match app.mode {
            InputMode::Normal => {
                "j/k/g/G: nav | Ctrl+d/u: page | [/]: prev/next page | :: go to | space: autoscroll | Enter: open | y: yank | r: refresh | q: quit"
            }
            InputMode::Goto(_) => "0-9: item number | Enter: go | Esc: cancel",
        };
        Line::from(vec![Span::styled(help, Style::default().fg(Color::Gray))])
    };

    let status_bar = Paragraph::new(status).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(status_bar, area);
}
