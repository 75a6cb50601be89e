use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use ratatui::Frame;

use crate::app::App;
use crate::types::Item;

const NAME_WIDTH: usize = 24;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let title = format!(
        " Pokémon ({}) · {} ",
        app.items.len(),
        app.pagination.label()
    );
    let block = Block::default().borders(Borders::ALL).title(title);

    if app.items.is_empty() {
        let message = if app.loading() {
            "Loading..."
        } else {
            "Nothing loaded yet. Scroll or press r to retry."
        };
        let empty = Paragraph::new(message)
            .block(block)
            .style(Style::default().fg(Color::Gray));
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = app
        .items
        .iter()
        .enumerate()
        .map(|(i, item)| ListItem::new(item_line(i, item, i == app.selected)))
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray));

    let mut state = ListState::default()
        .with_offset(app.offset)
        .with_selected(Some(app.selected));

    frame.render_stateful_widget(list, area, &mut state);
}

/// One row: position, the name styled as a link, then the URL it points at.
pub fn item_line(index: usize, item: &Item, selected: bool) -> Line<'static> {
    let mut link = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::UNDERLINED);
    if selected {
        link = link.fg(Color::Yellow).add_modifier(Modifier::BOLD);
    }

    let name = sanitize(&item.name);
    let name_display = if name.chars().count() > NAME_WIDTH {
        let cut: String = name.chars().take(NAME_WIDTH - 3).collect();
        format!("{}...", cut)
    } else {
        name
    };
    let pad = " ".repeat(NAME_WIDTH.saturating_sub(name_display.chars().count()));

    Line::from(vec![
        Span::styled(
            format!("{:>5} ", index + 1),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(name_display, link),
        Span::raw(pad),
        Span::raw("  "),
        Span::styled(sanitize(&item.url), Style::default().fg(Color::Gray)),
    ])
}

/// Strip control characters so remote text cannot drive the terminal.
fn sanitize(text: &str) -> String {
    text.chars().filter(|c| !c.is_control()).collect()
}
