use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Position as CursorPosition, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

use crate::app::{App, Focus, Mode};

/// Indentation colours, cycled by bucket
pub const PALETTE: [Color; 8] = [
    Color::Cyan,
    Color::Green,
    Color::Yellow,
    Color::Magenta,
    Color::Blue,
    Color::Red,
    Color::LightCyan,
    Color::LightGreen,
];

fn focused_block(title: &str, focused: bool) -> Block<'_> {
    let block = Block::default().borders(Borders::ALL).title(title);
    if focused {
        block.border_style(Style::default().fg(Color::Yellow))
    } else {
        block
    }
}

pub fn ui(f: &mut Frame, app: &mut App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)].as_ref())
        .split(f.area());
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)].as_ref())
        .split(rows[0]);

    render_text(f, app, chunks[0]);
    render_navigator(f, app, chunks[1]);
    render_status(f, app, rows[1]);
}

fn render_text(f: &mut Frame, app: &mut App, area: Rect) {
    app.set_view_height(usize::from(area.height.saturating_sub(2)));

    let number_width = app.document.line_count().to_string().len();
    let lines: Vec<Line> = app
        .document
        .lines()
        .skip(app.scroll)
        .take(app.view_height)
        .map(|info| {
            let mut style = match app.line_buckets.get(info.number).copied().flatten() {
                Some(bucket) => Style::default().fg(PALETTE[bucket % PALETTE.len()]),
                None => Style::default(),
            };
            if info.number == app.cursor.line {
                style = style.add_modifier(Modifier::BOLD);
            }
            Line::from(vec![
                Span::styled(
                    format!("{:>number_width$} ", info.number + 1),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(info.text, style),
            ])
        })
        .collect();

    let dirty = if app.dirty { " [+]" } else { "" };
    let title = format!("{}{dirty}", app.document.name());
    let text = Paragraph::new(lines).block(focused_block(&title, app.focus == Focus::Text));
    f.render_widget(text, area);

    if app.focus == Focus::Text && matches!(app.mode, Mode::Normal) {
        let x = area.x + 1 + (number_width + 1 + app.cursor.column) as u16;
        let y = area.y + 1 + app.cursor.line.saturating_sub(app.scroll) as u16;
        if x < area.right().saturating_sub(1) && y < area.bottom().saturating_sub(1) {
            f.set_cursor_position(CursorPosition::new(x, y));
        }
    }
}

fn render_navigator(f: &mut Frame, app: &mut App, area: Rect) {
    let items: Vec<ListItem> = app
        .nav_rows
        .iter()
        .map(|row| {
            if row.is_header {
                ListItem::new(Line::from(Span::styled(
                    row.label.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                )))
            } else {
                ListItem::new(Line::from(vec![
                    Span::raw("  "),
                    Span::styled(row.label.clone(), Style::default().fg(Color::DarkGray)),
                    Span::raw(row.description.clone()),
                ]))
            }
        })
        .collect();

    let list = List::new(items)
        .block(focused_block("Navigator", app.focus == Focus::Navigator))
        .highlight_style(Style::default().bg(Color::Yellow).fg(Color::Black));

    if app.focus == Focus::Navigator {
        f.render_stateful_widget(list, area, &mut app.nav_state);
    } else {
        f.render_widget(list, area);
    }
}

fn render_status(f: &mut Frame, app: &App, area: Rect) {
    let line = match &app.mode {
        Mode::Pattern(pattern) => Line::from(vec![Span::raw("/"), Span::raw(pattern.clone())]),
        Mode::Normal if !app.status.is_empty() => Line::from(app.status.clone()),
        Mode::Normal => match app.focus {
            Focus::Text => Line::from(
                "q: Quit | j/k/h/l: Move | J/K: Jump | w/b: Word | m: Mark word | /: Mark pattern | o/y/d: Line | s: Save | Tab: Navigator",
            ),
            Focus::Navigator => {
                Line::from("q: Quit | j/k: Select | Enter: Go to line | x: Remove | Tab: Text")
            }
        },
    };
    f.render_widget(Paragraph::new(line), area);
}
