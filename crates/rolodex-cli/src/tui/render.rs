//! Drawing for the address book view. Reads session state, never mutates it.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::border;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap};
use rolodex_core::{DetailLineKind, EditField, Store};
use std::time::Duration;

use super::app::{AddressBookView, InputMode};
use super::edit_dialog::with_cursor;

const STATUS_TTL: Duration = Duration::from_secs(3);

/// Render the whole view into `area`.
pub fn render_into<S: Store>(frame: &mut ratatui::Frame<'_>, app: &mut AddressBookView<S>, area: Rect) {
    // Layout: header + content + status bar.
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(area);

    frame.render_widget(Paragraph::new(build_header(app)), chunks[0]);

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(chunks[1]);
    render_address_table(frame, app, panes[0]);
    render_detail_panel(frame, app, panes[1]);

    frame.render_widget(Paragraph::new(build_status_bar(app)), chunks[2]);

    match app.input_mode {
        InputMode::Edit => render_edit_modal(frame, app, area),
        InputMode::LabelPrompt => render_label_prompt(frame, app, area),
        InputMode::Help => render_help_overlay(frame, app, area),
        InputMode::Normal => {}
    }
}

fn build_header<S: Store>(app: &AddressBookView<S>) -> Line<'static> {
    let session = app.session();
    Line::from(vec![
        Span::styled(
            " rolodex ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {} addresses", session.addresses().len()),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!("  {} selected", session.selection().len()),
            Style::default().fg(Color::Cyan),
        ),
    ])
}

// ---------------------------------------------------------------------------
// List pane
// ---------------------------------------------------------------------------

fn render_address_table<S: Store>(frame: &mut ratatui::Frame<'_>, app: &mut AddressBookView<S>, area: Rect) {
    let rows: Vec<Row<'static>> = app
        .session
        .entries()
        .map(|entry| {
            let marker = if entry.selected { "* " } else { "  " };
            let mut name_style = Style::default().fg(Color::White);
            if entry.incomplete {
                name_style = name_style.add_modifier(Modifier::ITALIC).fg(Color::Gray);
            }
            let nickname = entry.address.nickname().unwrap_or_default().to_string();
            Row::new(vec![
                Cell::from(marker).style(Style::default().fg(Color::Yellow)),
                Cell::from(entry.address.name.clone()).style(name_style),
                Cell::from(nickname).style(Style::default().fg(Color::DarkGray)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(2),
            Constraint::Min(12),
            Constraint::Max(16),
        ],
    )
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_set(border::ROUNDED)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Addresses "),
    )
    .row_highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    );

    frame.render_stateful_widget(table, area, &mut app.table_state);
}

// ---------------------------------------------------------------------------
// Detail pane
// ---------------------------------------------------------------------------

fn detail_lines<S: Store>(app: &AddressBookView<S>) -> Vec<Line<'static>> {
    let Some(detail) = app.session().detail() else {
        return vec![Line::from(Span::styled(
            "No addresses. Run `rdx seed` to create sample data.",
            Style::default().fg(Color::DarkGray),
        ))];
    };

    detail
        .lines
        .iter()
        .map(|line| {
            let style = match line.kind {
                DetailLineKind::Nickname => Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::ITALIC),
                DetailLineKind::Labels => Style::default().fg(Color::Cyan),
                DetailLineKind::Street | DetailLineKind::CityStateZip | DetailLineKind::Blank => {
                    Style::default().fg(Color::White)
                }
            };
            Line::from(Span::styled(line.text.clone(), style))
        })
        .collect()
}

fn render_detail_panel<S: Store>(frame: &mut ratatui::Frame<'_>, app: &AddressBookView<S>, area: Rect) {
    let title = app
        .session()
        .focused()
        .map_or_else(|| " Detail ".to_string(), |a| format!(" {} ", a.name));
    let block = Block::default()
        .borders(Borders::ALL)
        .border_set(border::ROUNDED)
        .border_style(Style::default().fg(Color::Green))
        .title(title)
        .title_style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );
    let paragraph = Paragraph::new(detail_lines(app))
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

// ---------------------------------------------------------------------------
// Modals
// ---------------------------------------------------------------------------

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(area.width.saturating_sub(4));
    let h = height.min(area.height.saturating_sub(2));
    let x = area.x + area.width.saturating_sub(w) / 2;
    let y = area.y + area.height.saturating_sub(h) / 2;
    Rect::new(x, y, w, h)
}

fn modal_block(title: String) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_set(border::ROUNDED)
        .border_style(Style::default().fg(Color::Green))
        .title(title)
        .title_style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
}

fn hint_line(pairs: &[(&'static str, &'static str)]) -> Line<'static> {
    let key_style = Style::default().fg(Color::Cyan);
    let dim_style = Style::default().fg(Color::DarkGray);
    let mut spans = Vec::with_capacity(pairs.len() * 2);
    for (key, label) in pairs {
        spans.push(Span::styled(*key, key_style));
        spans.push(Span::styled(format!(" {label}  "), dim_style));
    }
    Line::from(spans)
}

fn render_edit_modal<S: Store>(frame: &mut ratatui::Frame<'_>, app: &AddressBookView<S>, area: Rect) {
    let (Some(dialog), Some(tx)) = (app.edit_dialog.as_ref(), app.session().edit()) else {
        return;
    };

    let popup = centered(area, 64, 11);
    frame.render_widget(Clear, popup);

    let dirty = if tx.is_dirty() { " *" } else { "" };
    let block = modal_block(format!(" Edit {}{dirty} ", tx.original().name));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let draft = tx.draft();
    let mut lines: Vec<Line<'static>> = EditField::ALL
        .iter()
        .map(|field| {
            let focused = *field == dialog.focus;
            let value = draft.get(*field);
            let label_style = if focused {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            let text = if focused {
                with_cursor(value, dialog.cursor)
            } else {
                value.to_string()
            };
            Line::from(vec![
                Span::styled(format!("{:<10}", field.as_str()), label_style),
                Span::styled(text, Style::default().fg(Color::White)),
            ])
        })
        .collect();
    lines.push(Line::default());
    lines.push(hint_line(&[
        ("Enter", "save"),
        ("Tab", "next"),
        ("Shift+Tab", "prev"),
        ("Esc", "cancel"),
    ]));

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_label_prompt<S: Store>(frame: &mut ratatui::Frame<'_>, app: &AddressBookView<S>, area: Rect) {
    let popup = centered(area, 56, 5);
    frame.render_widget(Clear, popup);

    let count = app.session().selection().len();
    let block = modal_block(format!(" Label {count} selected "));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let lines = vec![
        Line::from(vec![
            Span::styled("Label: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                with_cursor(&app.label_input, app.label_cursor),
                Style::default().fg(Color::White),
            ),
        ]),
        Line::default(),
        hint_line(&[("Enter", "apply"), ("Esc", "cancel")]),
    ];
    frame.render_widget(Paragraph::new(lines), inner);
}

/// One row of the help overlay: key, the mode it applies in, and action.
struct Hotkey(&'static str, &'static str, &'static str);

impl Hotkey {
    fn matches(&self, query: &str) -> bool {
        [self.0, self.1, self.2]
            .iter()
            .any(|text| text.to_lowercase().contains(query))
    }
}

const HOTKEYS: &[Hotkey] = &[
    Hotkey("j/k", "list", "move focus"),
    Hotkey("g/G", "list", "first/last address"),
    Hotkey("s/space", "list", "toggle selection"),
    Hotkey("Ctrl+A", "list", "select all"),
    Hotkey("Ctrl+D", "list", "select none"),
    Hotkey("e", "list", "edit focused address"),
    Hotkey("l", "list", "label selected addresses"),
    Hotkey("Ctrl+L", "global", "reload from database"),
    Hotkey("?", "global", "open help overlay"),
    Hotkey("q", "global", "quit"),
    Hotkey("Tab", "edit", "next field"),
    Hotkey("Shift+Tab", "edit", "previous field"),
    Hotkey("Enter", "edit", "save address"),
    Hotkey("Ctrl+S", "edit", "save address"),
    Hotkey("Esc", "edit", "discard changes"),
    Hotkey("Enter", "label", "apply label"),
    Hotkey("Esc", "label", "cancel"),
];

fn render_help_overlay<S: Store>(frame: &mut ratatui::Frame<'_>, app: &AddressBookView<S>, area: Rect) {
    let popup = centered(area, 72, 23);
    frame.render_widget(Clear, popup);
    let block = modal_block(" Hotkeys ".to_string());
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let [filter_area, _, rows_area, hint_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(inner);

    let filter = Line::from(vec![
        Span::styled("Filter: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            with_cursor(&app.help_query, app.help_query.chars().count()),
            Style::default().fg(Color::White),
        ),
    ]);
    frame.render_widget(Paragraph::new(filter), filter_area);

    let query = app.help_query.to_lowercase();
    let key_style = Style::default().fg(Color::Cyan);
    let mut rows: Vec<Line<'static>> = HOTKEYS
        .iter()
        .filter(|hotkey| hotkey.matches(&query))
        .map(|Hotkey(key, mode, action)| {
            Line::from(vec![
                Span::styled(format!("{key:<10}{mode:<8}"), key_style),
                Span::raw(*action),
            ])
        })
        .collect();
    if rows.is_empty() {
        rows.push(Line::styled(
            format!("Nothing matches \"{}\"", app.help_query),
            Style::default().fg(Color::DarkGray),
        ));
    }
    frame.render_widget(Paragraph::new(rows), rows_area);
    frame.render_widget(
        Paragraph::new(hint_line(&[("Esc", "close"), ("Type", "filter")])),
        hint_area,
    );
}

// ---------------------------------------------------------------------------
// Status bar
// ---------------------------------------------------------------------------

fn build_status_bar<S: Store>(app: &AddressBookView<S>) -> Line<'static> {
    // Transient status message wins while it is fresh.
    if let Some((ref msg, at)) = app.status_msg
        && at.elapsed() < STATUS_TTL
    {
        return Line::from(Span::styled(msg.clone(), Style::default().fg(Color::Cyan)));
    }

    match app.input_mode {
        InputMode::Edit => hint_line(&[
            ("TAB", "next field"),
            ("SHIFT+TAB", "prev field"),
            ("ENTER", "save"),
            ("ESC", "cancel"),
        ]),
        InputMode::LabelPrompt => hint_line(&[("ENTER", "apply"), ("ESC", "cancel")]),
        InputMode::Help => hint_line(&[
            ("TYPE", "search keys"),
            ("BACKSPACE", "delete char"),
            ("ESC", "close help"),
        ]),
        InputMode::Normal => hint_line(&[
            ("j/k", "move"),
            ("s", "select"),
            ("e", "edit"),
            ("l", "label"),
            ("?", "help"),
            ("q", "quit"),
        ]),
    }
}
