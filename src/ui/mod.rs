use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap};
use ratatui::Frame;

pub mod layout;
pub mod tabs;

use crate::app::{App, InputMode, StatusLevel, Tab};
use crate::domain::{CollectionView, LoadState};

pub fn draw(f: &mut Frame, app: &App) {
    let areas = layout::areas(f.size());

    tabs::draw_tab_bar(f, areas.header, app);
    match app.active_tab {
        Tab::Blocks => tabs::draw_blocks_tab(f, areas.main, app),
        Tab::Pool => tabs::draw_pool_tab(f, areas.main, app),
        Tab::History => tabs::draw_history_tab(f, areas.main, app),
        Tab::Wallet => tabs::draw_wallet_tab(f, areas.main, app),
        Tab::Tools => tabs::draw_tools_tab(f, areas.main, app),
    }
    draw_status_line(f, areas.status_line, app);
    draw_command_line(f, areas.command_line, app);

    if app.help_open {
        draw_help_popup(f, areas.size, app);
    }
    if let Some(message) = app.alert.as_deref() {
        draw_alert_popup(f, areas.size, message);
    }
}

/// Per-row decoration drawn in front of the template columns
pub(crate) type RowMark<'a, T> = Option<(&'static str, &'a dyn Fn(&T) -> String)>;

/// Draw a collection as a table: each primary row is followed by its detail
/// row when expanded
pub(crate) fn draw_collection<T>(
    f: &mut Frame,
    area: Rect,
    view: &CollectionView<T>,
    focused: bool,
    mark: RowMark<'_, T>,
) {
    let columns = view.columns();
    let mut header_cells: Vec<Cell> = Vec::new();
    if let Some((title, _)) = mark {
        header_cells.push(Cell::from(title));
    }
    header_cells.extend(columns.iter().map(|c| Cell::from(*c)));
    let header = Row::new(header_cells).style(
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    );

    let mut rows = Vec::with_capacity(view.len() * 2);
    let mut cursor_row = None;
    for (row, item) in view.rows().iter().zip(view.items()) {
        if row.position == view.cursor() {
            cursor_row = Some(rows.len());
        }
        let mut cells: Vec<Cell> = Vec::new();
        if let Some((_, mark)) = mark {
            cells.push(Cell::from(mark(item)));
        }
        cells.extend(row.cells.iter().map(|c| Cell::from(c.clone())));
        rows.push(Row::new(cells));

        if view.is_expanded(row) {
            let mut detail: Vec<Cell> = Vec::new();
            if mark.is_some() {
                detail.push(Cell::from(""));
            }
            detail.push(Cell::from(Span::styled("  ↳", Style::default().fg(Color::DarkGray))));
            detail.extend(row.detail.iter().map(|(label, value)| {
                Cell::from(Line::from(vec![
                    Span::styled(format!("{label} "), Style::default().fg(Color::DarkGray)),
                    Span::raw(value.clone()),
                ]))
            }));
            rows.push(Row::new(detail).style(Style::default().fg(Color::Gray)));
        }
    }

    let mut widths: Vec<Constraint> = Vec::new();
    if mark.is_some() {
        widths.push(Constraint::Length(7));
    }
    let share = (100 / columns.len().max(1)) as u16;
    widths.extend(columns.iter().map(|_| Constraint::Percentage(share)));

    let border = if focused { Color::Cyan } else { Color::DarkGray };
    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border))
                .title(collection_title(view)),
        )
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("▸ ");

    let mut state = TableState::default();
    if focused {
        state.select(cursor_row);
    }
    f.render_stateful_widget(table, area, &mut state);
}

fn collection_title<T>(view: &CollectionView<T>) -> String {
    let title = view.title().to_uppercase();
    match view.load_state() {
        LoadState::Idle => title,
        LoadState::Loading => format!("{title} (loading…)"),
        LoadState::Loaded => format!("{title} ({})", view.len()),
        LoadState::Failed(_) => format!("{title} (failed, showing previous)"),
    }
}

/// One-line text input inside a bordered box
pub(crate) fn draw_input(f: &mut Frame, area: Rect, label: &str, value: &str, editing: bool) {
    let style = if editing {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::White)
    };
    let mut spans = vec![Span::raw(value.to_string())];
    if editing {
        spans.push(Span::styled("▏", Style::default().fg(Color::Yellow)));
    } else if value.is_empty() {
        spans.push(Span::styled("press i to edit", Style::default().fg(Color::DarkGray)));
    }
    let paragraph = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(style)
            .title(label.to_string()),
    );
    f.render_widget(paragraph, area);
}

fn draw_status_line(f: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![
        Span::styled("Service ", Style::default().fg(Color::DarkGray)),
        Span::raw(format!("{}  ", app.service_url)),
        Span::styled("Tab ", Style::default().fg(Color::DarkGray)),
        Span::raw(format!("{}  ", app.active_tab.title())),
    ];
    if app.in_flight() > 0 {
        spans.push(Span::styled("Pending ", Style::default().fg(Color::DarkGray)));
        spans.push(Span::raw(app.in_flight().to_string()));
        spans.push(Span::raw("  "));
    }
    if app.active_tab == Tab::Pool {
        spans.push(Span::styled("Selected ", Style::default().fg(Color::DarkGray)));
        spans.push(Span::raw(app.pool.selection().len().to_string()));
    }

    let paragraph = Paragraph::new(Line::from(spans))
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Left);
    f.render_widget(paragraph, area);
}

/// Get command hint for autocompletion
fn command_hint(input: &str) -> Option<&'static str> {
    let input = input.trim().to_lowercase();
    if input.is_empty() {
        return None;
    }

    let commands = [
        ("blocks", "blocks [n]: latest blocks"),
        ("pool", "Transaction pool"),
        ("mine", "Mine the selected pool transactions"),
        ("history", "history <item_hash>"),
        ("wallet", "wallet [address]"),
        ("hash", "hash <item_id> <hash>: verify an item hash"),
        ("sign", "sign <token>"),
        ("coinbase", "coinbase <item_hash> <amount>"),
        ("clear", "Clear the active tool form"),
        ("refresh", "Reload the current tab"),
        ("help", "Show key bindings"),
        ("quit", "Quit"),
    ];

    let word = input.split_whitespace().next().unwrap_or_default();
    commands
        .into_iter()
        .find(|(cmd, _)| cmd.starts_with(word))
        .map(|(_, desc)| desc)
}

fn draw_command_line(f: &mut Frame, area: Rect, app: &App) {
    let content = match app.input_mode {
        InputMode::Command => {
            let hint = command_hint(&app.command.input);
            let hint_text = hint.unwrap_or("blocks | pool | mine | history | wallet | hash | sign | coinbase");
            Line::from(vec![
                Span::styled(": ", Style::default().fg(Color::Yellow)),
                Span::raw(&app.command.input),
                Span::styled(
                    format!("  {}", hint_text),
                    Style::default().fg(Color::DarkGray),
                ),
            ])
        }
        InputMode::Form => Line::from(Span::styled(
            "editing: Enter=submit  Tab=next field  Esc=done",
            Style::default().fg(Color::LightCyan),
        )),
        InputMode::Normal => {
            if let Some((text, level)) = app.status_text() {
                let color = match level {
                    StatusLevel::Info => Color::LightGreen,
                    StatusLevel::Warn => Color::LightYellow,
                    StatusLevel::Error => Color::LightRed,
                };
                Line::from(vec![
                    Span::styled("msg: ", Style::default().fg(Color::DarkGray)),
                    Span::styled(text, Style::default().fg(color)),
                ])
            } else {
                action_hints(app)
            }
        }
    };

    let paragraph = Paragraph::new(content).style(Style::default().fg(Color::White));
    f.render_widget(paragraph, area);
}

fn action_hints(app: &App) -> Line<'static> {
    let hints = match app.active_tab {
        Tab::Blocks => "j/k move  Enter detail  r refresh  : command  ? help",
        Tab::Pool => "Space select  m mine  Enter detail  r refresh  ? help",
        Tab::History => "i item hash  Enter detail  r refresh  c clear  ? help",
        Tab::Wallet => "h/l pane  i address  Enter detail  r refresh  ? help",
        Tab::Tools => "j/k form  i edit  c clear  ? help",
    };
    Line::from(Span::styled(hints, Style::default().fg(Color::DarkGray)))
}

fn draw_help_popup(f: &mut Frame, area: Rect, app: &App) {
    let popup_area = centered_rect(64, 70, area);
    f.render_widget(Clear, popup_area);

    let lines = vec![
        Line::from("Navigation"),
        Line::from("  1-5        Jump to tab"),
        Line::from("  Tab/S-Tab  Next / previous tab"),
        Line::from("  j / k      Move cursor"),
        Line::from("  g / G      Top / bottom"),
        Line::from("  Enter / e  Expand / collapse detail row"),
        Line::from("  h / l      Mined / coinbase pane (Wallet)"),
        Line::from(""),
        Line::from("Actions"),
        Line::from("  Space      Select transaction (Pool)"),
        Line::from("  m          Mine selected transactions (Pool)"),
        Line::from("  i          Edit form / lookup field"),
        Line::from("  c          Clear form"),
        Line::from("  r          Refresh"),
        Line::from("  :          Command palette"),
        Line::from("  ?          Toggle help"),
        Line::from("  q          Quit"),
        Line::from(""),
        Line::from("Commands"),
        Line::from("  :blocks [n]  :pool  :mine  :history <item_hash>"),
        Line::from("  :wallet [address]  :hash <item_id> <hash>"),
        Line::from("  :sign <token>  :coinbase <item_hash> <amount>"),
        Line::from("  :clear  :refresh  :quit"),
        Line::from(""),
        Line::from(format!("Active tab: {}", app.active_tab.title())),
    ];

    let paragraph = Paragraph::new(Text::from(lines))
        .block(Block::default().title("Help").borders(Borders::ALL))
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: true });

    f.render_widget(paragraph, popup_area);
}

fn draw_alert_popup(f: &mut Frame, area: Rect, message: &str) {
    let popup_area = centered_rect(50, 24, area);
    f.render_widget(Clear, popup_area);

    let lines = vec![
        Line::from(""),
        Line::from(message.to_string()),
        Line::from(""),
        Line::from(Span::styled(
            "Enter / Esc to dismiss",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let paragraph = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .title("Alert")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::LightYellow)),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, popup_area);
}

pub(crate) fn truncate_str(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        return value.to_string();
    }
    value.chars().take(max).collect::<String>() + "…"
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
