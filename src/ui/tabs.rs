//! Tab-based UI rendering

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph, Tabs as RataTabs, Wrap};
use ratatui::Frame;

use crate::app::{App, InputMode, Tab};
use crate::domain::{Outcome, Phase, ResultFields, ResultSlots, SingleActionForm, PLACEHOLDER};
use crate::infrastructure::ledger::Transaction;
use crate::modules::{ToolForm, WalletPane};
use crate::ui::{draw_collection, draw_input, layout, truncate_str};

/// Draw the tab bar at the top
pub fn draw_tab_bar(f: &mut Frame, area: Rect, app: &App) {
    let titles: Vec<Line> = Tab::ALL
        .iter()
        .map(|tab| {
            let shortcut = tab.shortcut();
            let title = tab.title();
            Line::from(vec![
                Span::styled(
                    format!("{}:", shortcut),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::raw(title),
            ])
        })
        .collect();

    let selected = Tab::ALL.iter().position(|t| *t == app.active_tab).unwrap_or(0);

    let tabs = RataTabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(" ledgerview "),
        )
        .select(selected)
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .divider(" │ ");

    f.render_widget(tabs, area);
}

pub fn draw_blocks_tab(f: &mut Frame, area: Rect, app: &App) {
    draw_collection(f, area, app.blocks.view(), true, None);
}

pub fn draw_pool_tab(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(3)])
        .split(area);

    let mark: &dyn Fn(&Transaction) -> String = &|tx| {
        let mark = if app.pool.is_selected(tx) { "[x]" } else { "[ ]" };
        mark.to_string()
    };
    draw_collection(f, chunks[0], app.pool.view(), true, Some(("Sel", mark)));

    let submitter = app.pool.mine_submitter();
    let selected = app.pool.selection().len();
    let mut spans = vec![
        Span::styled("Selected ", Style::default().fg(Color::DarkGray)),
        Span::raw(format!("{selected}  ")),
    ];
    spans.extend(phase_spans(submitter.phase()));
    if let Some(summary) = submitter.slots().get("Result").filter(|v| *v != PLACEHOLDER) {
        spans.push(Span::raw(format!("  {summary}")));
    }
    let paragraph = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title("Mine (m)"),
    );
    f.render_widget(paragraph, chunks[1]);
}

pub fn draw_history_tab(f: &mut Frame, area: Rect, app: &App) {
    let (input, table) = layout::with_input(area);
    let editing = app.input_mode == InputMode::Form;
    let label = match app.history.shown() {
        Some(shown) => format!("Item hash (showing {})", truncate_str(shown, 24)),
        None => "Item hash".to_string(),
    };
    draw_input(f, input, &label, &app.history.query().value, editing);
    draw_collection(f, table, app.history.view(), !editing, None);
}

pub fn draw_wallet_tab(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    draw_own_wallet(f, chunks[0], app);

    let editing = app.input_mode == InputMode::Form;
    let label = match app.wallet.target() {
        Some(target) => format!("Address (showing {})", truncate_str(target, 40)),
        None => "Address".to_string(),
    };
    draw_input(f, chunks[1], &label, &app.wallet.address_input().value, editing);

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[2]);
    let pane = app.wallet.pane();
    draw_collection(
        f,
        panes[0],
        app.wallet.mined(),
        !editing && pane == WalletPane::Mined,
        None,
    );
    draw_collection(
        f,
        panes[1],
        app.wallet.coinbase(),
        !editing && pane == WalletPane::Coinbase,
        None,
    );
}

fn draw_own_wallet(f: &mut Frame, area: Rect, app: &App) {
    let line = match (app.wallet.own_address(), app.wallet.own_error()) {
        (Some(own), _) => Line::from(vec![
            Span::styled("Address ", Style::default().fg(Color::DarkGray)),
            Span::raw(format!("{}  ", own.address)),
            Span::styled("PKH ", Style::default().fg(Color::DarkGray)),
            Span::raw(format!("{}  ", truncate_str(&own.public_key_hash, 16))),
            Span::styled("Key ", Style::default().fg(Color::DarkGray)),
            Span::raw(truncate_str(&own.public_key, 24)),
        ]),
        (None, Some(err)) => Line::from(Span::styled(
            err.to_string(),
            Style::default().fg(Color::LightRed),
        )),
        (None, None) => Line::from(Span::styled(
            "loading…",
            Style::default().fg(Color::DarkGray),
        )),
    };
    let paragraph = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title("My wallet"),
    );
    f.render_widget(paragraph, area);
}

pub fn draw_tools_tab(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(28), Constraint::Min(0)])
        .split(area);

    let active = app.tools.active();
    let items: Vec<ListItem> = ToolForm::ALL
        .iter()
        .map(|form| {
            let style = if *form == active {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            let marker = if *form == active { "▸ " } else { "  " };
            ListItem::new(Line::from(Span::styled(
                format!("{marker}{}", form.title()),
                style,
            )))
        })
        .collect();
    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title("Tools"),
    );
    f.render_widget(list, chunks[0]);

    let editing = app.input_mode == InputMode::Form;
    match active {
        ToolForm::Hash => draw_form(f, chunks[1], active.title(), &app.tools.hash, editing),
        ToolForm::Sign => draw_form(f, chunks[1], active.title(), &app.tools.sign, editing),
        ToolForm::Coinbase => {
            draw_form(f, chunks[1], active.title(), &app.tools.coinbase, editing)
        }
    }
}

fn draw_form<R: ResultFields>(
    f: &mut Frame,
    area: Rect,
    title: &str,
    form: &SingleActionForm<R>,
    editing: bool,
) {
    let mut lines = Vec::new();
    for (i, field) in form.fields().iter().enumerate() {
        let focused = editing && i == form.focus();
        let label_style = if focused {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let mut spans = vec![
            Span::styled(format!("{:<12}", field.label), label_style),
            Span::raw(field.value.clone()),
        ];
        if focused {
            spans.push(Span::styled("▏", Style::default().fg(Color::Yellow)));
        }
        lines.push(Line::from(spans));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(phase_spans(form.phase())));
    lines.push(Line::from(""));
    lines.extend(slot_lines(form.slots()));

    let border = if editing { Color::Yellow } else { Color::DarkGray };
    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border))
                .title(title.to_string()),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}

fn slot_lines(slots: &ResultSlots) -> Vec<Line<'static>> {
    slots
        .iter()
        .map(|(label, value)| {
            Line::from(vec![
                Span::styled(format!("{label:<14}"), Style::default().fg(Color::DarkGray)),
                Span::raw(value.to_string()),
            ])
        })
        .collect()
}

fn phase_spans(phase: &Phase) -> Vec<Span<'static>> {
    match phase {
        Phase::Idle => vec![Span::styled("ready", Style::default().fg(Color::DarkGray))],
        Phase::Awaiting { .. } => {
            vec![Span::styled("submitting…", Style::default().fg(Color::Yellow))]
        }
        Phase::Rendered(Outcome::Success) => {
            vec![Span::styled("done", Style::default().fg(Color::LightGreen))]
        }
        Phase::Rendered(Outcome::Failed(message)) => vec![Span::styled(
            message.clone(),
            Style::default().fg(Color::LightRed),
        )],
    }
}
