use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};
use chrono::{DateTime, Local, Utc};
use teller_core::money::format_money;
use teller_core::{Author, FormattedSegment, PendingPayment, TurnState};
use crate::app::{App, FocusPane, InputMode, Verification, VerificationPhase};

/// Ensure the selected item in a list is visible by adjusting the ListState offset.
fn ensure_selected_visible(state: &mut ListState, visible_height: usize) {
    let visible_height = visible_height.max(1);

    if let Some(selected) = state.selected() {
        let min_offset = selected.saturating_sub(visible_height - 1);
        let max_offset = selected;

        let new_offset = state.offset().clamp(min_offset, max_offset);
        if new_offset != state.offset() {
            *state.offset_mut() = new_offset;
        }
    }
}

/// Turn formatted segments into styled lines, splitting on newlines.
/// Emphasized runs render bold.
fn segments_to_lines(segments: &[FormattedSegment]) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = Vec::new();
    let mut spans: Vec<Span<'static>> = Vec::new();

    for segment in segments {
        let style = if segment.emphasized {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };

        let mut parts = segment.text.split('\n').peekable();
        while let Some(part) = parts.next() {
            if !part.is_empty() {
                spans.push(Span::styled(part.to_string(), style));
            }
            if parts.peek().is_some() {
                lines.push(Line::from(std::mem::take(&mut spans)));
            }
        }
    }

    lines.push(Line::from(spans));
    lines
}

/// Rows a line takes once word-wrapped to `width` columns. Words move to
/// the next row whole; a word wider than a row is broken across rows.
fn wrapped_height(line: &Line, width: usize) -> usize {
    if width == 0 {
        return 1;
    }
    let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();

    let mut rows = 1;
    let mut col = 0;
    for (i, word) in text.split(' ').enumerate() {
        let len = word.chars().count();
        let start = if i == 0 || col == 0 { col } else { col + 1 };
        if start + len <= width {
            col = start + len;
            continue;
        }
        if col > 0 {
            rows += 1;
        }
        // Full rows taken by the word, remainder stays on the last one
        let extra = len.saturating_sub(1) / width;
        rows += extra;
        col = len - extra * width;
    }
    rows
}

/// Local wall-clock time of a message, like `14:05`
fn entry_time(created_at: DateTime<Utc>) -> String {
    created_at.with_timezone(&Local).format("%H:%M").to_string()
}

fn author_label(app: &App, author: Author, created_at: Option<DateTime<Utc>>) -> Line<'static> {
    let strings = app.locale.strings();
    let (name, color) = match author {
        Author::User => (strings.user_label, Color::Cyan),
        Author::Assistant => (strings.assistant_label, Color::Yellow),
    };
    let mut spans = vec![Span::styled(
        format!("{}:", name),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )];
    if let Some(at) = created_at {
        spans.push(Span::styled(
            format!(" {}", entry_time(at)),
            Style::default().fg(Color::DarkGray),
        ));
    }
    Line::from(spans)
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_chat_screen(app, frame, body_area);
    render_footer(app, frame, footer_area);

    // Popups
    if let Some(verification) = &app.verification {
        render_verification(app, verification, frame, area);
    } else if app.turn_state() == TurnState::HandoffPending {
        if let Some(payment) = app.session.controller().pending_payment() {
            render_payment_prompt(app, payment, frame, area);
        }
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" Teller ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            format!("[{}] ", app.locale.display_name()),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            app.session.controller().user_id().to_string(),
            Style::default().fg(Color::Gray),
        ),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };

    let mode_text = match app.input_mode {
        InputMode::Normal => " CHAT ",
        InputMode::Editing => " TYPE ",
    };

    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hints = if let Some(verification) = &app.verification {
        if verification.phase == VerificationPhase::Review {
            vec![
                Span::styled(" Enter ", key_style),
                Span::styled(" complete ", label_style),
                Span::styled(" Esc ", key_style),
                Span::styled(" back ", label_style),
            ]
        } else {
            vec![]
        }
    } else if app.turn_state() == TurnState::HandoffPending {
        vec![
            Span::styled(" y/Enter ", key_style),
            Span::styled(" continue ", label_style),
            Span::styled(" n/Esc ", key_style),
            Span::styled(" cancel ", label_style),
        ]
    } else {
        match (app.input_mode, app.focus) {
            (InputMode::Editing, _) => vec![
                Span::styled(" Enter ", key_style),
                Span::styled(" send ", label_style),
                Span::styled(" Tab ", key_style),
                Span::styled(" focus ", label_style),
                Span::styled(" Esc ", key_style),
                Span::styled(" normal ", label_style),
            ],
            (InputMode::Normal, FocusPane::Suggestions) => vec![
                Span::styled(" j/k ", key_style),
                Span::styled(" nav ", label_style),
                Span::styled(" Enter ", key_style),
                Span::styled(" ask ", label_style),
                Span::styled(" Tab ", key_style),
                Span::styled(" focus ", label_style),
                Span::styled(" q ", key_style),
                Span::styled(" quit ", label_style),
            ],
            (InputMode::Normal, _) => vec![
                Span::styled(" j/k ", key_style),
                Span::styled(" scroll ", label_style),
                Span::styled(" G ", key_style),
                Span::styled(" bottom ", label_style),
                Span::styled(" i ", key_style),
                Span::styled(" type ", label_style),
                Span::styled(" l ", key_style),
                Span::styled(" lang ", label_style),
                Span::styled(" q ", key_style),
                Span::styled(" quit ", label_style),
            ],
        }
    };

    let footer_content = Line::from(
        vec![
            Span::styled(mode_text, mode_style),
            Span::styled(" ", label_style),
        ]
        .into_iter()
        .chain(hints)
        .collect::<Vec<_>>(),
    );

    let footer = Paragraph::new(footer_content).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

fn chat_lines(app: &App) -> Vec<Line<'static>> {
    let controller = app.session.controller();
    let mut lines: Vec<Line<'static>> = Vec::new();

    for entry in controller.log() {
        lines.push(author_label(app, entry.author(), Some(entry.created_at())));
        match entry.author() {
            Author::User => lines.push(Line::from(entry.text().to_string())),
            Author::Assistant => lines.extend(segments_to_lines(entry.segments())),
        }
        lines.push(Line::default());
    }

    // The reply being typed out
    if let Some(visible) = controller.visible_segments() {
        lines.push(author_label(app, Author::Assistant, None));
        lines.extend(segments_to_lines(visible));
        lines.push(Line::default());
    }

    if controller.state() == TurnState::AwaitingResponse {
        lines.push(author_label(app, Author::Assistant, None));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("{}{}", app.locale.strings().assistant_typing, dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    lines
}

fn render_chat_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    let suggestion_count = app.suggestions().len();
    let suggestions_height = if suggestion_count == 0 {
        0
    } else {
        (suggestion_count.min(5) + 2) as u16
    };

    let [chat_area, suggestions_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(suggestions_height),
        Constraint::Length(3),
    ])
    .areas(area);

    // Store areas for mouse hit-testing
    app.chat_area = Some(chat_area);
    app.suggestions_area = if suggestions_height > 0 { Some(suggestions_area) } else { None };

    render_chat(app, frame, chat_area);
    if suggestions_height > 0 {
        render_suggestions(app, frame, suggestions_area);
    }
    render_input(app, frame, input_area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    let border_color = if app.focus == FocusPane::Chat { Color::Cyan } else { Color::DarkGray };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Chat ");

    let lines = chat_lines(app);

    // Inner size minus borders
    let inner_width = area.width.saturating_sub(2) as usize;
    let inner_height = area.height.saturating_sub(2);
    app.chat_height = inner_height;

    let total: usize = lines.iter().map(|l| wrapped_height(l, inner_width)).sum();
    let max_scroll = total
        .saturating_sub(inner_height as usize)
        .min(u16::MAX as usize) as u16;
    if app.follow_tail || app.chat_scroll >= max_scroll {
        app.chat_scroll = max_scroll;
        app.follow_tail = true;
    }

    let chat = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.chat_scroll, 0));

    frame.render_widget(chat, area);
}

fn render_suggestions(app: &mut App, frame: &mut Frame, area: Rect) {
    let focused = app.focus == FocusPane::Suggestions;
    let border_color = if focused { Color::Cyan } else { Color::Magenta };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(format!(" {} ", app.locale.strings().suggestions_title));

    let items: Vec<ListItem> = app
        .suggestions()
        .iter()
        .map(|s| ListItem::new(format!(" {} ", s)))
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::Magenta)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let visible_height = area.height.saturating_sub(2) as usize;
    ensure_selected_visible(&mut app.suggestion_state, visible_height);

    frame.render_stateful_widget(list, area, &mut app.suggestion_state);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let focused = app.focus == FocusPane::Input || app.input_mode == InputMode::Editing;
    let border_color = if focused { Color::Yellow } else { Color::DarkGray };

    let busy = matches!(
        app.turn_state(),
        TurnState::AwaitingResponse | TurnState::Revealing
    );
    let title = if busy { " Ask (busy) " } else { " Ask " };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    // Horizontal scrolling keeps the cursor in view
    let inner_width = area.width.saturating_sub(2) as usize;
    let scroll_offset = if inner_width == 0 {
        0
    } else if app.cursor >= inner_width {
        app.cursor - inner_width + 1
    } else {
        0
    };

    let input = if app.input.is_empty() {
        Paragraph::new(app.locale.strings().input_placeholder)
            .style(Style::default().fg(Color::DarkGray))
    } else {
        let visible: String = app.input.chars().skip(scroll_offset).take(inner_width).collect();
        Paragraph::new(visible).style(Style::default().fg(Color::Cyan))
    };

    frame.render_widget(input.block(block), area);

    if app.input_mode == InputMode::Editing && app.verification.is_none() {
        let cursor_x = (app.cursor - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn centered_popup(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

fn detail_line(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{}: ", label), Style::default().fg(Color::DarkGray)),
        Span::styled(value, Style::default().fg(Color::White).bold()),
    ])
}

fn render_payment_prompt(app: &App, payment: &PendingPayment, frame: &mut Frame, area: Rect) {
    let strings = app.locale.strings();
    let popup_area = centered_popup(area, 60, 10);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(format!(" {} ", strings.confirm_title));

    let lines = vec![
        detail_line(strings.amount_label, format_money(payment.amount, app.locale)),
        detail_line(strings.account_id_label, payment.account_id.clone()),
        detail_line(strings.account_name_label, payment.account_name.clone()),
        detail_line(strings.description_label, payment.description.clone()),
        Line::default(),
        Line::from(vec![
            Span::styled(" y ", Style::default().bg(Color::Green).fg(Color::Black)),
            Span::raw(format!(" {}   ", strings.continue_label)),
            Span::styled(" n ", Style::default().bg(Color::Red).fg(Color::White)),
            Span::raw(format!(" {}", strings.cancel_label)),
        ]),
    ];

    let prompt = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    frame.render_widget(prompt, popup_area);
}

fn render_verification(app: &App, verification: &Verification, frame: &mut Frame, area: Rect) {
    let strings = app.locale.strings();
    let payment = &verification.payment;
    let popup_area = centered_popup(area, 64, 14);

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" {} ", strings.verification_title));

    let mut lines = vec![
        Line::from(Span::styled(
            format_money(payment.amount, app.locale),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
        Line::default(),
        detail_line(strings.transaction_id_label, verification.transaction_id.clone()),
        detail_line(
            strings.date_label,
            verification.opened_at.format("%d/%m/%Y %H:%M").to_string(),
        ),
        detail_line(strings.account_id_label, payment.account_id.clone()),
        detail_line(strings.account_name_label, payment.account_name.clone()),
        detail_line(strings.description_label, payment.description.clone()),
        detail_line(strings.status_label, strings.status_pending.to_string()),
        Line::default(),
    ];

    lines.push(match verification.phase {
        VerificationPhase::Review => Line::from(vec![
            Span::styled(" Enter ", Style::default().bg(Color::Green).fg(Color::Black)),
            Span::raw(format!(" {}   ", strings.complete_label)),
            Span::styled(" Esc ", Style::default().bg(Color::DarkGray).fg(Color::White)),
            Span::raw(format!(" {}", strings.cancel_label)),
        ]),
        VerificationPhase::Processing => Line::from(Span::styled(
            format!("{}...", strings.processing),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )),
        VerificationPhase::Success => Line::from(Span::styled(
            strings.success,
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )),
    });

    let screen = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    frame.render_widget(screen, popup_area);
}
