use ledger::{EntryBuilder, Money};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use crate::{
    app::{AppState, FormField, FormState},
    ui::theme::Theme,
};

const LABEL_WIDTH: usize = 10;

/// Calculates a centered rect for the form box
fn centered_box(width: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(height.min(area.height)),
            Constraint::Min(0),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(width.min(area.width)),
            Constraint::Min(0),
        ])
        .split(vertical[1]);

    horizontal[1]
}

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState) {
    let theme = Theme::default();
    let form = &state.form;

    let mut lines = vec![
        field_line("Date", &form.form.date, form, FormField::Date, &theme),
        field_line("Client", &form.form.client, form, FormField::Client, &theme),
        field_line("Total", &form.form.total, form, FormField::Total, &theme),
        field_line("Deposit", &form.form.deposit, form, FormField::Deposit, &theme),
        Line::from(Span::styled(
            "Sessions",
            Style::default().fg(theme.text_muted),
        )),
    ];
    if form.form.sessions.is_empty() {
        lines.push(Line::from(Span::styled(
            "  none, Ctrl+N adds one",
            Style::default().fg(theme.text_muted),
        )));
    }
    for (index, row) in form.form.sessions.iter().enumerate() {
        let mut spans = vec![Span::raw(format!("  #{:<2} ", index + 1))];
        spans.extend(input_spans(
            &row.date,
            form.focus == FormField::SessionDate(index),
            &theme,
        ));
        spans.push(Span::raw("  $ "));
        spans.extend(input_spans(
            &row.amount,
            form.focus == FormField::SessionAmount(index),
            &theme,
        ));
        lines.push(Line::from(spans));
    }
    lines.push(field_line("Receipt", &form.receipt, form, FormField::Receipt, &theme));
    lines.push(Line::raw(""));
    lines.push(preview_line(form, &theme));

    let height = lines.len() as u16 + 2;
    let card_area = centered_box(60, height, area);
    frame.render_widget(Clear, card_area);

    let title = if form.pending {
        " new entry (reading receipt…) "
    } else {
        " new entry "
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.accent));

    frame.render_widget(Paragraph::new(lines).block(block), card_area);
}

fn field_line(
    label: &str,
    value: &str,
    form: &FormState,
    field: FormField,
    theme: &Theme,
) -> Line<'static> {
    let mut spans = vec![Span::styled(
        format!("{label:<LABEL_WIDTH$}"),
        Style::default().fg(theme.text_muted),
    )];
    spans.extend(input_spans(value, form.focus == field, theme));
    Line::from(spans)
}

/// Value plus cursor; teal when focused.
fn input_spans(value: &str, focused: bool, theme: &Theme) -> Vec<Span<'static>> {
    if focused {
        vec![Span::styled(
            format!("{value}│"),
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        )]
    } else if value.is_empty() {
        vec![Span::styled("-", Style::default().fg(theme.text_muted))]
    } else {
        vec![Span::styled(value.to_string(), Style::default().fg(theme.text))]
    }
}

/// What would be saved right now, computed with the same rules as the save.
fn preview_line(form: &FormState, theme: &Theme) -> Line<'static> {
    let builder = EntryBuilder::new();
    let payments = builder.collect_payments(&form.form);
    let earned: Money = payments.iter().map(|payment| payment.amount).sum();
    let total = Money::coerce_non_negative(&form.form.total);
    Line::from(vec![
        Span::styled(
            format!("{:<LABEL_WIDTH$}", "Preview"),
            Style::default().fg(theme.text_muted),
        ),
        Span::styled(
            format!("Paid: {earned} / {total}  ({} payments)", payments.len()),
            Style::default().fg(theme.positive),
        ),
    ])
}
