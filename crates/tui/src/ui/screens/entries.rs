use ledger::EntryView;
use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use crate::{app::AppState, ui::theme::Theme};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState) {
    let theme = Theme::default();
    let items = &state.entries.items;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border))
        .title(format!(" Entries ({}) ", items.len()));

    if items.is_empty() {
        let empty = Paragraph::new(Line::from(Span::styled(
            "No entries yet. Press n to add one.",
            Style::default().fg(theme.text_muted),
        )))
        .alignment(Alignment::Center)
        .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let list_items = items
        .iter()
        .map(|view| ListItem::new(entry_lines(view, &theme)))
        .collect::<Vec<_>>();

    let mut list_state = ListState::default();
    list_state.select(Some(state.entries.selected));

    let list = List::new(list_items)
        .block(block)
        .highlight_style(
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("» ");

    frame.render_stateful_widget(list, area, &mut list_state);
}

fn entry_lines(view: &EntryView, theme: &Theme) -> Vec<Line<'static>> {
    let client = if view.client.is_empty() {
        "(no name)".to_string()
    } else {
        view.client.clone()
    };
    let paid_style = if view.total.is_positive() && view.earned >= view.total {
        Style::default().fg(theme.positive)
    } else {
        Style::default().fg(theme.text)
    };

    let mut detail = vec![
        Span::raw("  "),
        Span::styled(view.paid_label(), paid_style),
    ];
    if let Some(image) = &view.image {
        detail.push(Span::styled(
            format!("  [receipt {}]", approx_size(&image.src)),
            Style::default().fg(theme.warning),
        ));
    }

    vec![
        Line::from(vec![
            Span::styled(client, Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(format!("  {}", view.date), Style::default().fg(theme.text_muted)),
        ]),
        Line::from(detail),
    ]
}

/// Decoded size of a base64 `data:` URI, rounded for display.
fn approx_size(src: &str) -> String {
    let payload = src.split_once(',').map_or(src, |(_, data)| data);
    let bytes = payload.len() / 4 * 3;
    if bytes < 1024 {
        format!("{bytes} B")
    } else {
        format!("{} KB", bytes / 1024)
    }
}
