pub mod components;
pub mod keymap;
pub mod screens;

mod terminal;
mod theme;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::app::AppState;

pub use terminal::{AppTerminal as Terminal, restore_terminal, setup_terminal};
use theme::Theme;

pub fn render(frame: &mut Frame<'_>, state: &AppState) {
    let theme = Theme::default();
    let area = frame.area();

    // Main layout: info bar, entries, bottom bar
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Info bar
            Constraint::Min(0),    // Entries
            Constraint::Length(1), // Bottom bar
        ])
        .split(area);

    render_info_bar(frame, layout[0], state, &theme);
    screens::entries::render(frame, layout[1], state);
    render_bottom_bar(frame, layout[2], state, &theme);

    if state.form.form.visible {
        screens::form::render(frame, layout[1], state);
    }
    components::toast::render(frame, area, state.toast.as_ref());
}

fn render_info_bar(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let mut line = vec![
        Span::styled("Data", Style::default().fg(theme.text_muted)),
        Span::raw(format!(": {}  ", state.data_dir)),
        Span::styled("Entries", Style::default().fg(theme.text_muted)),
        Span::raw(format!(": {}", state.entries.items.len())),
    ];
    if state.form.pending {
        line.push(Span::styled(
            "  reading receipt…",
            Style::default().fg(theme.warning),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(line)), area);
}

fn render_bottom_bar(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let hints = if state.form.form.visible {
        components::hints::FORM
    } else {
        components::hints::LIST
    };
    let bar = Paragraph::new(Line::from(components::hints::hints_to_spans(hints, theme)));
    frame.render_widget(bar, area);
}
