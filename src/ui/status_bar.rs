//! Status bar with key hints and submission state

use crate::app::App;
use crate::state::forms::{FieldKind, Focus};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Keyboard hints for whatever has focus
fn focus_hints(app: &App) -> &'static str {
    match (app.store.focus(), app.store.focused_field().map(|f| &f.kind)) {
        (Focus::Submit, _) => "Tab:next  Enter:submit  Esc:quit",
        (_, Some(FieldKind::MultiSelect { .. })) => "Up/Down:move  Space:toggle  Tab:next  ^S:submit",
        (_, Some(FieldKind::SingleSelect { .. })) => "Up/Down:move  Space:select  Tab:next  ^S:submit",
        (_, Some(FieldKind::MultiLine)) => "Enter:newline  Tab:next  ^S:submit  Esc:quit",
        _ => "Tab:next  Shift+Tab:prev  ^S:submit  Esc:quit",
    }
}

pub fn draw(frame: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![];

    let indicator = if app.submission.in_progress() {
        Span::styled(" ◌ ", Style::default().fg(Color::Yellow))
    } else {
        Span::styled(" ● ", Style::default().fg(Color::Green))
    };
    spans.push(indicator);
    spans.push(Span::styled(
        focus_hints(app),
        Style::default().fg(Color::Gray),
    ));

    if let Some(msg) = &app.status_message {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(msg, Style::default().fg(Color::White)));
    }

    if let Some(finished_at) = app.submission.state().finished_at {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(
            format!("last attempt {}", finished_at.format("%H:%M:%S")),
            Style::default().fg(Color::Gray),
        ));
    }

    let status = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(status, area);
}
