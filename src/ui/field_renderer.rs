//! Field rendering utilities for the form

use crate::state::forms::{FieldDefinition, FieldKind, FieldValue};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Rows used by a field's bordered control, excluding the error line
pub fn control_height(field: &FieldDefinition) -> u16 {
    match &field.kind {
        FieldKind::MultiLine => 5,
        FieldKind::SingleSelect { options } | FieldKind::MultiSelect { options, .. } => {
            options.len() as u16 + 2
        }
        FieldKind::Text | FieldKind::Email => 3,
    }
}

/// Draw a form field and, beneath it, its error message if any
pub fn draw_field(
    frame: &mut Frame,
    area: Rect,
    field: &FieldDefinition,
    value: &FieldValue,
    error: Option<&str>,
    is_active: bool,
    option_cursor: usize,
) {
    let control_area = Rect {
        height: area.height.saturating_sub(1),
        ..area
    };
    let error_area = Rect {
        y: area.y + control_area.height,
        height: area.height.min(1),
        ..area
    };

    let border_color = match (is_active, error.is_some()) {
        (true, _) => Color::Cyan,
        (false, true) => Color::Red,
        (false, false) => Color::DarkGray,
    };
    let label = if field.required {
        format!(" {} * ", field.label)
    } else {
        format!(" {} ", field.label)
    };
    let block = Block::default()
        .title(label)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    let inner_width = usize::from(control_area.width.saturating_sub(2));
    let content = if field.kind.is_choice() {
        choice_lines(field, value, is_active, option_cursor)
    } else {
        text_lines(field, value.as_text(), is_active, inner_width)
    };

    frame.render_widget(
        Paragraph::new(content)
            .wrap(Wrap { trim: false })
            .block(block),
        control_area,
    );

    if let Some(message) = error {
        frame.render_widget(
            Paragraph::new(Span::styled(
                format!(" {message}"),
                Style::default().fg(Color::Red),
            )),
            error_area,
        );
    }
}

/// End of `text` that fits in `width` columns, leaving one for the cursor
fn visible_tail(text: &str, width: usize) -> &str {
    let room = width.saturating_sub(1);
    let count = text.chars().count();
    if count <= room {
        return text;
    }
    text.char_indices()
        .nth(count - room)
        .map_or("", |(idx, _)| &text[idx..])
}

fn text_lines<'a>(
    field: &'a FieldDefinition,
    text: &'a str,
    is_active: bool,
    width: usize,
) -> Vec<Line<'a>> {
    let cursor = Span::styled(if is_active { "▌" } else { "" }, Style::default().fg(Color::Cyan));

    if text.is_empty() {
        return vec![Line::from(vec![
            cursor,
            Span::styled(
                field.placeholder.as_str(),
                Style::default().fg(Color::DarkGray),
            ),
        ])];
    }

    let style = if is_active {
        Style::default().fg(Color::White)
    } else {
        Style::default().fg(Color::Gray)
    };
    // Single-line controls have one row, so keep the end being typed in view
    let text = if field.kind.is_multiline() {
        text
    } else {
        visible_tail(text, width)
    };
    let mut lines: Vec<Line> = text
        .split('\n')
        .map(|l| Line::from(Span::styled(l, style)))
        .collect();
    if let Some(last) = lines.last_mut() {
        last.spans.push(cursor);
    }
    lines
}

fn choice_lines<'a>(
    field: &'a FieldDefinition,
    value: &FieldValue,
    is_active: bool,
    option_cursor: usize,
) -> Vec<Line<'a>> {
    let multi = field.kind.is_set();
    field
        .kind
        .options()
        .iter()
        .enumerate()
        .map(|(idx, option)| {
            let checked = match value {
                FieldValue::Choices(set) => set.contains(option),
                FieldValue::Text(selected) => selected == option,
            };
            let marker = match (multi, checked) {
                (true, true) => "[x]",
                (true, false) => "[ ]",
                (false, true) => "(•)",
                (false, false) => "( )",
            };
            let highlighted = is_active && idx == option_cursor;
            let style = if highlighted {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else if checked {
                Style::default().fg(Color::White)
            } else {
                Style::default().fg(Color::Gray)
            };
            Line::from(Span::styled(format!("{marker} {option}"), style))
        })
        .collect()
}
