//! Modal notice overlay

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

const MAX_WIDTH: u16 = 60;

/// Center a box of at most `width` x `height` inside `area`
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Rough row count of `text` wrapped at `width` columns
fn wrapped_rows(text: &str, width: u16) -> u16 {
    let width = width.max(1) as usize;
    text.lines()
        .map(|line| line.chars().count().div_ceil(width).max(1) as u16)
        .sum()
}

/// Render an error notice centered on the screen, dismissed with Enter or Esc
pub fn render_error_notice(frame: &mut Frame, message: &str) {
    let area = frame.area();
    let inner_width = MAX_WIDTH.min(area.width).saturating_sub(4);
    // title + blank + message + blank + hint + borders
    let height = wrapped_rows(message, inner_width) + 6;
    let dialog_area = centered(area, MAX_WIDTH, height);

    let key_style = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let content = vec![
        Line::from(Span::styled(
            "Error",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(message.to_string()),
        Line::from(""),
        Line::from(vec![
            Span::raw("Press "),
            Span::styled("Enter", key_style),
            Span::raw(" or "),
            Span::styled("Esc", key_style),
            Span::raw(" to dismiss"),
        ]),
    ];

    let dialog = Paragraph::new(content)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red))
                .style(Style::default().bg(Color::Black)),
        );

    frame.render_widget(Clear, dialog_area);
    frame.render_widget(dialog, dialog_area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_fits_inside_area() {
        let area = Rect::new(0, 0, 80, 24);
        let rect = centered(area, 60, 8);
        assert_eq!(rect, Rect::new(10, 8, 60, 8));
    }

    #[test]
    fn test_centered_clamps_to_small_area() {
        let area = Rect::new(0, 0, 30, 5);
        let rect = centered(area, 60, 8);
        assert_eq!(rect, Rect::new(0, 0, 30, 5));
    }

    #[test]
    fn test_wrapped_rows() {
        assert_eq!(wrapped_rows("short", 20), 1);
        assert_eq!(wrapped_rows(&"x".repeat(45), 20), 3);
        assert_eq!(wrapped_rows("a\nb", 20), 2);
    }
}
