//! Button component for TUI

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Button height in rows (top border + content + bottom border)
pub const BUTTON_HEIGHT: u16 = 3;

/// Render a bordered, centered button
///
/// A disabled button keeps its selection border but greys out its label.
pub fn render_button(
    frame: &mut Frame,
    area: Rect,
    content: &str,
    accent: Color,
    is_selected: bool,
    is_enabled: bool,
) {
    let border_style = if is_selected {
        Style::default().fg(accent)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let text_style = match (is_enabled, is_selected) {
        (false, _) => Style::default().fg(Color::DarkGray),
        (true, true) => Style::default()
            .fg(Color::White)
            .bg(accent)
            .add_modifier(Modifier::BOLD),
        (true, false) => Style::default().fg(accent),
    };

    let paragraph = Paragraph::new(format!(" {content} "))
        .alignment(Alignment::Center)
        .style(text_style);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style);

    frame.render_widget(paragraph.block(block), area);
}
