//! UI module for rendering the TUI

mod components;
mod field_renderer;
mod form;
mod status_bar;

use crate::app::App;
use components::render_error_notice;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::Color,
    Frame,
};

/// Brand color used for the title, frame and submit button
pub const ACCENT: Color = Color::Rgb(0xA6, 0x46, 0xA1);

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    form::draw(frame, chunks[0], app);
    status_bar::draw(frame, chunks[1], app);

    // Modal notice on top of everything
    if let Some(message) = &app.error_notice {
        render_error_notice(frame, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::MockEmailRelay;
    use crate::state::forms::FormSchema;
    use crate::state::RelayTarget;
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;

    fn create_app() -> App {
        App::new(
            FormSchema::profile(),
            Arc::new(MockEmailRelay::new()),
            RelayTarget {
                service_id: "service_test".to_string(),
                template_id: "template_test".to_string(),
            },
        )
    }

    fn render(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
        terminal.draw(|frame| draw(frame, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_draw_shows_title_fields_and_button() {
        let screen = render(&create_app());
        assert!(screen.contains("PraSaga Ambassadors Form"));
        assert!(screen.contains("First Name *"));
        assert!(screen.contains("Describe your experience here..."));
        assert!(screen.contains("Submit"));
    }

    #[test]
    fn test_draw_shows_field_errors() {
        let mut app = create_app();
        app.store.validate();
        let screen = render(&app);
        assert!(screen.contains("First name is required."));
        assert!(screen.contains("Experience is required."));
    }

    #[test]
    fn test_draw_shows_error_notice() {
        let mut app = create_app();
        app.error_notice = Some("Something broke".to_string());
        let screen = render(&app);
        assert!(screen.contains("Something broke"));
        assert!(screen.contains("to dismiss"));
    }
}
