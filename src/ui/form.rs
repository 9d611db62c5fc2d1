//! Application form page

use super::components::{render_button, BUTTON_HEIGHT};
use super::field_renderer::{control_height, draw_field};
use super::ACCENT;
use crate::app::App;
use crate::state::forms::{FieldValue, Focus};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Width of the form column
const FORM_WIDTH: u16 = 72;

/// Draw header, fields and submit button
pub fn draw(frame: &mut Frame, area: Rect, app: &App) {
    let schema = app.store.schema();

    let column = Rect {
        x: area.x + area.width.saturating_sub(FORM_WIDTH) / 2,
        width: area.width.min(FORM_WIDTH),
        ..area
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Header
            Constraint::Min(0),    // Form
        ])
        .split(column);

    draw_header(frame, chunks[0], schema.title(), schema.intro());

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACCENT));
    let inner = block.inner(chunks[1]);
    frame.render_widget(block, chunks[1]);

    // One slot per field (control + error line), then the button
    let mut heights: Vec<u16> = schema
        .fields()
        .iter()
        .map(|field| control_height(field) + 1)
        .collect();
    heights.push(BUTTON_HEIGHT);

    let focus = app.store.focus();
    let focused_slot = match focus {
        Focus::Field(idx) => idx,
        Focus::Submit => schema.len(),
    };
    let window = SlotWindow::new(&heights, focused_slot, inner.height);

    let mut constraints = Vec::new();
    if window.can_scroll_up() {
        constraints.push(Constraint::Length(1)); // Up indicator
    }
    for height in &heights[window.first..window.first + window.count] {
        constraints.push(Constraint::Length(*height));
    }
    if window.can_scroll_down(heights.len()) {
        constraints.push(Constraint::Length(1)); // Down indicator
    }
    constraints.push(Constraint::Min(0));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .horizontal_margin(1)
        .split(inner);

    let mut chunk_idx = 0;
    if window.can_scroll_up() {
        draw_scroll_indicator(frame, chunks[chunk_idx], "^");
        chunk_idx += 1;
    }

    let empty = FieldValue::default();
    for slot in window.first..window.first + window.count {
        let area = chunks[chunk_idx];
        chunk_idx += 1;

        let Some(field) = schema.fields().get(slot) else {
            let sending = app.submission.in_progress();
            let label = if sending { "Sending..." } else { "Submit" };
            render_button(frame, area, label, ACCENT, focus == Focus::Submit, !sending);
            continue;
        };
        draw_field(
            frame,
            area,
            field,
            app.store.value(&field.name).unwrap_or(&empty),
            app.store.error(&field.name),
            focus == Focus::Field(slot),
            app.store.option_cursor(),
        );
    }

    if window.can_scroll_down(heights.len()) {
        draw_scroll_indicator(frame, chunks[chunk_idx], "v");
    }
}

/// Range of slots drawn when the form is taller than its area
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SlotWindow {
    first: usize,
    count: usize,
}

impl SlotWindow {
    /// Topmost window that still shows the focused slot
    fn new(heights: &[u16], focused: usize, available: u16) -> Self {
        let total: u16 = heights.iter().sum();
        if total <= available {
            return Self {
                first: 0,
                count: heights.len(),
            };
        }

        // Reserve rows for both scroll indicators
        let usable = available.saturating_sub(2);
        let focused = focused.min(heights.len().saturating_sub(1));

        let mut first = focused;
        let mut height = heights.get(focused).copied().unwrap_or(0);
        while first > 0 && height + heights[first - 1] <= usable {
            first -= 1;
            height += heights[first];
        }

        let mut used: u16 = 0;
        let mut count = 0;
        for slot_height in &heights[first..] {
            if used + slot_height > usable {
                break;
            }
            used += slot_height;
            count += 1;
        }

        Self {
            first,
            // Always show the focused slot, even if clipped
            count: count.max(focused - first + 1),
        }
    }

    fn can_scroll_up(&self) -> bool {
        self.first > 0
    }

    fn can_scroll_down(&self, total: usize) -> bool {
        self.first + self.count < total
    }
}

fn draw_scroll_indicator(frame: &mut Frame, area: Rect, symbol: &str) {
    let indicator = Paragraph::new(symbol)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(indicator, area);
}

fn draw_header(frame: &mut Frame, area: Rect, title: &str, intro: &str) {
    let header = Paragraph::new(vec![
        Line::from(Span::styled(
            title,
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(intro, Style::default().fg(Color::Gray))),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true });

    frame.render_widget(header, area);
}
