//! Plain text paragraphs.

use limelight_core::TextPayload;
use ratatui::style::Style;
use ratatui::text::{Line, Span};

use crate::theme::Theme;

/// Handler for `text` messages.
#[derive(Clone, Debug, PartialEq)]
pub struct TextView {
    payload: TextPayload,
}

impl TextView {
    /// Wrap a payload.
    pub fn new(payload: TextPayload) -> Self {
        Self { payload }
    }

    /// Render the paragraph wrapped to `width`.
    pub fn render_lines(&self, theme: &Theme, width: u16) -> Vec<Line<'static>> {
        let style = Style::default().fg(theme.colors.text);
        let width = width.max(10) as usize;
        let mut lines = Vec::new();
        for raw in self.payload.content.lines() {
            if raw.is_empty() {
                lines.push(Line::from(String::new()));
                continue;
            }
            for wrapped in textwrap::wrap(raw, width) {
                lines.push(Line::from(Span::styled(wrapped.into_owned(), style)));
            }
        }
        if lines.is_empty() {
            lines.push(Line::from(String::new()));
        }
        lines
    }
}
