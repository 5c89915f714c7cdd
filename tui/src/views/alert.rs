//! Level-colored alert callouts.

use limelight_core::{AlertLevel, AlertPayload};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::theme::Theme;

/// Handler for `alert` messages.
#[derive(Clone, Debug, PartialEq)]
pub struct AlertView {
    payload: AlertPayload,
}

impl AlertView {
    /// Wrap a payload.
    pub fn new(payload: AlertPayload) -> Self {
        Self { payload }
    }

    fn border_color(&self, theme: &Theme) -> Color {
        match self.payload.level {
            AlertLevel::Info => theme.colors.info,
            AlertLevel::Success => theme.colors.success,
            AlertLevel::Warning => theme.colors.warning,
            AlertLevel::Error => theme.colors.error,
        }
    }

    /// Render the bordered callout.
    pub fn render_lines(&self, theme: &Theme, width: u16) -> Vec<Line<'static>> {
        let border = Style::default().fg(self.border_color(theme));
        let text = Style::default().fg(theme.colors.text);
        let inner = width.max(8) as usize - 4;

        let mut body = Vec::new();
        for raw in self.payload.message.lines() {
            if raw.is_empty() {
                body.push(Line::from(String::new()));
                continue;
            }
            for wrapped in textwrap::wrap(raw, inner) {
                body.push(Line::from(Span::styled(wrapped.into_owned(), text)));
            }
        }

        super::boxed(self.payload.title.as_deref(), body, width, border, theme)
    }
}
