//! Yes/no confirmation modal.

use limelight_core::ConfirmPayload;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use serde_json::json;

use crate::theme::Theme;
use crate::views::{KeyInput, KeyOutcome};

/// Which button holds focus.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Focus {
    Yes,
    No,
}

/// Handler for `confirm` requests.
#[derive(Clone, Debug, PartialEq)]
pub struct ConfirmView {
    payload: ConfirmPayload,
    focus: Focus,
}

impl ConfirmView {
    /// Wrap a payload; focus starts on the affirmative button.
    pub fn new(payload: ConfirmPayload) -> Self {
        Self {
            payload,
            focus: Focus::Yes,
        }
    }

    fn yes_label(&self) -> &str {
        self.payload.yes_label.as_deref().unwrap_or("Yes")
    }

    fn no_label(&self) -> &str {
        self.payload.no_label.as_deref().unwrap_or("No")
    }

    fn reply(confirmed: bool) -> KeyOutcome {
        KeyOutcome::Reply(json!({ "confirmed": confirmed }))
    }

    /// The reply produced when the interaction is torn down without an
    /// answer (superseded by a newer request).
    pub fn cancel_reply(&self) -> serde_json::Value {
        json!({ "confirmed": false })
    }

    /// Advance the focus machine.
    pub fn handle_key(&mut self, key: KeyInput) -> KeyOutcome {
        match key {
            KeyInput::Left | KeyInput::Right | KeyInput::Tab | KeyInput::BackTab => {
                self.focus = match self.focus {
                    Focus::Yes => Focus::No,
                    Focus::No => Focus::Yes,
                };
                KeyOutcome::Consumed
            }
            KeyInput::Char('y') | KeyInput::Char('Y') => Self::reply(true),
            KeyInput::Char('n') | KeyInput::Char('N') => Self::reply(false),
            KeyInput::Enter => Self::reply(self.focus == Focus::Yes),
            KeyInput::Esc => Self::reply(false),
            _ => KeyOutcome::Ignored,
        }
    }

    /// Render the bordered question with its two buttons.
    pub fn render_lines(&self, theme: &Theme, width: u16) -> Vec<Line<'static>> {
        let border = Style::default().fg(theme.colors.primary);
        let text = Style::default().fg(theme.colors.text);
        let inner = width.max(16) as usize - 4;

        let mut body = Vec::new();
        for wrapped in textwrap::wrap(&self.payload.message, inner) {
            body.push(Line::from(Span::styled(wrapped.into_owned(), text)));
        }
        body.push(Line::from(String::new()));

        let focused = Style::default()
            .fg(theme.colors.background)
            .bg(theme.colors.primary)
            .add_modifier(Modifier::BOLD);
        let blurred = Style::default().fg(theme.colors.text_muted);
        let (yes_style, no_style) = match self.focus {
            Focus::Yes => (focused, blurred),
            Focus::No => (blurred, focused),
        };
        body.push(Line::from(vec![
            Span::styled(format!("[ {} ]", self.yes_label()), yes_style),
            Span::raw("  ".to_string()),
            Span::styled(format!("[ {} ]", self.no_label()), no_style),
        ]));

        super::boxed(None, body, width, border, theme)
    }
}
