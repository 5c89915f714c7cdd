//! Single-line text prompt modal.

use limelight_core::InputPayload;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use serde_json::json;

use crate::theme::Theme;
use crate::views::{KeyInput, KeyOutcome};

/// Handler for `input` requests.
#[derive(Clone, Debug, PartialEq)]
pub struct InputView {
    payload: InputPayload,
    buffer: String,
}

impl InputView {
    /// Wrap a payload; the entry starts empty.
    pub fn new(payload: InputPayload) -> Self {
        Self {
            payload,
            buffer: String::new(),
        }
    }

    /// The reply produced when the interaction is torn down without an
    /// answer.
    pub fn cancel_reply(&self) -> serde_json::Value {
        json!({ "value": "", "cancelled": true })
    }

    /// Advance the editor.
    pub fn handle_key(&mut self, key: KeyInput) -> KeyOutcome {
        match key {
            KeyInput::Char(c) => {
                self.buffer.push(c);
                KeyOutcome::Consumed
            }
            KeyInput::Backspace => {
                self.buffer.pop();
                KeyOutcome::Consumed
            }
            KeyInput::Enter => KeyOutcome::Reply(json!({
                "value": self.buffer,
                "cancelled": false,
            })),
            KeyInput::Esc => KeyOutcome::Reply(self.cancel_reply()),
            _ => KeyOutcome::Ignored,
        }
    }

    /// Render prompt plus entry line.
    pub fn render_lines(&self, theme: &Theme, width: u16) -> Vec<Line<'static>> {
        let border = Style::default().fg(theme.colors.primary);
        let inner = width.max(16) as usize - 4;

        let mut body = vec![Line::from(Span::styled(
            super::truncate_to(&self.payload.prompt, inner),
            Style::default().fg(theme.colors.text),
        ))];

        let entry = if self.buffer.is_empty() {
            match &self.payload.placeholder {
                Some(placeholder) => Span::styled(
                    super::truncate_to(placeholder, inner.saturating_sub(2)),
                    Style::default().fg(theme.colors.text_dim),
                ),
                None => Span::raw(String::new()),
            }
        } else {
            let shown = if self.payload.secret {
                "•".repeat(self.buffer.chars().count())
            } else {
                self.buffer.clone()
            };
            Span::styled(
                super::truncate_to(&shown, inner.saturating_sub(2)),
                Style::default().fg(theme.colors.text),
            )
        };
        body.push(Line::from(vec![
            Span::styled("❯ ".to_string(), Style::default().fg(theme.colors.primary)),
            entry,
        ]));

        super::boxed(None, body, width, border, theme)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::line_text;
    use pretty_assertions::assert_eq;

    fn view(secret: bool) -> InputView {
        InputView::new(InputPayload {
            prompt: "Name?".into(),
            placeholder: Some("Ada".into()),
            secret,
        })
    }

    #[test]
    fn typing_then_enter_replies_with_the_buffer() {
        let mut v = view(false);
        for c in "Ada".chars() {
            assert_eq!(v.handle_key(KeyInput::Char(c)), KeyOutcome::Consumed);
        }
        assert_eq!(
            v.handle_key(KeyInput::Enter),
            KeyOutcome::Reply(json!({"value": "Ada", "cancelled": false}))
        );
    }

    #[test]
    fn backspace_edits_and_escape_cancels() {
        let mut v = view(false);
        v.handle_key(KeyInput::Char('A'));
        v.handle_key(KeyInput::Backspace);
        assert_eq!(
            v.handle_key(KeyInput::Esc),
            KeyOutcome::Reply(json!({"value": "", "cancelled": true}))
        );
    }

    #[test]
    fn placeholder_shows_while_empty() {
        let lines = view(false).render_lines(&Theme::charm_dark(), 30);
        assert!(line_text(&lines[2]).contains("Ada"));
    }

    #[test]
    fn secret_entry_renders_masked() {
        let mut v = view(true);
        for c in "hunter2".chars() {
            v.handle_key(KeyInput::Char(c));
        }
        let lines = v.render_lines(&Theme::charm_dark(), 40);
        let entry = line_text(&lines[2]);
        assert!(entry.contains("•••••••"));
        assert!(!entry.contains("hunter2"));
    }
}
