//! Option picker modal, single or multi choice.

use limelight_core::SelectPayload;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use serde_json::json;

use crate::theme::Theme;
use crate::views::{KeyInput, KeyOutcome};

/// Handler for `select` requests.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectView {
    payload: SelectPayload,
    cursor: usize,
    marked: Vec<bool>,
}

impl SelectView {
    /// Wrap a payload; the cursor starts on the first option.
    pub fn new(payload: SelectPayload) -> Self {
        let marked = vec![false; payload.options.len()];
        Self {
            payload,
            cursor: 0,
            marked,
        }
    }

    /// The reply produced when the interaction is torn down without an
    /// answer.
    pub fn cancel_reply(&self) -> serde_json::Value {
        json!({ "selected": [], "cancelled": true })
    }

    fn submit(&self) -> KeyOutcome {
        if self.payload.options.is_empty() {
            return KeyOutcome::Reply(self.cancel_reply());
        }
        let selected: Vec<&str> = if self.payload.multi {
            self.payload
                .options
                .iter()
                .zip(&self.marked)
                .filter(|(_, marked)| **marked)
                .map(|(opt, _)| opt.value.as_str())
                .collect()
        } else {
            vec![self.payload.options[self.cursor].value.as_str()]
        };
        KeyOutcome::Reply(json!({ "selected": selected, "cancelled": false }))
    }

    /// Advance the picker.
    pub fn handle_key(&mut self, key: KeyInput) -> KeyOutcome {
        let count = self.payload.options.len();
        match key {
            KeyInput::Up => {
                if count > 0 {
                    self.cursor = self.cursor.checked_sub(1).unwrap_or(count - 1);
                }
                KeyOutcome::Consumed
            }
            KeyInput::Down | KeyInput::Tab => {
                if count > 0 {
                    self.cursor = (self.cursor + 1) % count;
                }
                KeyOutcome::Consumed
            }
            KeyInput::Char(' ') if self.payload.multi => {
                if let Some(mark) = self.marked.get_mut(self.cursor) {
                    *mark = !*mark;
                }
                KeyOutcome::Consumed
            }
            KeyInput::Enter => self.submit(),
            KeyInput::Esc => KeyOutcome::Reply(self.cancel_reply()),
            _ => KeyOutcome::Ignored,
        }
    }

    /// Render the bordered option list.
    pub fn render_lines(&self, theme: &Theme, width: u16) -> Vec<Line<'static>> {
        let border = Style::default().fg(theme.colors.primary);
        let inner = width.max(16) as usize - 4;

        let mut body = Vec::new();
        for (i, option) in self.payload.options.iter().enumerate() {
            let here = i == self.cursor;
            let cursor = if here { "❯ " } else { "  " };
            let mark = if self.payload.multi {
                if self.marked[i] {
                    "[x] "
                } else {
                    "[ ] "
                }
            } else {
                ""
            };
            let style = if here {
                Style::default()
                    .fg(theme.colors.primary)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.colors.text)
            };
            body.push(Line::from(vec![
                Span::styled(cursor.to_string(), Style::default().fg(theme.colors.primary)),
                Span::styled(
                    format!(
                        "{mark}{}",
                        super::truncate_to(&option.label, inner.saturating_sub(6))
                    ),
                    style,
                ),
            ]));
        }
        if body.is_empty() {
            body.push(Line::from(Span::styled(
                "(no options)".to_string(),
                Style::default().fg(theme.colors.text_dim),
            )));
        }

        super::boxed(self.payload.title.as_deref(), body, width, border, theme)
    }
}
