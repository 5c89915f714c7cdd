//! Multi-field form modal.
//!
//! Focus walks fields top to bottom, then Submit, then Cancel, wrapping in
//! both directions. Submitting validates required text fields; a violation
//! marks the offenders and moves focus to the first one instead of
//! replying. Cancelling always replies - the agent never hangs on a form.

use limelight_core::{FieldKind, FormField, FormPayload};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use serde_json::json;

use crate::theme::Theme;
use crate::views::{KeyInput, KeyOutcome};

/// Where form focus currently sits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Focus {
    Field(usize),
    Submit,
    Cancel,
}

/// Current value of one field.
#[derive(Clone, Debug, PartialEq)]
enum FieldValue {
    Text(String),
    Checked(bool),
}

impl FieldValue {
    fn initial(field: &FormField) -> Self {
        match field.kind {
            FieldKind::Text => Self::Text(
                field
                    .default
                    .as_ref()
                    .and_then(|v| v.as_str())
                    .unwrap_or("")
                    .to_string(),
            ),
            FieldKind::Checkbox => Self::Checked(
                field
                    .default
                    .as_ref()
                    .and_then(serde_json::Value::as_bool)
                    .unwrap_or(false),
            ),
        }
    }

    fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Text(s) => json!(s),
            Self::Checked(b) => json!(b),
        }
    }
}

/// Handler for `form` requests.
#[derive(Clone, Debug, PartialEq)]
pub struct FormView {
    payload: FormPayload,
    focus: Focus,
    values: Vec<FieldValue>,
    invalid: Vec<bool>,
}

impl FormView {
    /// Wrap a payload; focus starts on the first field (or Submit for an
    /// empty form) and defaults pre-populate the values.
    pub fn new(payload: FormPayload) -> Self {
        let values = payload.fields.iter().map(FieldValue::initial).collect();
        let invalid = vec![false; payload.fields.len()];
        let focus = if payload.fields.is_empty() {
            Focus::Submit
        } else {
            Focus::Field(0)
        };
        Self {
            payload,
            focus,
            values,
            invalid,
        }
    }

    /// The reply produced when the interaction is torn down without an
    /// answer.
    pub fn cancel_reply(&self) -> serde_json::Value {
        json!({ "values": {}, "cancelled": true })
    }

    fn focus_next(&mut self) {
        self.focus = match self.focus {
            Focus::Field(i) if i + 1 < self.payload.fields.len() => Focus::Field(i + 1),
            Focus::Field(_) => Focus::Submit,
            Focus::Submit => Focus::Cancel,
            Focus::Cancel => {
                if self.payload.fields.is_empty() {
                    Focus::Submit
                } else {
                    Focus::Field(0)
                }
            }
        };
    }

    fn focus_prev(&mut self) {
        self.focus = match self.focus {
            Focus::Field(0) => Focus::Cancel,
            Focus::Field(i) => Focus::Field(i - 1),
            Focus::Submit => {
                if self.payload.fields.is_empty() {
                    Focus::Cancel
                } else {
                    Focus::Field(self.payload.fields.len() - 1)
                }
            }
            Focus::Cancel => Focus::Submit,
        };
    }

    fn submit(&mut self) -> KeyOutcome {
        for (i, field) in self.payload.fields.iter().enumerate() {
            let empty = matches!(&self.values[i], FieldValue::Text(s) if s.trim().is_empty());
            self.invalid[i] = field.required && field.kind == FieldKind::Text && empty;
        }
        if let Some(first) = self.invalid.iter().position(|&bad| bad) {
            self.focus = Focus::Field(first);
            return KeyOutcome::Consumed;
        }

        let mut values = serde_json::Map::new();
        for (field, value) in self.payload.fields.iter().zip(&self.values) {
            values.insert(field.name.clone(), value.to_json());
        }
        KeyOutcome::Reply(json!({ "values": values, "cancelled": false }))
    }

    /// Advance the focus/edit machine.
    pub fn handle_key(&mut self, key: KeyInput) -> KeyOutcome {
        match key {
            KeyInput::Esc => return KeyOutcome::Reply(self.cancel_reply()),
            KeyInput::Tab | KeyInput::Down => {
                self.focus_next();
                return KeyOutcome::Consumed;
            }
            KeyInput::BackTab | KeyInput::Up => {
                self.focus_prev();
                return KeyOutcome::Consumed;
            }
            _ => {}
        }

        match self.focus {
            Focus::Field(i) => {
                let kind = self.payload.fields[i].kind;
                match (kind, key) {
                    (FieldKind::Text, KeyInput::Char(c)) => {
                        if let FieldValue::Text(buffer) = &mut self.values[i] {
                            buffer.push(c);
                            self.invalid[i] = false;
                        }
                        KeyOutcome::Consumed
                    }
                    (FieldKind::Text, KeyInput::Backspace) => {
                        if let FieldValue::Text(buffer) = &mut self.values[i] {
                            buffer.pop();
                        }
                        KeyOutcome::Consumed
                    }
                    (FieldKind::Checkbox, KeyInput::Char(' ')) => {
                        if let FieldValue::Checked(checked) = &mut self.values[i] {
                            *checked = !*checked;
                        }
                        KeyOutcome::Consumed
                    }
                    (_, KeyInput::Enter) => {
                        self.focus_next();
                        KeyOutcome::Consumed
                    }
                    _ => KeyOutcome::Ignored,
                }
            }
            Focus::Submit => match key {
                KeyInput::Enter => self.submit(),
                _ => KeyOutcome::Ignored,
            },
            Focus::Cancel => match key {
                KeyInput::Enter => KeyOutcome::Reply(self.cancel_reply()),
                _ => KeyOutcome::Ignored,
            },
        }
    }

    fn render_field(
        &self,
        i: usize,
        theme: &Theme,
        inner: usize,
        body: &mut Vec<Line<'static>>,
    ) {
        let field = &self.payload.fields[i];
        let focused = self.focus == Focus::Field(i);
        let marker_style = Style::default().fg(theme.colors.primary);
        let label_style = if focused {
            Style::default()
                .fg(theme.colors.text)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.colors.text)
        };

        match (&field.kind, &self.values[i]) {
            (FieldKind::Checkbox, FieldValue::Checked(checked)) => {
                let marker = if focused { "❯ " } else { "  " };
                let check = if *checked { "[x] " } else { "[ ] " };
                body.push(Line::from(vec![
                    Span::styled(marker.to_string(), marker_style),
                    Span::styled(format!("{check}{}", field.label), label_style),
                ]));
            }
            (_, value) => {
                let required = if field.required { " *" } else { "" };
                let mut label_spans = vec![
                    Span::styled(
                        if focused { "❯ " } else { "  " }.to_string(),
                        marker_style,
                    ),
                    Span::styled(format!("{}{required}", field.label), label_style),
                ];
                if self.invalid[i] {
                    label_spans.push(Span::styled(
                        "  (required)".to_string(),
                        Style::default().fg(theme.colors.error),
                    ));
                }
                body.push(Line::from(label_spans));

                let text = match value {
                    FieldValue::Text(s) => s.clone(),
                    FieldValue::Checked(_) => String::new(),
                };
                let entry = if text.is_empty() {
                    match &field.placeholder {
                        Some(placeholder) => Span::styled(
                            super::truncate_to(placeholder, inner.saturating_sub(4)),
                            Style::default().fg(theme.colors.text_dim),
                        ),
                        None => Span::raw(String::new()),
                    }
                } else {
                    Span::styled(
                        super::truncate_to(&text, inner.saturating_sub(4)),
                        Style::default().fg(theme.colors.text),
                    )
                };
                body.push(Line::from(vec![Span::raw("    ".to_string()), entry]));
            }
        }
    }

    /// Render the bordered form.
    pub fn render_lines(&self, theme: &Theme, width: u16) -> Vec<Line<'static>> {
        let border = Style::default().fg(theme.colors.primary);
        let inner = width.max(20) as usize - 4;

        let mut body = Vec::new();
        if let Some(description) = &self.payload.description {
            for wrapped in textwrap::wrap(description, inner) {
                body.push(Line::from(Span::styled(
                    wrapped.into_owned(),
                    Style::default().fg(theme.colors.text_muted),
                )));
            }
            body.push(Line::from(String::new()));
        }

        for i in 0..self.payload.fields.len() {
            self.render_field(i, theme, inner, &mut body);
        }
        body.push(Line::from(String::new()));

        let focused = Style::default()
            .fg(theme.colors.background)
            .bg(theme.colors.primary)
            .add_modifier(Modifier::BOLD);
        let blurred = Style::default().fg(theme.colors.text_muted);
        let submit_label = self.payload.submit_label.as_deref().unwrap_or("Submit");
        let cancel_label = self.payload.cancel_label.as_deref().unwrap_or("Cancel");
        body.push(Line::from(vec![
            Span::styled(
                format!("[ {submit_label} ]"),
                if self.focus == Focus::Submit { focused } else { blurred },
            ),
            Span::raw("  ".to_string()),
            Span::styled(
                format!("[ {cancel_label} ]"),
                if self.focus == Focus::Cancel { focused } else { blurred },
            ),
        ]));

        super::boxed(Some(&self.payload.title), body, width, border, theme)
    }
}
