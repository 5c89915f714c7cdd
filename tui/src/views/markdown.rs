//! Lightweight markdown rendering.
//!
//! Covers what agents actually emit: headings, bullet lists, fenced code
//! blocks, and inline code spans. Anything fancier renders as plain text.

use limelight_core::MarkdownPayload;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use crate::theme::Theme;

/// Handler for `markdown` messages.
#[derive(Clone, Debug, PartialEq)]
pub struct MarkdownView {
    payload: MarkdownPayload,
}

impl MarkdownView {
    /// Wrap a payload.
    pub fn new(payload: MarkdownPayload) -> Self {
        Self { payload }
    }

    /// Render to `width` columns.
    pub fn render_lines(&self, theme: &Theme, width: u16) -> Vec<Line<'static>> {
        let width = width.max(10) as usize;
        let text_style = Style::default().fg(theme.colors.text);
        let heading_style = Style::default()
            .fg(theme.colors.primary)
            .add_modifier(Modifier::BOLD);
        let code_style = Style::default().fg(theme.colors.accent3);

        let mut lines = Vec::new();
        let mut in_fence = false;
        for raw in self.payload.content.lines() {
            if raw.trim_start().starts_with("```") {
                in_fence = !in_fence;
                continue;
            }
            if in_fence {
                lines.push(Line::from(Span::styled(
                    format!("  {}", super::truncate_to(raw, width.saturating_sub(2))),
                    code_style,
                )));
                continue;
            }
            if let Some(heading) = heading_text(raw) {
                lines.push(Line::from(Span::styled(heading, heading_style)));
                continue;
            }
            if let Some(item) = raw.trim_start().strip_prefix("- ").or_else(|| {
                raw.trim_start().strip_prefix("* ")
            }) {
                let mut spans = vec![Span::styled(
                    "  • ".to_string(),
                    Style::default().fg(theme.colors.secondary),
                )];
                spans.extend(inline_spans(item, text_style, code_style));
                lines.push(Line::from(spans));
                continue;
            }
            if raw.is_empty() {
                lines.push(Line::from(String::new()));
                continue;
            }
            if raw.contains('`') {
                lines.push(Line::from(inline_spans(raw, text_style, code_style)));
            } else {
                for wrapped in textwrap::wrap(raw, width) {
                    lines.push(Line::from(Span::styled(wrapped.into_owned(), text_style)));
                }
            }
        }
        if lines.is_empty() {
            lines.push(Line::from(String::new()));
        }
        lines
    }
}

/// Strip heading markers, returning the heading text if the line is one.
fn heading_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim_start();
    for marker in ["### ", "## ", "# "] {
        if let Some(rest) = trimmed.strip_prefix(marker) {
            return Some(rest.to_string());
        }
    }
    None
}

/// Split a line on backticks, alternating text and inline-code styling.
fn inline_spans(raw: &str, text: Style, code: Style) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    for (i, piece) in raw.split('`').enumerate() {
        if piece.is_empty() {
            continue;
        }
        let style = if i % 2 == 1 { code } else { text };
        spans.push(Span::styled(piece.to_string(), style));
    }
    if spans.is_empty() {
        spans.push(Span::styled(String::new(), text));
    }
    spans
}
