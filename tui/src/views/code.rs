//! Source listings.

use limelight_core::CodePayload;
use ratatui::style::Style;
use ratatui::text::{Line, Span};

use crate::theme::Theme;

/// Handler for `code` messages.
#[derive(Clone, Debug, PartialEq)]
pub struct CodeView {
    payload: CodePayload,
}

impl CodeView {
    /// Wrap a payload.
    pub fn new(payload: CodePayload) -> Self {
        Self { payload }
    }

    fn title(&self) -> Option<String> {
        match (&self.payload.title, &self.payload.language) {
            (Some(title), Some(lang)) => Some(format!("{title} ({lang})")),
            (Some(title), None) => Some(title.clone()),
            (None, Some(lang)) => Some(lang.clone()),
            (None, None) => None,
        }
    }

    /// Render the bordered listing. Lines are shown verbatim, truncated to
    /// width - code is never re-wrapped.
    pub fn render_lines(&self, theme: &Theme, width: u16) -> Vec<Line<'static>> {
        let border = Style::default().fg(theme.colors.text_dim);
        let code_style = Style::default().fg(theme.colors.text);
        let inner = width.max(8) as usize - 4;

        let body: Vec<Line<'static>> = self
            .payload
            .content
            .lines()
            .map(|raw| {
                Line::from(Span::styled(super::truncate_to(raw, inner), code_style))
            })
            .collect();
        let body = if body.is_empty() {
            vec![Line::from(String::new())]
        } else {
            body
        };

        super::boxed(self.title().as_deref(), body, width, border, theme)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::line_text;
    use pretty_assertions::assert_eq;

    #[test]
    fn title_and_language_share_the_border() {
        let view = CodeView::new(CodePayload {
            title: Some("main.rs".into()),
            language: Some("rust".into()),
            content: "fn main() {}".into(),
        });
        let lines = view.render_lines(&Theme::charm_dark(), 40);
        assert!(line_text(&lines[0]).contains("main.rs (rust)"));
        assert_eq!(line_text(&lines[1]), format!("│ fn main() {{}}{} │", " ".repeat(24)));
    }

    #[test]
    fn long_lines_truncate_instead_of_wrapping() {
        let view = CodeView::new(CodePayload {
            title: None,
            language: None,
            content: "x".repeat(100),
        });
        let lines = view.render_lines(&Theme::charm_dark(), 30);
        assert_eq!(lines.len(), 3, "one border, one line, one border");
        assert!(line_text(&lines[1]).contains('…'));
    }
}
