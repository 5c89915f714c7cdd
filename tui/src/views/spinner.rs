//! Activity spinner.

use limelight_core::SpinnerPayload;
use ratatui::style::Style;
use ratatui::text::{Line, Span};

use crate::theme::Theme;

/// Braille spinner frames.
const FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Handler for `spinner` messages.
#[derive(Clone, Debug, PartialEq)]
pub struct SpinnerView {
    label: Option<String>,
    frame: usize,
}

impl SpinnerView {
    /// Wrap a payload.
    pub fn new(payload: SpinnerPayload) -> Self {
        Self {
            label: payload.label,
            frame: 0,
        }
    }

    /// Advance to the next frame. A spinner spins as long as it is on
    /// screen, so this always wants another tick.
    pub fn tick(&mut self) -> bool {
        self.frame = self.frame.wrapping_add(1);
        true
    }

    /// Render glyph plus label.
    pub fn render_lines(&self, theme: &Theme, _width: u16) -> Vec<Line<'static>> {
        let glyph = FRAMES[self.frame % FRAMES.len()];
        let mut spans = vec![Span::styled(
            glyph.to_string(),
            Style::default().fg(theme.colors.primary),
        )];
        if let Some(label) = &self.label {
            spans.push(Span::styled(
                format!(" {label}"),
                Style::default().fg(theme.colors.text_muted),
            ));
        }
        vec![Line::from(spans)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::line_text;
    use pretty_assertions::assert_eq;

    #[test]
    fn renders_glyph_and_label() {
        let view = SpinnerView::new(SpinnerPayload {
            label: Some("Thinking".into()),
        });
        let lines = view.render_lines(&Theme::charm_dark(), 40);
        assert_eq!(line_text(&lines[0]), "⠋ Thinking");
    }

    #[test]
    fn frames_cycle_on_tick() {
        let mut view = SpinnerView::new(SpinnerPayload { label: None });
        let first = line_text(&view.render_lines(&Theme::charm_dark(), 40)[0]);
        assert!(view.tick());
        let second = line_text(&view.render_lines(&Theme::charm_dark(), 40)[0]);
        assert_ne!(first, second);
        for _ in 0..FRAMES.len() - 1 {
            view.tick();
        }
        let wrapped = line_text(&view.render_lines(&Theme::charm_dark(), 40)[0]);
        assert_eq!(first, wrapped);
    }
}
