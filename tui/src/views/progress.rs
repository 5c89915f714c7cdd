//! Progress bars, determinate and indeterminate.
//!
//! `current` is clamped to `[0, total]` before any ratio is computed; a
//! `total` of zero means the work is unbounded and renders as a bouncing
//! activity segment instead of a percentage, so there is no division by
//! zero anywhere in this handler.

use limelight_core::ProgressPayload;
use ratatui::style::Style;
use ratatui::text::{Line, Span};

use crate::animation::{Spring, SpringProfile};
use crate::theme::Theme;

/// Width of the bouncing segment in indeterminate mode.
const BOUNCE_SEGMENT: usize = 6;

/// Handler for `progress` messages.
#[derive(Clone, Debug, PartialEq)]
pub struct ProgressView {
    label: Option<String>,
    current: f64,
    total: f64,
    fill: Spring,
    phase: usize,
}

impl ProgressView {
    /// Wrap a payload. The first appearance shows its value immediately;
    /// later updates animate toward the new fill.
    pub fn new(payload: ProgressPayload) -> Self {
        let mut view = Self {
            label: payload.label,
            current: 0.0,
            total: 0.0,
            fill: Spring::new(SpringProfile::Default),
            phase: 0,
        };
        view.current = clamp_current(payload.current, payload.total);
        view.total = payload.total;
        view.fill.set_current(view.ratio());
        view
    }

    /// The label, which keys replacement of an earlier bar.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Apply an update for the same label: the fill animates to the new
    /// ratio.
    pub fn update(&mut self, payload: ProgressPayload) {
        self.current = clamp_current(payload.current, payload.total);
        self.total = payload.total;
        self.fill.set_target(self.ratio());
    }

    /// Whether this bar has no bounded total.
    pub fn is_indeterminate(&self) -> bool {
        self.total <= 0.0
    }

    /// Whether the fill is mid-animation.
    pub fn is_animating(&self) -> bool {
        self.fill.is_active()
    }

    fn ratio(&self) -> f64 {
        if self.is_indeterminate() {
            0.0
        } else {
            self.current / self.total
        }
    }

    /// Advance animations one tick. Returns true while more ticks are
    /// wanted.
    pub fn tick(&mut self) -> bool {
        if self.is_indeterminate() {
            self.phase = self.phase.wrapping_add(1);
            return true;
        }
        self.fill.tick()
    }

    /// Render label plus bar.
    pub fn render_lines(&self, theme: &Theme, width: u16) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        if let Some(label) = &self.label {
            lines.push(Line::from(Span::styled(
                label.clone(),
                Style::default().fg(theme.colors.text_muted),
            )));
        }

        let bar_width = (width.max(16) as usize).saturating_sub(8).max(4);
        let bar_style = Style::default().fg(theme.colors.primary);
        let rest_style = Style::default().fg(theme.colors.text_dim);

        if self.is_indeterminate() {
            let span = bar_width.saturating_sub(BOUNCE_SEGMENT).max(1);
            let cycle = self.phase % (2 * span);
            let offset = if cycle < span { cycle } else { 2 * span - cycle };
            let mut spans = vec![Span::raw("[".to_string())];
            spans.push(Span::styled("░".repeat(offset), rest_style));
            spans.push(Span::styled("█".repeat(BOUNCE_SEGMENT), bar_style));
            spans.push(Span::styled(
                "░".repeat(bar_width.saturating_sub(offset + BOUNCE_SEGMENT)),
                rest_style,
            ));
            spans.push(Span::raw("] ···".to_string()));
            lines.push(Line::from(spans));
            return lines;
        }

        let shown = self.fill.value().clamp(0.0, 1.0);
        let filled = (shown * bar_width as f64).round() as usize;
        let filled = filled.min(bar_width);
        let percent = (self.ratio() * 100.0).round() as u32;

        let done = self.ratio() >= 1.0;
        let fill_style = if done {
            Style::default().fg(theme.colors.success)
        } else {
            bar_style
        };
        lines.push(Line::from(vec![
            Span::raw("[".to_string()),
            Span::styled("█".repeat(filled), fill_style),
            Span::styled("░".repeat(bar_width - filled), rest_style),
            Span::raw(format!("] {percent:>3}%")),
        ]));
        lines
    }
}

/// Clamp `current` into `[0, total]`; indeterminate bars keep 0.
fn clamp_current(current: f64, total: f64) -> f64 {
    if total <= 0.0 {
        0.0
    } else {
        current.clamp(0.0, total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::line_text;
    use limelight_core::ProgressPayload;
    use pretty_assertions::assert_eq;

    fn payload(current: f64, total: f64) -> ProgressPayload {
        ProgressPayload {
            label: Some("sync".into()),
            current,
            total,
        }
    }

    #[test]
    fn zero_total_is_indeterminate_not_a_division() {
        let view = ProgressView::new(payload(5.0, 0.0));
        assert!(view.is_indeterminate());
        let lines = view.render_lines(&Theme::charm_dark(), 40);
        let bar = line_text(&lines[1]);
        assert!(bar.ends_with("···"));
        assert!(!bar.contains('%'));
    }

    #[test]
    fn overshoot_clamps_to_one_hundred_percent() {
        let view = ProgressView::new(payload(15.0, 10.0));
        let lines = view.render_lines(&Theme::charm_dark(), 40);
        let bar = line_text(&lines[1]);
        assert!(bar.contains("100%"), "{bar}");
        assert!(!bar.contains('░'), "bar should be full: {bar}");
    }

    #[test]
    fn negative_current_clamps_to_zero() {
        let view = ProgressView::new(payload(-3.0, 10.0));
        let lines = view.render_lines(&Theme::charm_dark(), 40);
        assert!(line_text(&lines[1]).contains("  0%"));
    }

    #[test]
    fn first_appearance_is_immediate_updates_animate() {
        let mut view = ProgressView::new(payload(5.0, 10.0));
        assert!(!view.tick(), "fresh bar should not be animating");

        view.update(payload(10.0, 10.0));
        assert!(view.tick(), "update should animate toward the new fill");
        while view.tick() {}
        let lines = view.render_lines(&Theme::charm_dark(), 40);
        assert!(line_text(&lines[1]).contains("100%"));
    }

    #[test]
    fn indeterminate_bar_keeps_requesting_ticks() {
        let mut view = ProgressView::new(payload(0.0, 0.0));
        for _ in 0..200 {
            assert!(view.tick());
        }
    }

    #[test]
    fn percent_reflects_target_not_animation() {
        let mut view = ProgressView::new(payload(0.0, 10.0));
        view.update(payload(7.0, 10.0));
        let lines = view.render_lines(&Theme::charm_dark(), 40);
        assert!(line_text(&lines[1]).contains("70%"));
    }
}
