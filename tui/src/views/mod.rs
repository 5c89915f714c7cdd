//! View Handlers
//!
//! One handler per UI primitive. Display handlers (text, markdown, alert,
//! progress, spinner, table, code) turn a payload into a render fragment
//! and are done. Interactive handlers (form, confirm, select, input) also
//! own a small focus state machine and produce exactly one reply when the
//! interaction completes - submitted or cancelled, the agent always gets
//! an answer.
//!
//! A render fragment is a list of styled lines, a pure function of
//! payload + theme + width. Interactive painting decides *where* and *how
//! much* of a fragment appears on screen; headless mode prints fragments
//! verbatim. That split is what makes headless output byte-identical to
//! the interactive render of the same message.

pub mod alert;
pub mod code;
pub mod confirm;
pub mod form;
pub mod input;
pub mod markdown;
pub mod progress;
pub mod select;
pub mod spinner;
pub mod table;
pub mod text;

pub use alert::AlertView;
pub use code::CodeView;
pub use confirm::ConfirmView;
pub use form::FormView;
pub use input::InputView;
pub use markdown::MarkdownView;
pub use progress::ProgressView;
pub use select::SelectView;
pub use spinner::SpinnerView;
pub use table::TableView;
pub use text::TextView;

use ratatui::style::Style;
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthStr;

use crate::theme::Theme;

/// Keyboard vocabulary the interactive views understand. The app maps
/// terminal events onto this so view logic stays testable without a
/// terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyInput {
    /// A printable character.
    Char(char),
    /// Submit / advance.
    Enter,
    /// Dismiss / cancel.
    Esc,
    /// Focus next.
    Tab,
    /// Focus previous.
    BackTab,
    /// Move up.
    Up,
    /// Move down.
    Down,
    /// Move left.
    Left,
    /// Move right.
    Right,
    /// Delete backwards.
    Backspace,
}

/// What an interactive view did with a key.
#[derive(Clone, Debug, PartialEq)]
pub enum KeyOutcome {
    /// The key meant nothing to this view.
    Ignored,
    /// The key changed internal state; no reply yet.
    Consumed,
    /// The interaction completed; this is the one reply payload.
    Reply(serde_json::Value),
}

/// Flatten a styled line to its plain text.
pub fn line_text(line: &Line<'_>) -> String {
    line.spans.iter().map(|s| s.content.as_ref()).collect()
}

/// Truncate to `width` display columns.
pub(crate) fn truncate_to(s: &str, width: usize) -> String {
    if s.width() <= width {
        return s.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in s.chars() {
        let w = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

/// Pad with spaces to exactly `width` display columns (truncating first if
/// needed).
pub(crate) fn pad_to(s: &str, width: usize) -> String {
    let s = if s.width() > width {
        truncate_to(s, width)
    } else {
        s.to_string()
    };
    let pad = width.saturating_sub(s.width());
    format!("{s}{}", " ".repeat(pad))
}

/// Wrap `body` in a rounded border, optionally titled. `width` is the
/// total fragment width; body lines must already fit `width - 4` columns
/// and are padded to fill.
pub(crate) fn boxed(
    title: Option<&str>,
    body: Vec<Line<'static>>,
    width: u16,
    border: Style,
    theme: &Theme,
) -> Vec<Line<'static>> {
    let width = width.max(8) as usize;
    let inner = width - 4;
    let mut lines = Vec::with_capacity(body.len() + 2);

    let top = match title {
        Some(title) => {
            let title = truncate_to(title, inner.saturating_sub(2));
            let fill = width.saturating_sub(title.width() + 5);
            Line::from(vec![
                Span::styled("╭─ ".to_string(), border),
                Span::styled(title, Style::default().fg(theme.colors.primary)),
                Span::styled(format!(" {}╮", "─".repeat(fill)), border),
            ])
        }
        None => Line::from(Span::styled(
            format!("╭{}╮", "─".repeat(width - 2)),
            border,
        )),
    };
    lines.push(top);

    for line in body {
        let text_width: usize = line.spans.iter().map(|s| s.content.width()).sum();
        let pad = inner.saturating_sub(text_width);
        let mut spans = vec![Span::styled("│ ".to_string(), border)];
        spans.extend(line.spans);
        spans.push(Span::raw(" ".repeat(pad)));
        spans.push(Span::styled(" │".to_string(), border));
        lines.push(Line::from(spans));
    }

    lines.push(Line::from(Span::styled(
        format!("╰{}╯", "─".repeat(width - 2)),
        border,
    )));
    lines
}
