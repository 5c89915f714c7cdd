//! Column-aligned data tables.

use limelight_core::TablePayload;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthStr;

use crate::theme::Theme;

/// Gap between columns, in spaces.
const COLUMN_GAP: usize = 2;

/// Handler for `table` messages.
#[derive(Clone, Debug, PartialEq)]
pub struct TableView {
    payload: TablePayload,
}

impl TableView {
    /// Wrap a payload.
    pub fn new(payload: TablePayload) -> Self {
        Self { payload }
    }

    /// Natural column widths: the widest of header and cells per column.
    fn column_widths(&self, inner: usize) -> Vec<usize> {
        let cols = self.payload.columns.len();
        let mut widths: Vec<usize> = self
            .payload
            .columns
            .iter()
            .map(|c| c.width())
            .collect();
        for row in &self.payload.rows {
            for (i, cell) in row.iter().take(cols).enumerate() {
                widths[i] = widths[i].max(cell.width());
            }
        }

        // Shrink the widest column until the row fits.
        let gaps = COLUMN_GAP * cols.saturating_sub(1);
        loop {
            let used: usize = widths.iter().sum::<usize>() + gaps;
            if used <= inner {
                break;
            }
            let Some(widest) = widths.iter_mut().max() else {
                break;
            };
            if *widest <= 4 {
                break;
            }
            *widest -= 1;
        }
        widths
    }

    fn format_row(cells: &[String], widths: &[usize]) -> String {
        let mut parts = Vec::with_capacity(widths.len());
        for (i, width) in widths.iter().enumerate() {
            let cell = cells.get(i).map(String::as_str).unwrap_or("");
            parts.push(super::pad_to(cell, *width));
        }
        parts.join(&" ".repeat(COLUMN_GAP)).trim_end().to_string()
    }

    /// Render the bordered table.
    pub fn render_lines(&self, theme: &Theme, width: u16) -> Vec<Line<'static>> {
        let border = Style::default().fg(theme.colors.text_dim);
        let header_style = Style::default()
            .fg(theme.colors.primary)
            .add_modifier(Modifier::BOLD);
        let row_style = Style::default().fg(theme.colors.text);

        let inner = width.max(12) as usize - 4;
        let widths = self.column_widths(inner);

        let mut body = Vec::new();
        body.push(Line::from(Span::styled(
            Self::format_row(&self.payload.columns, &widths),
            header_style,
        )));
        let rule_width: usize =
            widths.iter().sum::<usize>() + COLUMN_GAP * widths.len().saturating_sub(1);
        body.push(Line::from(Span::styled(
            "─".repeat(rule_width.min(inner)),
            border,
        )));
        for row in &self.payload.rows {
            body.push(Line::from(Span::styled(
                Self::format_row(row, &widths),
                row_style,
            )));
        }

        super::boxed(self.payload.title.as_deref(), body, width, border, theme)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::line_text;
    use pretty_assertions::assert_eq;

    fn sample() -> TableView {
        TableView::new(TablePayload {
            title: Some("People".into()),
            columns: vec!["Name".into(), "Role".into()],
            rows: vec![
                vec!["Ada".into(), "Engineer".into()],
                vec!["Grace".into(), "Admiral".into()],
            ],
        })
    }

    #[test]
    fn header_rule_and_rows_line_up() {
        let lines = sample().render_lines(&Theme::charm_dark(), 40);
        let texts: Vec<String> = lines.iter().map(line_text).collect();
        assert!(texts[0].contains("People"));
        assert!(texts[1].contains("Name   Role"));
        assert!(texts[2].starts_with("│ ─"));
        assert!(texts[3].contains("Ada    Engineer"));
        assert!(texts[4].contains("Grace  Admiral"));
    }

    #[test]
    fn short_rows_render_with_empty_cells() {
        let view = TableView::new(TablePayload {
            title: None,
            columns: vec!["A".into(), "B".into()],
            rows: vec![vec!["only".into()]],
        });
        let lines = view.render_lines(&Theme::charm_dark(), 30);
        assert!(line_text(&lines[3]).contains("only"));
    }

    #[test]
    fn wide_tables_shrink_to_fit() {
        let view = TableView::new(TablePayload {
            title: None,
            columns: vec!["Col".into()],
            rows: vec![vec!["x".repeat(100)]],
        });
        let lines = view.render_lines(&Theme::charm_dark(), 30);
        for line in &lines {
            assert!(
                line_text(line).width() <= 30,
                "{:?}",
                line_text(line)
            );
        }
    }
}
