//! Screen layout for the registry

use ratatui::prelude::*;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::ProgressEntry;

/// Width of the right-aligned status column.
pub const STATUS_WIDTH: usize = 15;

/// One formatted display row plus the screen column where the error begins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RowText {
    pub text: String,
    pub error_start: usize,
}

/// Status right-aligned to [`STATUS_WIDTH`] columns, then name and error.
/// Widths are display columns, so wide characters count double.
pub(crate) fn format_row(status: &str, name: &str, error: &str) -> RowText {
    let pad = STATUS_WIDTH.saturating_sub(status.width());
    let text = format!("{}{} {} {}", " ".repeat(pad), status, name, error);
    let error_start = text.width().saturating_sub(error.width());
    RowText { text, error_start }
}

/// Split before the first char that starts at or after column `col`.
fn split_at_column(s: &str, col: usize) -> (&str, &str) {
    let mut width = 0;
    for (idx, c) in s.char_indices() {
        if width >= col {
            return s.split_at(idx);
        }
        width += c.width().unwrap_or(0);
    }
    (s, "")
}

impl RowText {
    /// Status in white, name in the default color, error in bold red.
    pub fn to_line(&self) -> Line<'_> {
        let (status, rest) = split_at_column(&self.text, STATUS_WIDTH);
        let name_width = self.error_start.saturating_sub(status.width());
        let (name, error) = split_at_column(rest, name_width);
        Line::from(vec![
            Span::styled(status, Style::default().fg(Color::White)),
            Span::raw(name),
            Span::styled(error, Style::default().fg(Color::Red).bold()),
        ])
    }
}

fn row_area(area: Rect, y: u16) -> Rect {
    Rect {
        x: area.x,
        y: area.y + y,
        width: area.width,
        height: 1,
    }
}

/// Paint the header and as many entries as fit, newest first.
pub(crate) fn draw(frame: &mut Frame, header: &str, entries: &mut [ProgressEntry]) {
    let area = frame.area();
    if area.height == 0 {
        return;
    }

    frame.render_widget(
        Line::styled(header, Style::default().fg(Color::White)),
        row_area(area, 0),
    );

    let rows = usize::from(area.height - 1);
    for (i, entry) in entries.iter_mut().rev().take(rows).enumerate() {
        let error = entry
            .error()
            .map(|e| e.to_string().replace('\n', " "))
            .unwrap_or_default();
        let row = format_row(&entry.status(), entry.name(), &error);
        // i < rows <= u16::MAX
        frame.render_widget(row.to_line(), row_area(area, i as u16 + 1));
    }
}
