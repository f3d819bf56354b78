use anyhow::Error;
use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Extract the most relevant error message from a chained error.
pub(crate) fn surface_error(err: &Error) -> String {
    err.chain()
        .last()
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}

/// Column for a cursor sitting `offset` characters into `area`, clamped to the
/// area's last column so arbitrarily long input never overflows.
pub(crate) fn cursor_column(area: Rect, offset: usize) -> u16 {
    let last = area.width.saturating_sub(1);
    let offset = u16::try_from(offset).unwrap_or(u16::MAX).min(last);
    area.x.saturating_add(offset)
}

/// Shorten `text` to `width` characters, marking the cut with `...`.
pub(crate) fn truncate_to_width(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    if width <= 3 {
        return text.chars().take(width).collect();
    }
    let mut shortened: String = text.chars().take(width - 3).collect();
    shortened.push_str("...");
    shortened
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Context};

    #[test]
    fn surface_error_prefers_root_cause() {
        let err = Err::<(), _>(anyhow!("disk full"))
            .context("failed to save trip")
            .unwrap_err();
        assert_eq!(surface_error(&err), "disk full");
    }

    #[test]
    fn cursor_column_clamps_to_area() {
        let area = Rect::new(2, 1, 10, 3);
        assert_eq!(cursor_column(area, 4), 6);
        assert_eq!(cursor_column(area, 10), 11);
        assert_eq!(cursor_column(area, 70_000), 11);
        assert_eq!(cursor_column(Rect::new(u16::MAX - 1, 0, 1, 1), usize::MAX), u16::MAX - 1);
    }

    #[test]
    fn truncate_marks_cut() {
        assert_eq!(truncate_to_width("Reykjavik", 20), "Reykjavik");
        assert_eq!(truncate_to_width("Reykjavik", 6), "Rey...");
        assert_eq!(truncate_to_width("Reykjavik", 2), "Re");
    }
}
