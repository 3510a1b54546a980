//! Text progress bars.

/// Total cells in a full bar.
pub const BAR_WIDTH: usize = 20;

/// Percentage covered by one cell.
const PERCENT_PER_CELL: f64 = 100.0 / BAR_WIDTH as f64;

const FILLED_GLYPH: char = '█';
const EMPTY_GLYPH: char = '░';

fn clamp_percent(percent: f64) -> f64 {
    if percent.is_nan() {
        0.0
    } else {
        percent.clamp(0.0, 100.0)
    }
}

/// Returns `(filled, empty)` cell counts for a percentage.
///
/// Both counts are floored independently, so for values that are not a
/// multiple of 5 the total is one cell short of [`BAR_WIDTH`].
pub fn bar_cells(percent: f64) -> (usize, usize) {
    let percent = clamp_percent(percent);
    let filled = (percent / PERCENT_PER_CELL).floor() as usize;
    let empty = ((100.0 - percent) / PERCENT_PER_CELL).floor() as usize;
    (filled, empty)
}

/// Renders a percentage as a bar of filled and empty cells.
pub fn render_bar(percent: f64) -> String {
    let (filled, empty) = bar_cells(percent);
    let mut bar = String::with_capacity((filled + empty) * FILLED_GLYPH.len_utf8());
    bar.extend(std::iter::repeat(FILLED_GLYPH).take(filled));
    bar.extend(std::iter::repeat(EMPTY_GLYPH).take(empty));
    bar
}

/// Renders a percentage rounded to two decimals, without the `%` sign.
pub fn render_percent(percent: f64) -> String {
    let rounded = (clamp_percent(percent) * 100.0).round() / 100.0;
    format!("{:.2}", rounded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cells_never_exceed_width() {
        let mut percent = 0.0;
        while percent <= 100.0 {
            let (filled, empty) = bar_cells(percent);
            assert!(filled + empty <= BAR_WIDTH, "overflow at {percent}");
            assert_eq!(filled, (percent / 5.0).floor() as usize, "filled at {percent}");
            percent += 0.25;
        }
    }

    #[test]
    fn test_multiples_of_five_fill_width() {
        for step in 0..=20 {
            let (filled, empty) = bar_cells(step as f64 * 5.0);
            assert_eq!(filled, step);
            assert_eq!(filled + empty, BAR_WIDTH);
        }
    }

    #[test]
    fn test_render_bar_glyphs() {
        assert_eq!(render_bar(0.0), "░".repeat(20));
        assert_eq!(render_bar(100.0), "█".repeat(20));
        assert_eq!(render_bar(50.0), format!("{}{}", "█".repeat(10), "░".repeat(10)));
        // 42% floors to 8 filled and 11 empty
        assert_eq!(render_bar(42.0), format!("{}{}", "█".repeat(8), "░".repeat(11)));
    }

    #[test]
    fn test_out_of_range_is_clamped() {
        assert_eq!(bar_cells(-10.0), (0, 20));
        assert_eq!(bar_cells(150.0), (20, 0));
        assert_eq!(bar_cells(f64::NAN), (0, 20));
    }

    #[test]
    fn test_render_percent() {
        assert_eq!(render_percent(42.0), "42.00");
        assert_eq!(render_percent(33.3333), "33.33");
        assert_eq!(render_percent(99.999), "100.00");
        assert_eq!(render_percent(0.0), "0.00");
    }
}
