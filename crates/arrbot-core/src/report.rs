//! Capped, chunked status reports.
//!
//! A report lists the work items whose names match a query, best progress
//! first, and is split into chunks that fit a single chat message.

use std::fmt::Write as _;

use crate::matcher::TitleMatcher;
use crate::model::WorkItem;
use crate::progress::{render_bar, render_percent};

/// Default maximum number of entries in one report.
pub const DEFAULT_MAX_ENTRIES: usize = 10;

/// Default maximum characters per chunk.
pub const DEFAULT_MAX_CHUNK_CHARS: usize = 4000;

/// Result of rendering a report.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportOutcome {
    /// No item matched the query.
    NoMatch,
    /// At least one item matched.
    Report(Report),
}

/// A rendered report.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    /// Number of rendered entries (at most the configured cap).
    pub entries: usize,
    /// Total number of matching items, including omitted ones.
    pub matched: usize,
    /// Message-sized chunks, in order.
    pub chunks: Vec<String>,
}

impl Report {
    /// Number of matching items left out by the cap.
    pub fn omitted(&self) -> usize {
        self.matched - self.entries
    }
}

/// Renders work items into report chunks.
#[derive(Debug, Clone)]
pub struct ReportFormatter {
    max_entries: usize,
    max_chunk_chars: usize,
}

impl Default for ReportFormatter {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            max_chunk_chars: DEFAULT_MAX_CHUNK_CHARS,
        }
    }
}

impl ReportFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the entry cap.
    pub fn with_max_entries(mut self, max: usize) -> Self {
        self.max_entries = max;
        self
    }

    /// Sets the chunk size limit. Values below 1 are treated as 1.
    pub fn with_max_chunk_chars(mut self, max: usize) -> Self {
        self.max_chunk_chars = max.max(1);
        self
    }

    /// Filters, orders, renders and chunks `items` for `query`.
    pub fn render(&self, query: &str, items: &[WorkItem]) -> ReportOutcome {
        let Some(matcher) = TitleMatcher::new(query) else {
            return ReportOutcome::NoMatch;
        };

        let mut matched: Vec<&WorkItem> = items.iter().filter(|i| matcher.is_match(&i.name)).collect();
        if matched.is_empty() {
            return ReportOutcome::NoMatch;
        }

        // Stable, so equal progress keeps fetch order.
        matched.sort_by(|a, b| b.progress.total_cmp(&a.progress));

        let mut buffer = String::new();
        let entries = matched.len().min(self.max_entries);
        for (index, item) in matched.iter().take(entries).enumerate() {
            render_entry(&mut buffer, index + 1, item);
        }

        ReportOutcome::Report(Report {
            entries,
            matched: matched.len(),
            chunks: split_chunks(&buffer, self.max_chunk_chars),
        })
    }
}

/// Appends one numbered entry.
pub fn render_entry(buffer: &mut String, ordinal: usize, item: &WorkItem) {
    let _ = write!(
        buffer,
        "\n{}) Name: {}\nStatus: {}\nProgress: {} - {}%\n\n",
        ordinal,
        item.name,
        item.status_label,
        render_bar(item.progress),
        render_percent(item.progress),
    );
}

/// Splits `buffer` into chunks of at most `max_chars` characters.
///
/// Whole lines (with their trailing newline) are packed greedily; a line that
/// alone exceeds the limit is cut on character boundaries. Concatenating the
/// chunks always gives back `buffer`.
pub fn split_chunks(buffer: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in buffer.split_inclusive('\n') {
        let line_len = line.chars().count();

        if current_len + line_len <= max_chars {
            current.push_str(line);
            current_len += line_len;
            continue;
        }

        if !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if line_len <= max_chars {
            current.push_str(line);
            current_len = line_len;
            continue;
        }

        // Oversized line: emit full pieces, keep the tail open for packing.
        let mut chars = line.chars().peekable();
        while chars.peek().is_some() {
            let piece: String = chars.by_ref().take(max_chars).collect();
            let piece_len = piece.chars().count();
            if piece_len == max_chars && chars.peek().is_some() {
                chunks.push(piece);
            } else {
                current = piece;
                current_len = piece_len;
            }
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names_in_order(report: &Report) -> Vec<String> {
        report
            .chunks
            .concat()
            .lines()
            .filter_map(|l| l.split_once(") Name: ").map(|(_, name)| name.to_string()))
            .collect()
    }

    #[test]
    fn test_entry_template() {
        let mut buffer = String::new();
        render_entry(&mut buffer, 1, &WorkItem::new("The Office", "downloading", 50.0));
        let bar = format!("{}{}", "█".repeat(10), "░".repeat(10));
        assert_eq!(
            buffer,
            format!("\n1) Name: The Office\nStatus: downloading\nProgress: {bar} - 50.00%\n\n")
        );
    }

    #[test]
    fn test_caps_at_ten_entries_in_descending_order() {
        let items: Vec<WorkItem> = (0..12)
            .map(|i| WorkItem::new(format!("Show {i}"), "downloading", i as f64 * 5.0))
            .collect();

        let ReportOutcome::Report(report) = ReportFormatter::new().render("show", &items) else {
            panic!("expected a report");
        };

        assert_eq!(report.entries, 10);
        assert_eq!(report.matched, 12);
        assert_eq!(report.omitted(), 2);
        let names = names_in_order(&report);
        assert_eq!(names.len(), 10);
        assert_eq!(names[0], "Show 11");
        assert_eq!(names[9], "Show 2");
    }

    #[test]
    fn test_ties_keep_input_order() {
        let items = vec![
            WorkItem::new("Show A", "queued", 10.0),
            WorkItem::new("Show B", "queued", 50.0),
            WorkItem::new("Show C", "queued", 10.0),
            WorkItem::new("Show D", "queued", 50.0),
        ];

        let ReportOutcome::Report(report) = ReportFormatter::new().render("show", &items) else {
            panic!("expected a report");
        };

        assert_eq!(names_in_order(&report), vec!["Show B", "Show D", "Show A", "Show C"]);
    }

    #[test]
    fn test_no_match_is_distinct() {
        let items = vec![WorkItem::new("Something Else", "seeding", 100.0)];
        assert_eq!(ReportFormatter::new().render("office", &items), ReportOutcome::NoMatch);
        assert_eq!(ReportFormatter::new().render("office", &[]), ReportOutcome::NoMatch);
        assert_eq!(ReportFormatter::new().render("  ", &items), ReportOutcome::NoMatch);
    }

    #[test]
    fn test_non_matching_items_are_filtered() {
        let items = vec![
            WorkItem::new("The.Office.S01", "downloading", 10.0),
            WorkItem::new("Parks and Rec", "downloading", 90.0),
        ];
        let ReportOutcome::Report(report) = ReportFormatter::new().render("the office", &items) else {
            panic!("expected a report");
        };
        assert_eq!(report.entries, 1);
        assert_eq!(names_in_order(&report), vec!["The.Office.S01"]);
    }

    #[test]
    fn test_split_8500_chars_into_three_chunks() {
        // 85 lines of 99 characters plus newline
        let line = format!("{}\n", "x".repeat(99));
        let buffer = line.repeat(85);
        assert_eq!(buffer.chars().count(), 8500);

        let chunks = split_chunks(&buffer, 4000);
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.chars().count() <= 4000));
        assert_eq!(chunks.concat(), buffer);
        assert!(chunks.iter().all(|c| c.ends_with('\n')));
    }

    #[test]
    fn test_split_oversized_line() {
        let buffer = format!("short\n{}\ntail\n", "y".repeat(25));
        let chunks = split_chunks(&buffer, 10);
        assert!(chunks.iter().all(|c| c.chars().count() <= 10));
        assert_eq!(chunks.concat(), buffer);
    }

    #[test]
    fn test_split_counts_characters_not_bytes() {
        let buffer = "█".repeat(30);
        let chunks = split_chunks(&buffer, 20);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].chars().count(), 20);
        assert_eq!(chunks.concat(), buffer);
    }

    #[test]
    fn test_split_empty_buffer() {
        assert!(split_chunks("", 4000).is_empty());
    }

    #[test]
    fn test_small_chunk_limit_splits_report() {
        let items: Vec<WorkItem> = (0..5)
            .map(|i| WorkItem::new(format!("Movie {i}"), "downloading", 20.0))
            .collect();
        let formatter = ReportFormatter::new().with_max_chunk_chars(120);
        let ReportOutcome::Report(report) = formatter.render("movie", &items) else {
            panic!("expected a report");
        };
        assert!(report.chunks.len() > 1);
        assert!(report.chunks.iter().all(|c| c.chars().count() <= 120));
    }
}
