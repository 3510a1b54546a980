//! Boundary-anchored title matching for free-text queries.
//!
//! Query words are matched literally, case-insensitively, and may be
//! separated in the title by any run of whitespace, dots, underscores or
//! hyphens. So `the office` finds `The.Office.S01E01` and `the_office`, but
//! not `theofficetv`, because the match must start and end on word
//! boundaries.

use regex::{Regex, RegexBuilder};

/// Separator class allowed between query words.
const SEPARATOR_CLASS: &str = r"[\s._-]*";

/// A compiled query.
#[derive(Debug, Clone)]
pub struct TitleMatcher {
    pattern: Regex,
}

impl TitleMatcher {
    /// Compiles a query.
    ///
    /// Returns `None` for an empty or all-whitespace query, which matches
    /// nothing.
    pub fn new(query: &str) -> Option<Self> {
        let words: Vec<String> = query.split_whitespace().map(regex::escape).collect();
        if words.is_empty() {
            return None;
        }

        let source = format!(r"\b{}\b", words.join(SEPARATOR_CLASS));
        // Escaped input always yields a valid pattern; a failure here would
        // only come from the size limit on absurdly long queries.
        let pattern = RegexBuilder::new(&source)
            .case_insensitive(true)
            .build()
            .ok()?;

        Some(Self { pattern })
    }

    /// Returns true if the candidate title matches this query.
    pub fn is_match(&self, candidate: &str) -> bool {
        self.pattern.is_match(candidate)
    }
}

/// Returns true if `candidate` matches `query`.
///
/// Convenience wrapper that compiles the query on every call; use
/// [`TitleMatcher`] when testing many candidates.
pub fn matches(query: &str, candidate: &str) -> bool {
    TitleMatcher::new(query).is_some_and(|m| m.is_match(candidate))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_separator_variants() {
        assert!(matches("the office", "The.Office.S01E01"));
        assert!(matches("the office", "the_office"));
        assert!(matches("the office", "The-Office 2005"));
        assert!(matches("the office", "The   Office"));
    }

    #[test]
    fn test_boundary_violation() {
        assert!(!matches("the office", "theofficetv"));
        assert!(!matches("office", "officer.down"));
        assert!(!matches("the office 2", "theofficetv"));
    }

    #[test]
    fn test_case_insensitive() {
        assert!(matches("THE OFFICE", "the.office"));
        assert!(matches("office", "OFFICE SPACE"));
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        assert!(matches("c++ primer", "C++.Primer.pdf"));
        assert!(!matches("a.c", "abc"));
        assert!(matches("a.c", "Show.a.c.2020"));
    }

    #[test]
    fn test_empty_query_matches_nothing() {
        assert!(TitleMatcher::new("").is_none());
        assert!(TitleMatcher::new("   ").is_none());
        assert!(!matches("", "anything"));
    }

    #[test]
    fn test_compiled_matcher_reuse() {
        let matcher = TitleMatcher::new("office").unwrap();
        assert!(matcher.is_match("The Office"));
        assert!(matcher.is_match("Office Space"));
        assert!(!matcher.is_match("Officer"));
    }
}
