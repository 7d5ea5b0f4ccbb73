// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Author filtering

use tracing::debug;

use crate::record::LogRecord;

/// Check whether `author` contains at least one of `authors`
///
/// Matching is plain, case-sensitive substring containment. An empty list
/// matches nothing.
#[must_use]
pub fn matches_author<S: AsRef<str>>(author: &str, authors: &[S]) -> bool {
    authors.iter().any(|needle| author.contains(needle.as_ref()))
}

/// Keep only records written by one of `authors`
#[must_use]
pub fn filter_by_authors<S: AsRef<str>>(records: Vec<LogRecord>, authors: &[S]) -> Vec<LogRecord> {
    let total = records.len();
    let kept: Vec<LogRecord> = records
        .into_iter()
        .filter(|record| matches_author(&record.author, authors))
        .collect();
    debug!(input = total, kept = kept.len(), "Filtered log entries by author");
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::fixtures::record;
    use similar_asserts::assert_eq;

    #[test]
    fn test_substring_match() {
        assert!(matches_author("Jane Doe", &["Jane"]));
        assert!(matches_author("Jane Doe", &["Bob", "Doe"]));
        assert!(!matches_author("Jane Doe", &["Bob"]));
    }

    #[test]
    fn test_match_is_case_sensitive() {
        assert!(!matches_author("Jane Doe", &["jane"]));
    }

    #[test]
    fn test_empty_author_list_matches_nothing() {
        let none: [&str; 0] = [];
        assert!(!matches_author("Jane Doe", &none));

        let records = vec![record("a", "Jane Doe", "m", 0)];
        assert!(filter_by_authors(records, &none).is_empty());
    }

    #[test]
    fn test_filter_keeps_order() {
        let records = vec![
            record("a", "Jane Doe", "m", 0),
            record("b", "Bob Smith", "m", 0),
            record("c", "Janet", "m", 0),
            record("d", "Alice", "m", 0),
        ];
        let authors = vec!["Jane".to_string(), "Alice".to_string()];
        let out = filter_by_authors(records, &authors);
        let ids: Vec<&str> = out.iter().map(|r| r.commit_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c", "d"]);
    }
}
