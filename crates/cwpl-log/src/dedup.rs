// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Removal of commits reported more than once
//!
//! git reports a commit once per branch it is reachable from when several
//! branches are scanned, and the same repository may be watched through more
//! than one folder. Such repeats share both the commit id and the message.
//! Two records with the same id but different messages are both kept: ids
//! are not unique across repositories.

use std::collections::HashMap;

use tracing::debug;

use crate::record::LogRecord;

/// Accepted records grouped by commit id, alive for one pass
#[derive(Debug, Default)]
pub struct DedupIndex {
    /// Positions in the accepted list, per commit id
    buckets: HashMap<String, Vec<usize>>,
}

impl DedupIndex {
    /// Create an empty index
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether `record` repeats an already accepted record
    #[must_use]
    pub fn is_duplicate(&self, record: &LogRecord, accepted: &[LogRecord]) -> bool {
        self.buckets.get(&record.commit_id).is_some_and(|bucket| {
            bucket
                .iter()
                .any(|&idx| accepted[idx].message == record.message)
        })
    }

    /// Append `record` to `accepted` and remember it under its commit id
    pub fn accept(&mut self, record: LogRecord, accepted: &mut Vec<LogRecord>) {
        self.buckets
            .entry(record.commit_id.clone())
            .or_default()
            .push(accepted.len());
        accepted.push(record);
    }

    /// Number of distinct commit ids seen
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Whether nothing has been accepted yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

/// Drop repeated records, keeping the first occurrence and the input order
#[must_use]
pub fn dedup(records: Vec<LogRecord>) -> Vec<LogRecord> {
    let total = records.len();
    let mut index = DedupIndex::new();
    let mut accepted = Vec::with_capacity(total);

    for record in records {
        if index.is_duplicate(&record, &accepted) {
            debug!(commit = %record.commit_id, "Dropping duplicate log entry");
            continue;
        }
        index.accept(record, &mut accepted);
    }

    debug!(
        input = total,
        kept = accepted.len(),
        commits = index.len(),
        "Deduplicated log entries"
    );
    accepted
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use crate::record::fixtures::record;
    use proptest::prelude::*;

    fn records_strategy() -> impl Strategy<Value = Vec<LogRecord>> {
        proptest::collection::vec(("[a-c]", "[xyz]{1,2}"), 0..20).prop_map(|pairs| {
            pairs
                .into_iter()
                .map(|(id, msg)| record(&id, "Jane", &msg, 0))
                .collect()
        })
    }

    proptest! {
        /// Property: deduplicating twice changes nothing
        #[test]
        fn prop_dedup_is_idempotent(records in records_strategy()) {
            let once = dedup(records);
            let twice = dedup(once.clone());
            prop_assert_eq!(once, twice);
        }

        /// Property: no two kept records share both id and message
        #[test]
        fn prop_no_pair_repeats(records in records_strategy()) {
            let out = dedup(records);
            for (i, a) in out.iter().enumerate() {
                for b in &out[i + 1..] {
                    prop_assert!(a.commit_id != b.commit_id || a.message != b.message);
                }
            }
        }

        /// Property: every distinct (id, message) pair of the input survives
        #[test]
        fn prop_distinct_pairs_survive(records in records_strategy()) {
            let out = dedup(records.clone());
            for r in &records {
                prop_assert!(out
                    .iter()
                    .any(|o| o.commit_id == r.commit_id && o.message == r.message));
            }
        }
    }
}
