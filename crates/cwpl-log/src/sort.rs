// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Column sorting of log records
//!
//! [`SortState`] behaves like a clickable table header: selecting the column
//! that is already sorted flips the direction, selecting another column sorts
//! it ascending.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::record::LogRecord;

/// Column a record list can be sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Commit id
    Commit,
    /// Author name
    Author,
    /// Parsed date (not the raw date text)
    Date,
    /// Message text
    Message,
    /// Extracted custom id
    CustomId,
}

impl SortKey {
    /// All keys, in column order
    pub const ALL: [SortKey; 5] = [
        SortKey::Commit,
        SortKey::Author,
        SortKey::Date,
        SortKey::Message,
        SortKey::CustomId,
    ];

    /// Compare two records on this column
    #[must_use]
    pub fn compare(self, a: &LogRecord, b: &LogRecord) -> Ordering {
        match self {
            SortKey::Commit => a.commit_id.cmp(&b.commit_id),
            SortKey::Author => a.author.cmp(&b.author),
            SortKey::Date => a.date_parsed.cmp(&b.date_parsed),
            SortKey::Message => a.message.cmp(&b.message),
            SortKey::CustomId => a.custom_id.cmp(&b.custom_id),
        }
    }

    /// Column name as used on the command line
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Commit => "commit",
            SortKey::Author => "author",
            SortKey::Date => "date",
            SortKey::Message => "message",
            SortKey::CustomId => "custom_id",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "commit" => Ok(SortKey::Commit),
            "author" => Ok(SortKey::Author),
            "date" => Ok(SortKey::Date),
            "message" => Ok(SortKey::Message),
            "custom_id" | "custom-id" => Ok(SortKey::CustomId),
            other => Err(format!(
                "unknown sort column '{other}', expected one of: commit, author, date, message, custom_id"
            )),
        }
    }
}

/// Current sort column and direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    /// Column being sorted
    pub key: SortKey,
    /// Direction
    pub ascending: bool,
}

impl Default for SortState {
    /// Newest first
    fn default() -> Self {
        Self {
            key: SortKey::Date,
            ascending: false,
        }
    }
}

impl SortState {
    /// Select a column, toggling the direction if it is already selected
    pub fn select(&mut self, key: SortKey) {
        if self.key == key {
            self.ascending = !self.ascending;
        } else {
            self.key = key;
            self.ascending = true;
        }
    }

    /// Sort `records` in place
    ///
    /// The sort is stable in both directions: records with equal keys keep
    /// their relative order.
    pub fn apply(&self, records: &mut [LogRecord]) {
        let key = self.key;
        if self.ascending {
            records.sort_by(|a, b| key.compare(a, b));
        } else {
            records.sort_by(|a, b| key.compare(b, a));
        }
    }
}
