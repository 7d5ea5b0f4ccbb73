//! Log record types
//!
//! A [`RawRecord`] is one object decoded from the repaired log stream. It
//! becomes a [`LogRecord`] once its date has been parsed and its custom id
//! extracted, so a `LogRecord` always carries a parsed timestamp.

use std::borrow::Cow;
use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Field names every log format template must produce
pub const REQUIRED_FIELDS: [&str; 4] = ["commit", "author", "date", "message"];

/// Name under which the extracted custom id is exposed to report templates
pub const CUSTOM_ID_FIELD: &str = "custom_id";

/// One entry exactly as decoded from the log stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Commit identifier as reported by git
    pub commit: String,
    /// Author name
    pub author: String,
    /// Date text in whatever format the template asked for
    pub date: String,
    /// Commit message, possibly spanning several lines
    pub message: String,
    /// Any additional keys the template emits
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// A normalized log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Commit identifier (not unique across repositories)
    pub commit_id: String,
    /// Author name
    pub author: String,
    /// Date text as emitted by git
    pub date_raw: String,
    /// Commit message
    pub message: String,
    /// Parsed commit date
    pub date_parsed: DateTime<FixedOffset>,
    /// Token captured from a `change-id: <token>` marker, or empty
    pub custom_id: String,
    /// Additional template keys, carried through for report rendering
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl LogRecord {
    /// Look up a field by the name report templates use
    ///
    /// Known names are `commit`, `author`, `date`, `message` and `custom_id`;
    /// anything else is looked up among the extra template keys. String
    /// values are returned bare, other JSON values in their JSON form.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        match name {
            "commit" => Some(Cow::Borrowed(&self.commit_id)),
            "author" => Some(Cow::Borrowed(&self.author)),
            "date" => Some(Cow::Borrowed(&self.date_raw)),
            "message" => Some(Cow::Borrowed(&self.message)),
            CUSTOM_ID_FIELD => Some(Cow::Borrowed(&self.custom_id)),
            other => self.extra.get(other).map(|value| match value {
                serde_json::Value::String(s) => Cow::Borrowed(s.as_str()),
                value => Cow::Owned(value.to_string()),
            }),
        }
    }

    /// Every field name [`LogRecord::field`] resolves for this record
    #[must_use]
    pub fn field_names(&self) -> Vec<&str> {
        REQUIRED_FIELDS
            .iter()
            .copied()
            .chain(std::iter::once(CUSTOM_ID_FIELD))
            .chain(self.extra.keys().map(String::as_str))
            .collect()
    }

    /// First non-blank line of the message
    #[must_use]
    pub fn subject(&self) -> &str {
        self.message
            .lines()
            .find(|line| !line.trim().is_empty())
            .unwrap_or("")
    }

    /// Commit id shortened to 7 characters
    #[must_use]
    pub fn short_id(&self) -> &str {
        match self.commit_id.char_indices().nth(7) {
            Some((idx, _)) => &self.commit_id[..idx],
            None => &self.commit_id,
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use chrono::TimeZone;

    /// Build a record with a UTC timestamp `secs` after the epoch
    pub fn record(commit: &str, author: &str, message: &str, secs: i64) -> LogRecord {
        let date_parsed = FixedOffset::east_opt(0)
            .expect("zero offset")
            .timestamp_opt(secs, 0)
            .single()
            .expect("valid timestamp");
        LogRecord {
            commit_id: commit.to_string(),
            author: author.to_string(),
            date_raw: date_parsed.format("%a %b %d %H:%M:%S %Y %z").to_string(),
            message: message.to_string(),
            date_parsed,
            custom_id: String::new(),
            extra: BTreeMap::new(),
        }
    }
}
