// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Decoding of the repaired log stream

use std::collections::BTreeSet;

use tracing::debug;

use crate::error::StreamError;
use crate::record::RawRecord;
use crate::repair::{repair, repair_with_keys};

/// Decode a repaired JSON array into raw records
///
/// Records come back in the order git printed them. Every object must carry
/// string `commit`, `author`, `date` and `message` values; extra keys are kept.
///
/// # Errors
///
/// Returns `StreamError::Json` if the text is not a JSON array of such objects.
pub fn decode(repaired: &str) -> Result<Vec<RawRecord>, StreamError> {
    let records: Vec<RawRecord> = serde_json::from_str(repaired)?;
    debug!(records = records.len(), "Decoded log stream");
    Ok(records)
}

/// Repair and decode raw `git log` output in one step
///
/// # Errors
///
/// Returns a `StreamError` from either stage.
pub fn parse_log_output(raw: &str) -> Result<Vec<RawRecord>, StreamError> {
    decode(&repair(raw)?)
}

/// Repair and decode output of a template producing `keys`
///
/// # Errors
///
/// Returns a `StreamError` from either stage.
pub fn parse_log_output_with_keys(
    raw: &str,
    keys: &BTreeSet<String>,
) -> Result<Vec<RawRecord>, StreamError> {
    decode(&repair_with_keys(raw, keys)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    #[test]
    fn test_decode_empty_array() {
        assert!(decode("[]").expect("decode").is_empty());
    }

    #[test]
    fn test_decode_preserves_order() {
        let json = r#"[
            {"commit": "b", "author": "A", "date": "d2", "message": "second"},
            {"commit": "a", "author": "A", "date": "d1", "message": "first"}
        ]"#;
        let records = decode(json).expect("decode");
        let commits: Vec<&str> = records.iter().map(|r| r.commit.as_str()).collect();
        assert_eq!(commits, vec!["b", "a"]);
    }

    #[test]
    fn test_decode_rejects_missing_key() {
        let json = r#"[{"commit": "a", "date": "d", "message": "m"}]"#;
        let err = decode(json).expect_err("author missing");
        assert!(matches!(err, StreamError::Json(_)));
        assert!(err.to_string().contains("author"));
    }

    #[test]
    fn test_decode_rejects_null_value() {
        let json = r#"[{"commit": null, "author": "A", "date": "d", "message": "m"}]"#;
        assert!(matches!(decode(json), Err(StreamError::Json(_))));
    }

    #[test]
    fn test_decode_rejects_non_array() {
        let json = r#"{"commit": "a", "author": "A", "date": "d", "message": "m"}"#;
        assert!(decode(json).is_err());
    }

    #[test]
    fn test_parse_log_output_with_quotes() {
        let raw = "{\"commit\": \"abc\", \"author\": \"Jane Doe\", \"date\": \"Mon Jan 1 00:00:00 2001 +0000\", \"message\": \"revert \"bad\" change\nbody\"},\n";
        let records = parse_log_output(raw).expect("parse");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].message, "revert \"bad\" change\nbody");
        assert_eq!(records[0].author, "Jane Doe");
    }

    #[test]
    fn test_parse_log_output_empty() {
        assert!(parse_log_output("").expect("parse").is_empty());
    }

    #[test]
    fn test_parse_log_output_bad_bare_value() {
        let raw = r#"{"commit": "abc", "author": "A", "date": "d", "ts": notanumber, "message": "m"},"#;
        let keys = ["commit", "author", "date", "ts", "message"]
            .iter()
            .map(ToString::to_string)
            .collect();
        assert!(matches!(
            parse_log_output_with_keys(raw, &keys),
            Err(StreamError::Json(_))
        ));
    }

    #[test]
    fn test_parse_log_output_with_extra_key_before_message() {
        let raw = "{\"commit\": \"abc\", \"author\": \"Jane\", \"email\": \"j@x\", \"date\": \"d\", \"message\": \"say \"hi\", \"all\": now\"},\n";
        let keys = ["commit", "author", "email", "date", "message"]
            .iter()
            .map(ToString::to_string)
            .collect();
        let records = parse_log_output_with_keys(raw, &keys).expect("parse");
        assert_eq!(records[0].author, "Jane");
        assert_eq!(records[0].message, "say \"hi\", \"all\": now");
        assert_eq!(records[0].extra["email"].as_str(), Some("j@x"));
    }
}
