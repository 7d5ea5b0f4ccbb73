// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Record enrichment: parsed dates and custom ids

use std::sync::LazyLock;

use chrono::format::ParseErrorKind;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;

use crate::error::PipelineError;
use crate::record::{LogRecord, RawRecord};

/// `change-id: <token>` anywhere in a message, case-insensitive
static CHANGE_ID_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i:change-id)\s*:\s*([A-Za-z0-9]+)").expect("Invalid change-id regex")
});

/// Parse `value` with a strptime-style `format`
///
/// Formats without an offset directive are read as UTC, and date-only
/// formats as midnight UTC.
///
/// # Errors
///
/// Returns chrono's `ParseError` when the text does not match the format.
pub fn parse_date(value: &str, format: &str) -> Result<DateTime<FixedOffset>, chrono::ParseError> {
    match DateTime::parse_from_str(value, format) {
        Ok(date) => Ok(date),
        Err(err) if err.kind() == ParseErrorKind::NotEnough => {
            match NaiveDateTime::parse_from_str(value, format) {
                Ok(naive) => Ok(naive.and_utc().fixed_offset()),
                Err(err) if err.kind() == ParseErrorKind::NotEnough => {
                    NaiveDate::parse_from_str(value, format)
                        .map(|date| date.and_time(NaiveTime::MIN).and_utc().fixed_offset())
                }
                Err(err) => Err(err),
            }
        }
        Err(err) => Err(err),
    }
}

/// Extract the token of the first `change-id:` marker, or an empty string
#[must_use]
pub fn extract_custom_id(message: &str) -> String {
    CHANGE_ID_REGEX
        .captures(message)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Turn one raw record into a [`LogRecord`]
///
/// # Errors
///
/// Returns `PipelineError::DateParse` if the date does not match `date_format`.
pub fn enrich_record(raw: RawRecord, date_format: &str) -> Result<LogRecord, PipelineError> {
    let date_parsed =
        parse_date(&raw.date, date_format).map_err(|source| PipelineError::DateParse {
            value: raw.date.clone(),
            format: date_format.to_string(),
            source,
        })?;
    let custom_id = extract_custom_id(&raw.message);

    Ok(LogRecord {
        commit_id: raw.commit,
        author: raw.author,
        date_raw: raw.date,
        message: raw.message,
        date_parsed,
        custom_id,
        extra: raw.extra,
    })
}

/// Enrich every record, keeping order
///
/// The first unparseable date aborts the batch: a format mismatch is never
/// limited to a single record.
///
/// # Errors
///
/// Returns `PipelineError::DateParse` for the first record whose date fails.
pub fn enrich(raw: Vec<RawRecord>, date_format: &str) -> Result<Vec<LogRecord>, PipelineError> {
    raw.into_iter()
        .map(|record| enrich_record(record, date_format))
        .collect()
}
