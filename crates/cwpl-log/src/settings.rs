// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Named pipeline settings
//!
//! Settings arrive as name/value rows from whatever store the caller keeps
//! them in. Booleans are stored as `Y` or `N`.

use std::collections::BTreeSet;

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SettingsError;
use crate::record::{CUSTOM_ID_FIELD, REQUIRED_FIELDS};
use crate::render::validate_template;

/// Setting name of the date parse format
pub const DATE_FORMAT: &str = "date_format";
/// Setting name of the `--pretty=format:` template
pub const GIT_LOG_FORMAT: &str = "git_log_format";
/// Setting name of the report entry template
pub const ENTRY_LOG_FORMAT: &str = "entry_log_format";
/// Setting name of the branch scan flag
pub const GIT_LOG_IN_BRANCHES: &str = "git_log_in_branches";
/// Setting name of the branch pattern
pub const GIT_LOG_BRANCHES: &str = "git_log_branches";

/// Date format matching git's default `%ad` output
pub const DEFAULT_DATE_FORMAT: &str = "%a %b %d %H:%M:%S %Y %z";
/// One JSON-like object per commit, each followed by a comma
pub const DEFAULT_GIT_LOG_FORMAT: &str =
    r#"{"commit": "%H", "author": "%an", "date": "%ad", "message": "%f"},"#;
/// Report entry template
pub const DEFAULT_ENTRY_LOG_FORMAT: &str = r"*Commit*: {commit}\n*Date*: {date}\n\n{message}\n";
/// Branch pattern used when branch scanning is on
pub const DEFAULT_GIT_LOG_BRANCHES: &str = "*";

/// Pipeline settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// strptime-style format for the `date` field
    pub date_format: String,
    /// Template handed to `git log --pretty=format:`
    pub git_log_format: String,
    /// Template used to render report entries
    pub entry_log_format: String,
    /// Scan branches matching `git_log_branches` instead of the current one
    pub git_log_in_branches: bool,
    /// Branch glob passed to `--branches`
    pub git_log_branches: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            git_log_format: DEFAULT_GIT_LOG_FORMAT.to_string(),
            entry_log_format: DEFAULT_ENTRY_LOG_FORMAT.to_string(),
            git_log_in_branches: false,
            git_log_branches: DEFAULT_GIT_LOG_BRANCHES.to_string(),
        }
    }
}

impl Settings {
    /// Overlay stored name/value rows on the defaults
    ///
    /// Unknown names are ignored.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::InvalidFlag` if the branch flag is not `Y` or `N`.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, SettingsError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut settings = Self::default();
        for (name, value) in pairs {
            let name = name.as_ref();
            let value = value.into();
            match name {
                DATE_FORMAT => settings.date_format = value,
                GIT_LOG_FORMAT => settings.git_log_format = value,
                ENTRY_LOG_FORMAT => settings.entry_log_format = value,
                GIT_LOG_IN_BRANCHES => settings.git_log_in_branches = parse_flag(name, &value)?,
                GIT_LOG_BRANCHES => settings.git_log_branches = value,
                other => debug!(name = other, "Ignoring unknown setting"),
            }
        }
        Ok(settings)
    }

    /// Settings as stored name/value rows
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            (DATE_FORMAT, self.date_format.clone()),
            (GIT_LOG_FORMAT, self.git_log_format.clone()),
            (ENTRY_LOG_FORMAT, self.entry_log_format.clone()),
            (
                GIT_LOG_IN_BRANCHES,
                format_flag(self.git_log_in_branches).to_string(),
            ),
            (GIT_LOG_BRANCHES, self.git_log_branches.clone()),
        ]
    }

    /// Branch pattern to scan, or `None` for the current branch only
    #[must_use]
    pub fn branches(&self) -> Option<&str> {
        self.git_log_in_branches
            .then_some(self.git_log_branches.as_str())
    }

    /// Check both templates
    ///
    /// # Errors
    ///
    /// Returns the first problem found in either template.
    pub fn validate(&self) -> Result<(), SettingsError> {
        validate_entry_format(&self.entry_log_format, &self.git_log_format)
    }
}

/// Parse a stored `Y`/`N` flag
///
/// # Errors
///
/// Returns `SettingsError::InvalidFlag` for any other text.
pub fn parse_flag(name: &str, value: &str) -> Result<bool, SettingsError> {
    match value {
        "Y" => Ok(true),
        "N" => Ok(false),
        _ => Err(SettingsError::InvalidFlag {
            name: name.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Stored form of a flag
#[must_use]
pub fn format_flag(value: bool) -> &'static str {
    if value { "Y" } else { "N" }
}

/// Check a `--pretty=format:` template and return the keys it produces
///
/// The template must be a single JSON object followed by a comma, and the
/// object must carry every required field.
///
/// # Errors
///
/// Returns `SettingsError::InvalidLogFormat` describing the first problem.
pub fn validate_log_format(template: &str) -> Result<BTreeSet<String>, SettingsError> {
    let invalid = |reason: String| SettingsError::InvalidLogFormat { reason };

    let object = template
        .trim_end()
        .strip_suffix(',')
        .ok_or_else(|| invalid("template must end with ','".to_string()))?;
    let map: serde_json::Map<String, serde_json::Value> = serde_json::from_str(object)
        .map_err(|err| invalid(format!("template is not a JSON object: {err}")))?;

    let keys: BTreeSet<String> = map.into_iter().map(|(key, _)| key).collect();
    let missing: Vec<&str> = REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|field| !keys.contains(*field))
        .collect();
    if !missing.is_empty() {
        return Err(invalid(format!("missing keys: {}", missing.join(", "))));
    }
    Ok(keys)
}

/// Check that a report template only uses fields the log template produces
///
/// `custom_id` is always available.
///
/// # Errors
///
/// Returns the log format error, or `SettingsError::InvalidEntryFormat`.
pub fn validate_entry_format(entry: &str, log_format: &str) -> Result<(), SettingsError> {
    let keys = validate_log_format(log_format)?;
    let fields: Vec<&str> = keys
        .iter()
        .map(String::as_str)
        .chain(std::iter::once(CUSTOM_ID_FIELD))
        .collect();
    validate_template(entry, &fields)?;
    Ok(())
}

/// Default lower bound for `--after`: two days before the first of the month
#[must_use]
pub fn default_after_date(today: NaiveDate) -> NaiveDate {
    let first = today.with_day(1).unwrap_or(today);
    first.checked_sub_days(Days::new(2)).unwrap_or(first)
}
