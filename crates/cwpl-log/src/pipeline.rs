// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! End-to-end log pipeline
//!
//! fetch → repair → decode → enrich → dedup → author filter → sort
//!
//! Command failures and malformed output only lose the affected folder: the
//! run logs a warning and yields no records for it. A date that does not
//! match the configured format aborts, since it means the format is wrong for
//! every record.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::decode::{parse_log_output, parse_log_output_with_keys};
use crate::dedup::dedup;
use crate::enrich::enrich;
use crate::error::PipelineError;
use crate::filter::filter_by_authors;
use crate::record::LogRecord;
use crate::runner::{LogQuery, LogSource};
use crate::settings::{Settings, validate_log_format};
use crate::sort::SortState;

/// Everything needed for one folder's run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Repository folder
    pub folder: PathBuf,
    /// Only commits after this date
    pub after: NaiveDate,
    /// Author substrings; records must match at least one
    pub authors: Vec<String>,
    /// Templates, date format and branch selection
    pub settings: Settings,
    /// Final ordering
    pub sort: SortState,
}

impl RunConfig {
    /// Config with default settings and newest-first ordering
    pub fn new(folder: impl Into<PathBuf>, after: NaiveDate, authors: Vec<String>) -> Self {
        Self {
            folder: folder.into(),
            after,
            authors,
            settings: Settings::default(),
            sort: SortState::default(),
        }
    }

    /// Replace the settings
    #[must_use]
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Replace the ordering
    #[must_use]
    pub fn with_sort(mut self, sort: SortState) -> Self {
        self.sort = sort;
        self
    }
}

fn query<'a>(folder: &'a Path, after: NaiveDate, settings: &'a Settings) -> LogQuery<'a> {
    LogQuery {
        folder,
        after,
        format: &settings.git_log_format,
        branches: settings.branches(),
    }
}

/// Fetch, repair, decode and enrich one folder's log
///
/// # Errors
///
/// Returns any `PipelineError`, recoverable or not.
pub fn fetch_records<S: LogSource + ?Sized>(
    source: &S,
    query: &LogQuery<'_>,
    date_format: &str,
) -> Result<Vec<LogRecord>, PipelineError> {
    let raw = source.fetch(query)?;
    let decoded = match validate_log_format(query.format) {
        Ok(keys) => parse_log_output_with_keys(&raw, &keys)?,
        Err(e) => {
            debug!(error = %e, "Log format not recognised, assuming the default keys");
            parse_log_output(&raw)?
        }
    };
    debug!(records = decoded.len(), "Parsed log output");
    enrich(decoded, date_format)
}

/// Run the whole pipeline for one folder
///
/// # Errors
///
/// Returns `PipelineError::DateParse` if a date does not match the configured
/// format. Recoverable failures produce `Ok` with no records.
pub fn run<S: LogSource + ?Sized>(
    source: &S,
    config: &RunConfig,
) -> Result<Vec<LogRecord>, PipelineError> {
    info!(folder = %config.folder.display(), after = %config.after, "Starting log run");

    let q = query(&config.folder, config.after, &config.settings);
    let records = match fetch_records(source, &q, &config.settings.date_format) {
        Ok(records) => records,
        Err(e) if e.is_recoverable() => {
            warn!(folder = %config.folder.display(), error = %e, "Log run failed, no records");
            return Ok(Vec::new());
        }
        Err(e) => return Err(e),
    };

    let mut records = filter_by_authors(dedup(records), &config.authors);
    config.sort.apply(&mut records);

    info!(records = records.len(), "Log run complete");
    Ok(records)
}

/// Request covering several folders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectConfig {
    /// Repository folders, scanned in order
    pub folders: Vec<PathBuf>,
    /// Only commits after this date
    pub after: NaiveDate,
    /// Author substrings
    pub authors: Vec<String>,
    /// Shared settings
    pub settings: Settings,
    /// Final ordering
    pub sort: SortState,
}

/// Counters from a multi-folder collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CollectStats {
    /// Folders whose log was read
    pub folders_scanned: usize,
    /// Folders skipped after a recoverable failure
    pub folders_failed: usize,
    /// Records decoded across all folders
    pub fetched: usize,
    /// Records dropped as repeats
    pub duplicates: usize,
    /// Records dropped by the author filter
    pub filtered_out: usize,
}

/// Records and counters from [`collect`]
#[derive(Debug, Clone, PartialEq)]
pub struct Collected {
    /// Final ordered records
    pub records: Vec<LogRecord>,
    /// What happened along the way
    pub stats: CollectStats,
}

/// Folders in `folders` that do not exist
#[must_use]
pub fn missing_folders(folders: &[PathBuf]) -> Vec<PathBuf> {
    folders
        .iter()
        .filter(|folder| !folder.is_dir())
        .cloned()
        .collect()
}

/// Run the pipeline over several folders and merge the results
///
/// Repeats are removed across folders, so a repository watched through two
/// paths is only reported once.
///
/// # Errors
///
/// Returns `PipelineError::FoldersNotFound` before running anything if any
/// folder is missing, and `PipelineError::DateParse` on a format mismatch.
pub fn collect<S: LogSource + ?Sized>(
    source: &S,
    config: &CollectConfig,
) -> Result<Collected, PipelineError> {
    let missing = missing_folders(&config.folders);
    if !missing.is_empty() {
        return Err(PipelineError::FoldersNotFound { folders: missing });
    }

    info!(folders = config.folders.len(), after = %config.after, "Starting log collection");

    let mut stats = CollectStats::default();
    let mut all = Vec::new();
    for folder in &config.folders {
        let q = query(folder, config.after, &config.settings);
        match fetch_records(source, &q, &config.settings.date_format) {
            Ok(records) => {
                stats.folders_scanned += 1;
                stats.fetched += records.len();
                all.extend(records);
            }
            Err(e) if e.is_recoverable() => {
                warn!(folder = %folder.display(), error = %e, "Skipping folder");
                stats.folders_failed += 1;
            }
            Err(e) => return Err(e),
        }
    }

    let unique = dedup(all);
    stats.duplicates = stats.fetched - unique.len();
    let before_filter = unique.len();
    let mut records = filter_by_authors(unique, &config.authors);
    stats.filtered_out = before_filter - records.len();
    config.sort.apply(&mut records);

    info!(
        records = records.len(),
        scanned = stats.folders_scanned,
        failed = stats.folders_failed,
        duplicates = stats.duplicates,
        "Log collection complete"
    );
    Ok(Collected { records, stats })
}
