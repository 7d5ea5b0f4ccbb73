// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Subcommand execution
//!
//! Everything here writes to a caller-supplied sink so the binary and the
//! tests share one code path.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, bail};
use chrono::NaiveDate;
use cwpl_log::pipeline::missing_folders;
use cwpl_log::settings::{validate_entry_format, validate_log_format};
use cwpl_log::{LogRecord, LogSource, collect, render_all};
use tracing::{info, warn};

use crate::config::{Command, Config};
use crate::output;

/// Run the configured subcommand against `source`
///
/// `today` anchors the default `--after` date.
///
/// # Errors
///
/// Returns an error for invalid configuration, missing folders, a date format
/// mismatch, a report template naming an unknown field, or an IO failure.
pub fn execute<S, W>(
    config: &Config,
    source: &S,
    today: NaiveDate,
    out: &mut W,
) -> anyhow::Result<()>
where
    S: LogSource + ?Sized,
    W: Write,
{
    match config.subcommand() {
        Command::Check => check(config, out),
        Command::List { format } => {
            let records = gather(config, source, today)?;
            writeln!(out, "{}", output::render(&records, format)?)?;
            Ok(())
        }
        Command::Report { output } => {
            let records = gather(config, source, today)?;
            let text = render_all(&records, &config.settings().entry_log_format)?;
            match output {
                Some(path) => append_report(&path, &text)?,
                None => out.write_all(text.as_bytes())?,
            }
            info!(entries = records.len(), "Report written");
            Ok(())
        }
    }
}

/// Validate the configuration and run the pipeline over every folder
fn gather<S: LogSource + ?Sized>(
    config: &Config,
    source: &S,
    today: NaiveDate,
) -> anyhow::Result<Vec<LogRecord>> {
    config.validate()?;
    if config.authors.is_empty() {
        warn!("No authors given; every commit will be filtered out");
    }

    let collected = collect(source, &config.collect_config(today))?;
    info!(
        records = collected.records.len(),
        failed = collected.stats.folders_failed,
        "Collected commits"
    );
    Ok(collected.records)
}

fn append_report(path: &Path, text: &str) -> anyhow::Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open report file {}", path.display()))?;
    file.write_all(text.as_bytes())
        .with_context(|| format!("Failed to write report file {}", path.display()))?;
    info!(path = %path.display(), bytes = text.len(), "Appended report");
    Ok(())
}

/// Print one line per check and fail if any did
fn check<W: Write>(config: &Config, out: &mut W) -> anyhow::Result<()> {
    let settings = config.settings();
    let mut problems = 0usize;

    if config.folders.is_empty() {
        writeln!(out, "folders: none given")?;
        problems += 1;
    }
    let missing = missing_folders(&config.folders);
    for folder in &config.folders {
        let status = if missing.contains(folder) { "missing" } else { "ok" };
        writeln!(out, "folder {}: {status}", folder.display())?;
    }
    problems += missing.len();

    match validate_log_format(&settings.git_log_format) {
        Ok(keys) => {
            let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
            writeln!(out, "log format: ok ({})", keys.join(", "))?;
            match validate_entry_format(&settings.entry_log_format, &settings.git_log_format) {
                Ok(()) => writeln!(out, "entry format: ok")?,
                Err(e) => {
                    writeln!(out, "entry format: {e}")?;
                    problems += 1;
                }
            }
        }
        Err(e) => {
            writeln!(out, "log format: {e}")?;
            problems += 1;
        }
    }

    if config.authors.is_empty() {
        writeln!(out, "authors: none given, nothing will match")?;
    }

    if problems > 0 {
        bail!("{problems} problem(s) found");
    }
    Ok(())
}
