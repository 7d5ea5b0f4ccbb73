// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Rendering of record lists for the terminal

use clap::ValueEnum;
use cwpl_log::LogRecord;

/// Output mode of `list`
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned columns
    #[default]
    Table,
    /// Pretty-printed JSON array
    Json,
}

const HEADERS: [&str; 5] = ["date", "commit", "author", "custom_id", "subject"];

/// Longest subject shown in a table cell
const MAX_SUBJECT: usize = 60;

/// Render records in the requested format
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render(records: &[LogRecord], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(records)?),
        OutputFormat::Table => Ok(render_table(records)),
    }
}

/// Render records as an aligned table, one row per record
#[must_use]
pub fn render_table(records: &[LogRecord]) -> String {
    if records.is_empty() {
        return String::from("(no commits)");
    }

    let rows: Vec<[String; 5]> = records
        .iter()
        .map(|r| {
            [
                r.date_parsed.format("%Y-%m-%d %H:%M").to_string(),
                r.short_id().to_string(),
                r.author.clone(),
                r.custom_id.clone(),
                truncate_text(r.subject(), MAX_SUBJECT),
            ]
        })
        .collect();

    let widths: Vec<usize> = HEADERS
        .iter()
        .enumerate()
        .map(|(index, header)| {
            rows.iter()
                .map(|row| row[index].chars().count())
                .max()
                .unwrap_or(0)
                .max(header.len())
        })
        .collect();

    let format_row = |cells: &[&str]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let header_line = format_row(&HEADERS);
    let divider = "-".repeat(widths.iter().sum::<usize>() + (widths.len() - 1) * 2);

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(header_line);
    lines.push(divider);
    for row in &rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        lines.push(format_row(&cells));
    }
    lines.join("\n")
}

fn truncate_text(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(3)).collect();
    out.push_str("...");
    out
}
