// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Command line configuration for cwpl
//!
//! Folders and authors normally come from the environment so a shell profile
//! can hold the watched set; every named setting can be overridden per run.

use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use cwpl_log::settings::{Settings, default_after_date};
use cwpl_log::{CollectConfig, SettingsError, SortKey, SortState};

use crate::output::OutputFormat;

/// cwpl - collect your commits into a work report
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "cwpl")]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Subcommand to run (defaults to `list`)
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Repository folder to scan (repeatable)
    #[arg(
        short,
        long = "folder",
        value_name = "PATH",
        env = "CWPL_FOLDERS",
        value_delimiter = ',',
        global = true
    )]
    pub folders: Vec<PathBuf>,

    /// Author name substring to keep (repeatable, case-sensitive)
    #[arg(
        short,
        long = "author",
        value_name = "NAME",
        env = "CWPL_AUTHORS",
        value_delimiter = ',',
        global = true
    )]
    pub authors: Vec<String>,

    /// Only list commits after this date (YYYY-MM-DD)
    ///
    /// Defaults to two days before the first of the current month.
    #[arg(long, value_name = "DATE", global = true)]
    pub after: Option<NaiveDate>,

    /// strptime-style format of the `date` field
    #[arg(long, env = "CWPL_DATE_FORMAT", allow_hyphen_values = true, global = true)]
    pub date_format: Option<String>,

    /// `git log --pretty=format:` template, one object per commit then ','
    #[arg(long, env = "CWPL_LOG_FORMAT", allow_hyphen_values = true, global = true)]
    pub log_format: Option<String>,

    /// Report entry template with `{field}` placeholders
    #[arg(long, env = "CWPL_ENTRY_FORMAT", allow_hyphen_values = true, global = true)]
    pub entry_format: Option<String>,

    /// Scan every branch matching `--branches` instead of the current one
    #[arg(long, default_value = "false", global = true)]
    pub in_branches: bool,

    /// Branch pattern for `--in-branches` (implies it)
    #[arg(long, value_name = "PATTERN", env = "CWPL_BRANCHES", global = true)]
    pub branches: Option<String>,

    /// Kill git log after this many seconds
    #[arg(long, value_name = "SECS", global = true)]
    pub timeout: Option<u64>,

    /// Sort column; repeat to toggle direction like a table header
    #[arg(short, long = "sort", value_name = "COLUMN", global = true)]
    pub sort: Vec<SortKey>,

    /// Enable verbose logging (debug level)
    #[arg(short, long, default_value = "false", global = true)]
    pub verbose: bool,

    /// Quiet mode - suppress info-level logs
    #[arg(short, long, default_value = "false", global = true)]
    pub quiet: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List matching commits
    List {
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Render matching commits with the entry template
    ///
    /// Example:
    ///   cwpl report -f ~/src/app -a "Jane" --output report.md
    Report {
        /// Append to this file instead of writing to stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Check folders and templates without running git
    Check,
}

impl Config {
    /// Subcommand, `list` as a table when none was given
    #[must_use]
    pub fn subcommand(&self) -> Command {
        self.command.clone().unwrap_or(Command::List {
            format: OutputFormat::Table,
        })
    }

    /// Default settings with command line overrides applied
    #[must_use]
    pub fn settings(&self) -> Settings {
        let mut settings = Settings::default();
        if let Some(format) = &self.date_format {
            settings.date_format.clone_from(format);
        }
        if let Some(format) = &self.log_format {
            settings.git_log_format.clone_from(format);
        }
        if let Some(format) = &self.entry_format {
            settings.entry_log_format.clone_from(format);
        }
        if let Some(pattern) = &self.branches {
            settings.git_log_branches.clone_from(pattern);
        }
        settings.git_log_in_branches = self.in_branches || self.branches.is_some();
        settings
    }

    /// The `--after` date, or the default boundary relative to `today`
    #[must_use]
    pub fn after_date(&self, today: NaiveDate) -> NaiveDate {
        self.after.unwrap_or_else(|| default_after_date(today))
    }

    /// Sort state after replaying every `--sort` on the default order
    #[must_use]
    pub fn sort_state(&self) -> SortState {
        self.sort
            .iter()
            .fold(SortState::default(), |mut state, &key| {
                state.select(key);
                state
            })
    }

    /// Timeout for one git invocation
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_secs)
    }

    /// Pipeline request for every configured folder
    #[must_use]
    pub fn collect_config(&self, today: NaiveDate) -> CollectConfig {
        CollectConfig {
            folders: self.folders.clone(),
            after: self.after_date(today),
            authors: self.authors.clone(),
            settings: self.settings(),
            sort: self.sort_state(),
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No folder was given
    /// - The timeout is zero
    /// - The log or entry template is invalid
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.folders.is_empty() {
            return Err(ConfigError::NoFolders);
        }
        if self.timeout == Some(0) {
            return Err(ConfigError::ZeroTimeout);
        }
        self.settings().validate()?;
        Ok(())
    }

    /// Get the log level based on verbose/quiet flags
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        if self.verbose {
            tracing::Level::DEBUG
        } else if self.quiet {
            tracing::Level::WARN
        } else {
            tracing::Level::INFO
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Nothing to scan
    #[error("no folders given; use --folder or set CWPL_FOLDERS")]
    NoFolders,

    /// A zero timeout would kill every run
    #[error("--timeout must be at least 1 second")]
    ZeroTimeout,

    /// A template or flag is invalid
    #[error(transparent)]
    Settings(#[from] SettingsError),
}
