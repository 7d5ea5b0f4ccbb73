// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! cwpl-log: Git log ingestion for the cwpl report generator
//!
//! This library crate runs `git log` with a JSON-like output template, repairs
//! the unescaped stream into valid JSON, and turns it into deduplicated,
//! filtered and sorted records ready for a work report.

#![warn(missing_docs)]

//! # Example
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use cwpl_log::{GitCli, RunConfig, render_all, run};
//!
//! let after = NaiveDate::from_ymd_opt(2024, 2, 28).expect("valid date");
//! let config = RunConfig::new(".", after, vec!["Jane".to_string()]);
//! let records = run(&GitCli::new(), &config).expect("run pipeline");
//!
//! for r in &records {
//!     println!("{} - {}", r.short_id(), r.subject());
//! }
//! let report = render_all(&records, &config.settings.entry_log_format)
//!     .expect("render report");
//! print!("{report}");
//! ```

pub mod decode;
pub mod dedup;
pub mod enrich;
pub mod error;
pub mod filter;
pub mod pipeline;
pub mod record;
pub mod render;
pub mod repair;
pub mod runner;
pub mod settings;
pub mod sort;

pub use decode::{decode, parse_log_output, parse_log_output_with_keys};
pub use dedup::{DedupIndex, dedup};
pub use enrich::{enrich, enrich_record, extract_custom_id, parse_date};
pub use error::{PipelineError, SettingsError, StreamError, TemplateFieldError};
pub use filter::{filter_by_authors, matches_author};
pub use pipeline::{CollectConfig, CollectStats, Collected, RunConfig, collect, run};
pub use record::{LogRecord, RawRecord};
pub use render::{render, render_all};
pub use repair::{repair, repair_with_keys};
pub use runner::{GitCli, LogQuery, LogSource};
pub use settings::Settings;
pub use sort::{SortKey, SortState};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{PipelineError, TemplateFieldError};
    pub use crate::pipeline::{CollectConfig, RunConfig, collect, run};
    pub use crate::record::LogRecord;
    pub use crate::render::render_all;
    pub use crate::runner::{GitCli, LogSource};
    pub use crate::settings::Settings;
    pub use crate::sort::{SortKey, SortState};
}
