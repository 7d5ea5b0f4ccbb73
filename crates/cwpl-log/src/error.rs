// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Error types for cwpl-log

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors raised while turning raw `git log` output into records
///
/// Every variant is a malformed log stream: the template the user configured
/// does not produce text the repairer or the JSON decoder can make sense of.
#[derive(Debug, Error)]
pub enum StreamError {
    /// The command output is not valid UTF-8
    #[error("log output is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    /// A character appeared where the object grammar does not allow it
    #[error("unexpected {found:?} at byte {offset}, expected {expected}")]
    UnexpectedChar {
        /// Byte offset into the raw output
        offset: usize,
        /// The offending character
        found: char,
        /// What the repairer was looking for
        expected: &'static str,
    },

    /// A string value was still open when the output ended
    #[error("unterminated string starting at byte {offset}")]
    UnterminatedString {
        /// Byte offset of the opening quote
        offset: usize,
    },

    /// An object was still open when the output ended
    #[error("unterminated object starting at byte {offset}")]
    UnterminatedObject {
        /// Byte offset of the opening brace
        offset: usize,
    },

    /// An object has no `message` field
    #[error("log entry #{index} has no message field; check the git log format template")]
    MissingMessageField {
        /// Zero-based index of the object in the stream
        index: usize,
    },

    /// The repaired array could not be decoded
    #[error("JSON decode error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur during a pipeline run
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The log command wrote to its error stream or exited unsuccessfully
    #[error("git log failed in {folder}: {stderr}")]
    ExternalTool {
        /// Folder the command ran in
        folder: PathBuf,
        /// Captured error stream
        stderr: String,
    },

    /// The log command could not be started or its output could not be read
    #[error("could not run git log in {folder}: {source}")]
    Spawn {
        /// Folder the command was meant to run in
        folder: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// The log command did not finish in time and was killed
    #[error("git log in {folder} timed out after {timeout:?}")]
    Timeout {
        /// Folder the command ran in
        folder: PathBuf,
        /// The limit that expired
        timeout: Duration,
    },

    /// The log output could not be repaired or decoded
    #[error("malformed log stream: {0}")]
    MalformedLogStream(#[from] StreamError),

    /// A record's date did not match the configured date format
    #[error("cannot parse date {value:?} with format {format:?}: {source}")]
    DateParse {
        /// The raw date text
        value: String,
        /// The configured format
        format: String,
        /// chrono's reason
        source: chrono::ParseError,
    },

    /// Some of the watched folders do not exist
    #[error("folders not found: {}", display_paths(.folders))]
    FoldersNotFound {
        /// Every missing folder
        folders: Vec<PathBuf>,
    },
}

impl PipelineError {
    /// Whether the run should degrade to an empty result instead of failing
    ///
    /// Command failures and malformed output are local to one run; a date
    /// format mismatch or missing folders invalidate the whole request.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ExternalTool { .. }
                | Self::Spawn { .. }
                | Self::Timeout { .. }
                | Self::MalformedLogStream(_)
        )
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors raised while expanding a report entry template
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateFieldError {
    /// The template names a field the record does not have
    #[error("unknown field {{{field}}} in report template")]
    UnknownField {
        /// The placeholder name
        field: String,
    },

    /// A `{` was never closed
    #[error("unclosed placeholder at byte {offset} in report template")]
    UnclosedPlaceholder {
        /// Byte offset of the opening brace
        offset: usize,
    },

    /// A lone `}` outside any placeholder
    #[error("single '}}' at byte {offset} in report template")]
    UnmatchedBrace {
        /// Byte offset of the brace
        offset: usize,
    },
}

/// Errors in named settings values
#[derive(Debug, Error)]
pub enum SettingsError {
    /// A stored boolean was neither `Y` nor `N`
    #[error("invalid flag value {value:?} for {name}, expected Y or N")]
    InvalidFlag {
        /// Setting name
        name: String,
        /// The stored text
        value: String,
    },

    /// The git log format template cannot produce decodable records
    #[error("invalid git log format: {reason}")]
    InvalidLogFormat {
        /// Why the template was rejected
        reason: String,
    },

    /// The report template references fields the log format does not produce
    #[error("invalid report format: {0}")]
    InvalidEntryFormat(#[from] TemplateFieldError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_classification() {
        let tool = PipelineError::ExternalTool {
            folder: PathBuf::from("/repo"),
            stderr: "fatal: not a git repository".to_string(),
        };
        assert!(tool.is_recoverable());

        let stream = PipelineError::from(StreamError::MissingMessageField { index: 0 });
        assert!(stream.is_recoverable());

        let missing = PipelineError::FoldersNotFound {
            folders: vec![PathBuf::from("/a"), PathBuf::from("/b")],
        };
        assert!(!missing.is_recoverable());
        assert_eq!(missing.to_string(), "folders not found: /a, /b");
    }

    #[test]
    fn test_template_error_messages() {
        let err = TemplateFieldError::UnknownField {
            field: "sha".to_string(),
        };
        assert_eq!(err.to_string(), "unknown field {sha} in report template");

        let err = TemplateFieldError::UnmatchedBrace { offset: 3 };
        assert_eq!(err.to_string(), "single '}' at byte 3 in report template");
    }
}
