// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Running `git log`
//!
//! [`GitCli`] runs the git binary with the target folder as its working
//! directory; the process-wide current directory is never changed, so
//! several folders can be scanned from different threads. Output is captured
//! through temporary files, which keeps a chatty or hung child from blocking
//! on a full pipe while the timeout is being watched.

use std::ffi::OsString;
use std::io::Read;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use tempfile::NamedTempFile;
use tracing::{debug, instrument, warn};

use crate::error::{PipelineError, StreamError};

/// How often a running child is polled while a timeout is armed
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Parameters of one log invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogQuery<'a> {
    /// Repository folder the command runs in
    pub folder: &'a Path,
    /// Only commits after this date are listed
    pub after: NaiveDate,
    /// `--pretty=format:` template
    pub format: &'a str,
    /// Branch pattern, or `None` for the current branch
    pub branches: Option<&'a str>,
}

impl LogQuery<'_> {
    /// Arguments passed to git, starting with the `log` subcommand
    #[must_use]
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            "log".to_string(),
            format!("--pretty=format:{}", self.format),
            format!("--after={}", self.after.format("%Y-%m-%d")),
        ];
        if let Some(pattern) = self.branches {
            args.push(format!("--branches={pattern}"));
        }
        args
    }
}

/// Something that can produce raw log output for a query
///
/// The pipeline only depends on this trait, so tests can feed canned output.
pub trait LogSource {
    /// Return the raw object stream for `query`
    ///
    /// # Errors
    ///
    /// Returns a recoverable `PipelineError` if the log could not be produced.
    fn fetch(&self, query: &LogQuery<'_>) -> Result<String, PipelineError>;
}

impl<T: LogSource + ?Sized> LogSource for &T {
    fn fetch(&self, query: &LogQuery<'_>) -> Result<String, PipelineError> {
        (**self).fetch(query)
    }
}

/// The git command line client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitCli {
    program: OsString,
    timeout: Option<Duration>,
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new()
    }
}

impl GitCli {
    /// Use `git` from `PATH` with no timeout
    #[must_use]
    pub fn new() -> Self {
        Self {
            program: OsString::from("git"),
            timeout: None,
        }
    }

    /// Use another executable
    #[must_use]
    pub fn with_program(mut self, program: impl Into<OsString>) -> Self {
        self.program = program.into();
        self
    }

    /// Kill the command if it runs longer than `timeout`
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Configured timeout
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    fn wait(
        &self,
        child: &mut std::process::Child,
        folder: &Path,
    ) -> Result<ExitStatus, PipelineError> {
        let spawn_err = |source| PipelineError::Spawn {
            folder: folder.to_path_buf(),
            source,
        };

        let Some(timeout) = self.timeout else {
            return child.wait().map_err(spawn_err);
        };

        let start = Instant::now();
        loop {
            if let Some(status) = child.try_wait().map_err(spawn_err)? {
                return Ok(status);
            }
            if start.elapsed() >= timeout {
                let _ = child.kill();
                let _ = child.wait();
                warn!(folder = %folder.display(), ?timeout, "git log timed out, killed");
                return Err(PipelineError::Timeout {
                    folder: folder.to_path_buf(),
                    timeout,
                });
            }
            std::thread::sleep(POLL_INTERVAL);
        }
    }
}

fn read_capture(file: &NamedTempFile) -> std::io::Result<Vec<u8>> {
    let mut bytes = Vec::new();
    file.reopen()?.read_to_end(&mut bytes)?;
    Ok(bytes)
}

impl LogSource for GitCli {
    #[instrument(skip_all, fields(folder = %query.folder.display()))]
    fn fetch(&self, query: &LogQuery<'_>) -> Result<String, PipelineError> {
        let spawn_err = |source| PipelineError::Spawn {
            folder: query.folder.to_path_buf(),
            source,
        };

        let stdout_file = NamedTempFile::new().map_err(spawn_err)?;
        let stderr_file = NamedTempFile::new().map_err(spawn_err)?;
        let stdout = stdout_file.reopen().map_err(spawn_err)?;
        let stderr = stderr_file.reopen().map_err(spawn_err)?;

        let args = query.args();
        debug!(?args, "Running git log");
        let mut child = Command::new(&self.program)
            .args(&args)
            .current_dir(query.folder)
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr))
            .spawn()
            .map_err(spawn_err)?;

        let status = self.wait(&mut child, query.folder)?;

        let err_bytes = read_capture(&stderr_file).map_err(spawn_err)?;
        let err_text = String::from_utf8_lossy(&err_bytes).trim().to_string();
        if !err_text.is_empty() || !status.success() {
            let stderr = if err_text.is_empty() {
                status.to_string()
            } else {
                err_text
            };
            warn!(%stderr, "git log failed");
            return Err(PipelineError::ExternalTool {
                folder: query.folder.to_path_buf(),
                stderr,
            });
        }

        let out_bytes = read_capture(&stdout_file).map_err(spawn_err)?;
        debug!(bytes = out_bytes.len(), "git log finished");
        String::from_utf8(out_bytes).map_err(|err| StreamError::InvalidUtf8(err).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    fn query(folder: &Path) -> LogQuery<'_> {
        LogQuery {
            folder,
            after: NaiveDate::from_ymd_opt(2024, 2, 28).unwrap(),
            format: r#"{"commit": "%H"},"#,
            branches: None,
        }
    }

    #[test]
    fn test_args_current_branch() {
        let q = query(Path::new("/repo"));
        assert_eq!(
            q.args(),
            vec![
                "log".to_string(),
                r#"--pretty=format:{"commit": "%H"},"#.to_string(),
                "--after=2024-02-28".to_string(),
            ]
        );
    }

    #[test]
    fn test_args_with_branches() {
        let mut q = query(Path::new("/repo"));
        q.branches = Some("*");
        assert_eq!(q.args().last().map(String::as_str), Some("--branches=*"));
    }

    #[test]
    fn test_builder() {
        let git = GitCli::new().with_timeout(Some(Duration::from_secs(3)));
        assert_eq!(git.timeout(), Some(Duration::from_secs(3)));
        assert_eq!(GitCli::default().timeout(), None);
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let dir = tempfile::tempdir().unwrap();
        let git = GitCli::new().with_program("cwpl-no-such-program");
        let err = git.fetch(&query(dir.path())).expect_err("no program");
        assert!(matches!(err, PipelineError::Spawn { .. }));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_missing_folder_is_spawn_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone");
        let err = GitCli::new()
            .fetch(&query(&missing))
            .expect_err("no folder");
        assert!(matches!(err, PipelineError::Spawn { .. }));
    }

    /// Runs `sh log ...` so a `log` script in the folder stands in for git
    #[cfg(unix)]
    mod scripted {
        use super::*;
        use similar_asserts::assert_eq;

        fn sh_in(script: &str) -> (tempfile::TempDir, GitCli) {
            let dir = tempfile::tempdir().unwrap();
            std::fs::write(dir.path().join("log"), script).unwrap();
            (dir, GitCli::new().with_program("sh"))
        }

        #[test]
        fn test_stdout_is_returned() {
            let (dir, git) = sh_in("printf '%s' '{\"commit\": \"abc\"},'\n");
            let out = git.fetch(&query(dir.path())).expect("fetch");
            assert_eq!(out, r#"{"commit": "abc"},"#);
        }

        #[test]
        fn test_runs_in_target_folder() {
            let (dir, git) = sh_in("pwd\n");
            let out = git.fetch(&query(dir.path())).expect("fetch");
            let reported = std::fs::canonicalize(out.trim()).unwrap();
            assert_eq!(reported, std::fs::canonicalize(dir.path()).unwrap());
        }

        #[test]
        fn test_receives_arguments() {
            let (dir, git) = sh_in("printf '%s|' \"$@\"\n");
            let mut q = query(dir.path());
            q.branches = Some("main");
            let out = git.fetch(&q).expect("fetch");
            assert_eq!(
                out,
                r#"--pretty=format:{"commit": "%H"},|--after=2024-02-28|--branches=main|"#
            );
        }

        #[test]
        fn test_stderr_output_is_failure() {
            let (dir, git) = sh_in("echo '{}' ; echo 'fatal: not a git repository' >&2\n");
            let err = git.fetch(&query(dir.path())).expect_err("stderr");
            match err {
                PipelineError::ExternalTool { stderr, .. } => {
                    assert_eq!(stderr, "fatal: not a git repository");
                }
                other => panic!("Expected ExternalTool, got {other:?}"),
            }
        }

        #[test]
        fn test_nonzero_exit_is_failure() {
            let (dir, git) = sh_in("exit 3\n");
            let err = git.fetch(&query(dir.path())).expect_err("exit code");
            assert!(matches!(err, PipelineError::ExternalTool { .. }));
        }

        #[test]
        fn test_invalid_utf8_is_malformed_stream() {
            let (dir, git) = sh_in("printf '\\377\\376'\n");
            let err = git.fetch(&query(dir.path())).expect_err("bad utf8");
            assert!(matches!(
                err,
                PipelineError::MalformedLogStream(StreamError::InvalidUtf8(_))
            ));
        }

        #[test]
        fn test_timeout_kills_child() {
            let (dir, git) = sh_in("exec sleep 10\n");
            let git = git.with_timeout(Some(Duration::from_millis(200)));
            let start = Instant::now();
            let err = git.fetch(&query(dir.path())).expect_err("timeout");
            assert!(matches!(err, PipelineError::Timeout { .. }));
            assert!(err.is_recoverable());
            assert!(start.elapsed() < Duration::from_secs(5));
        }
    }
}
