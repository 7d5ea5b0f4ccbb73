// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! End-to-end tests of the subcommands with canned git output

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;
use cwpl::app::execute;
use cwpl::config::Config;
use cwpl_log::{LogQuery, LogSource, PipelineError};
use similar_asserts::assert_eq;

const STREAM: &str = concat!(
    r#"{"commit": "aaa1111", "author": "Jane Doe", "date": "Mon Jan 01 10:00:00 2001 +0000", "message": "First-fix"},"#,
    "\n",
    r#"{"commit": "bbb2222", "author": "Bob", "date": "Mon Jan 01 11:00:00 2001 +0000", "message": "Bob-change"},"#,
    "\n",
    r#"{"commit": "ccc3333", "author": "Jane Doe", "date": "Tue Jan 02 09:00:00 2001 +0000", "message": "Second-fix"},"#,
);

/// Same output for every folder
struct Canned;

impl LogSource for Canned {
    fn fetch(&self, _query: &LogQuery<'_>) -> Result<String, PipelineError> {
        Ok(STREAM.to_string())
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2001, 1, 20).unwrap()
}

fn run_cli(args: &[String]) -> anyhow::Result<String> {
    let mut argv = vec!["cwpl".to_string()];
    argv.extend_from_slice(args);
    let config = Config::try_parse_from(argv)?;
    let mut out = Vec::new();
    execute(&config, &Canned, today(), &mut out)?;
    Ok(String::from_utf8(out)?)
}

fn args(folder: &std::path::Path, rest: &[&str]) -> Vec<String> {
    let mut v = vec![
        "--folder".to_string(),
        folder.display().to_string(),
        "--author".to_string(),
        "Jane".to_string(),
    ];
    v.extend(rest.iter().map(|s| s.to_string()));
    v
}

#[test]
fn test_report_to_stdout_newest_first() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_cli(&args(dir.path(), &["report"])).expect("report");
    assert_eq!(
        out,
        "*Commit*: ccc3333\n*Date*: Tue Jan 02 09:00:00 2001 +0000\n\nSecond-fix\n\
         *Commit*: aaa1111\n*Date*: Mon Jan 01 10:00:00 2001 +0000\n\nFirst-fix\n"
    );
}

#[test]
fn test_report_appends_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let report = dir.path().join("report.md");
    std::fs::write(&report, "# January\n").unwrap();

    let out = run_cli(&args(
        dir.path(),
        &["--entry-format", r"- {message}\n", "report", "--output", &report.display().to_string()],
    ))
    .expect("report");
    assert!(out.is_empty());
    assert_eq!(
        std::fs::read_to_string(&report).unwrap(),
        "# January\n- Second-fix\n- First-fix\n"
    );
}

#[test]
fn test_report_unknown_field_fails() {
    let dir = tempfile::tempdir().unwrap();
    let err = run_cli(&args(dir.path(), &["--entry-format", "{sha}", "report"]))
        .expect_err("unknown field");
    assert!(err.to_string().contains("unknown field {sha}"));
}

#[test]
fn test_list_json_sorted_by_message() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_cli(&args(dir.path(), &["--sort", "message", "list", "--format", "json"]))
        .expect("list");
    let parsed: serde_json::Value = serde_json::from_str(&out).expect("json");
    let ids: Vec<&str> = parsed
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["commit_id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["aaa1111", "ccc3333"]);
}

#[test]
fn test_list_table_is_default() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_cli(&args(dir.path(), &[])).expect("list");
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("date"));
    assert!(lines[2].contains("ccc3333"));
}

#[test]
fn test_missing_folder_fails() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("gone");
    let err = run_cli(&args(&missing, &["list"])).expect_err("missing folder");
    assert!(err.to_string().starts_with("folders not found"));
}

#[test]
fn test_no_folder_fails() {
    let err = run_cli(&["list".to_string()]).expect_err("no folders");
    assert!(err.to_string().contains("no folders given"));
}

#[test]
fn test_check_reports_each_item() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_cli(&args(dir.path(), &["check"])).expect("check");
    assert!(out.contains(&format!("folder {}: ok", dir.path().display())));
    assert!(out.contains("log format: ok (author, commit, date, message)"));
    assert!(out.contains("entry format: ok"));
}

#[test]
fn test_check_fails_on_problems() {
    let dir = tempfile::tempdir().unwrap();
    let missing: PathBuf = dir.path().join("gone");
    let config = Config::try_parse_from([
        "cwpl".to_string(),
        "-f".to_string(),
        missing.display().to_string(),
        "--log-format".to_string(),
        r#"{"commit": "%H"}"#.to_string(),
        "check".to_string(),
    ])
    .unwrap();
    let mut out = Vec::new();
    let err = execute(&config, &Canned, today(), &mut out).expect_err("problems");
    assert_eq!(err.to_string(), "2 problem(s) found");
    let out = String::from_utf8(out).unwrap();
    assert!(out.contains("missing"));
    assert!(out.contains("must end with ','"));
}
