//! Integration tests: CLI smoke tests and full-pipeline scan scenarios.

mod common;

use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};

use delete_after::core::errors::DeleteAfterError;
use delete_after::logger::activity::{ActivityLogger, Level, MemorySink};
use delete_after::logger::file::{FileLogConfig, FileSink};
use delete_after::policy::marker::read_policy;
use delete_after::policy::parser::TimeUnit;
use delete_after::scanner::deletion::DeletionConfig;
use delete_after::scanner::walker::TreeScanner;
use serde_json::Value;

use common::{write_aged_file, write_marker};

const MINUTE: Duration = Duration::from_secs(60);
const HOUR: Duration = Duration::from_secs(3_600);
const DAY: Duration = Duration::from_secs(86_400);

fn log_arg(dir: &Path) -> String {
    dir.join("delete_after.log").display().to_string()
}

// ──────────────────── CLI ────────────────────

#[test]
fn version_flag_prints_name_and_version() {
    let home = tempfile::tempdir().unwrap();
    let result = common::run_cli_case("version_flag", home.path(), &["--version"]);
    assert!(result.status.success(), "log: {}", result.log_path.display());
    assert_eq!(
        result.stdout.trim(),
        format!("delete-after {}", env!("CARGO_PKG_VERSION"))
    );
}

#[test]
fn help_lists_marker_format() {
    let home = tempfile::tempdir().unwrap();
    let result = common::run_cli_case("help_lists_marker_format", home.path(), &["--help"]);
    assert!(result.status.success());
    assert!(result.stdout.contains("--dry-run"));
    assert!(result.stdout.contains(".delete_after file format"));
}

#[test]
fn missing_root_exits_with_error() {
    let home = tempfile::tempdir().unwrap();
    let missing = home.path().join("nope");
    let log = log_arg(home.path());
    let result = common::run_cli_case(
        "missing_root",
        home.path(),
        &[missing.to_str().unwrap(), "--log-file", &log],
    );
    assert_eq!(result.status.code(), Some(1), "log: {}", result.log_path.display());
    assert!(result.stderr.contains("Error: Directory"));
    assert!(result.stderr.contains("does not exist"));
}

#[test]
fn file_root_exits_with_error() {
    let home = tempfile::tempdir().unwrap();
    let file = home.path().join("plain.txt");
    fs::write(&file, "x").unwrap();
    let log = log_arg(home.path());
    let result = common::run_cli_case(
        "file_root",
        home.path(),
        &[file.to_str().unwrap(), "--log-file", &log],
    );
    assert_eq!(result.status.code(), Some(1));
    assert!(result.stderr.contains("is not a directory"));
}

#[test]
fn cli_deletes_expired_files_and_logs_to_file() {
    let home = tempfile::tempdir().unwrap();
    let data = tempfile::tempdir().unwrap();
    write_marker(data.path(), "1 day");
    write_aged_file(&data.path().join("old.log"), 2 * DAY);
    write_aged_file(&data.path().join("new.log"), HOUR);
    let log = log_arg(home.path());

    let result = common::run_cli_case(
        "cli_deletes_expired",
        home.path(),
        &[data.path().to_str().unwrap(), "--log-file", &log],
    );

    assert!(result.status.success(), "log: {}", result.log_path.display());
    assert!(!data.path().join("old.log").exists());
    assert!(data.path().join("new.log").exists());
    assert!(data.path().join(".delete_after").exists());
    assert!(result.stdout.contains("Deleted "));

    let contents = fs::read_to_string(&log).unwrap();
    assert!(contents.contains(" - delete_after - INFO - Starting scan of "));
    assert!(contents.contains("Files deleted: 1, Errors: 0"));
}

#[test]
fn cli_dry_run_keeps_files_and_reports_json() {
    let home = tempfile::tempdir().unwrap();
    let data = tempfile::tempdir().unwrap();
    write_marker(data.path(), "30 minutes");
    write_aged_file(&data.path().join("a/old.bin"), HOUR);
    let log = log_arg(home.path());

    let result = common::run_cli_case(
        "cli_dry_run_json",
        home.path(),
        &[
            data.path().to_str().unwrap(),
            "--dry-run",
            "--json",
            "--log-file",
            &log,
        ],
    );

    assert!(result.status.success(), "log: {}", result.log_path.display());
    assert!(data.path().join("a/old.bin").exists());
    let report: Value = serde_json::from_str(result.stdout.trim()).unwrap();
    assert_eq!(report["dry_run"], true);
    assert_eq!(report["files_deleted"], 1);
    assert_eq!(report["policy_files_found"], 1);
    assert_eq!(report["directories_scanned"], 2);
    assert_eq!(report["errors"], 0);

    let contents = fs::read_to_string(&log).unwrap();
    assert!(contents.contains("[DRY RUN] Would delete "));
}

#[test]
fn cli_malformed_marker_is_not_fatal() {
    let home = tempfile::tempdir().unwrap();
    let data = tempfile::tempdir().unwrap();
    write_marker(data.path(), "abc minutes");
    write_aged_file(&data.path().join("old.txt"), 100 * DAY);
    let log = log_arg(home.path());

    let result = common::run_cli_case(
        "cli_malformed_marker",
        home.path(),
        &[data.path().to_str().unwrap(), "--json", "--log-file", &log],
    );

    assert!(result.status.success());
    assert!(data.path().join("old.txt").exists());
    let report: Value = serde_json::from_str(result.stdout.trim()).unwrap();
    assert_eq!(report["errors"], 1);
    assert_eq!(report["files_deleted"], 0);
}

// ──────────────────── library pipeline ────────────────────

#[test]
fn nested_policies_apply_independently() {
    let data = tempfile::tempdir().unwrap();
    let root = data.path();
    write_marker(root, "1 day");
    write_aged_file(&root.join("a.txt"), 2 * DAY);
    write_aged_file(&root.join("b.txt"), HOUR);
    write_marker(&root.join("sub"), "1 hour");
    write_aged_file(&root.join("sub/c.txt"), 3 * HOUR);
    write_aged_file(&root.join("sub/d.txt"), 10 * MINUTE);

    let sink = MemorySink::new();
    let logger = ActivityLogger::for_verbosity(true).with_sink(sink.clone());
    let report = TreeScanner::new(DeletionConfig { dry_run: false }, &logger).run(root);

    assert!(!root.join("a.txt").exists());
    assert!(root.join("b.txt").exists());
    assert!(!root.join("sub/c.txt").exists());
    assert!(root.join("sub/d.txt").exists());
    assert_eq!(report.stats.directories_scanned, 2);
    assert_eq!(report.stats.policy_files_found, 2);
    assert_eq!(report.stats.files_deleted, 2);
    assert_eq!(report.stats.errors, 0);
    assert!(sink.contains(Level::Debug, "has its own .delete_after file"));
}

#[test]
fn zero_threshold_deletes_everything_older_than_a_second() {
    let data = tempfile::tempdir().unwrap();
    write_marker(data.path(), "0 minutes");
    write_aged_file(&data.path().join("x.tmp"), Duration::from_secs(5));

    let fixed = SystemTime::now();
    let logger = ActivityLogger::disabled();
    let stats = TreeScanner::new(DeletionConfig { dry_run: false }, &logger)
        .with_clock(move || fixed)
        .scan(data.path());

    assert!(!data.path().join("x.tmp").exists());
    assert_eq!(stats.files_deleted, 1);
    assert!(data.path().join(".delete_after").exists());
}

#[test]
fn unknown_unit_surfaces_as_typed_error() {
    let data = tempfile::tempdir().unwrap();
    write_marker(data.path(), "5 fortnights");

    let err = read_policy(data.path()).unwrap_err();
    assert!(matches!(err, DeleteAfterError::UnknownUnit { ref unit, .. } if unit == "fortnights"));
    assert!(err.is_scan_error());
}

#[test]
fn fractional_units_and_abbreviations_parse_through_markers() {
    let data = tempfile::tempdir().unwrap();
    write_marker(data.path(), "  2.5 HR \n");
    let root = read_policy(data.path()).unwrap();
    assert_eq!(root.declared.policy.max_age_seconds(), 9_000);
    assert_eq!(root.declared.unit, TimeUnit::Hour);
    assert_eq!(root.dir, data.path());
}

#[test]
fn file_sink_records_scan_in_log_format() {
    let data = tempfile::tempdir().unwrap();
    let logs = tempfile::tempdir().unwrap();
    let log_path = logs.path().join("scan.log");
    write_marker(data.path(), "1 week");

    {
        let logger = ActivityLogger::for_verbosity(false).with_sink(FileSink::open(
            FileLogConfig {
                path: log_path.clone(),
                fallback_path: None,
                max_size_bytes: 1024 * 1024,
                max_rotated_files: 1,
            },
        ));
        TreeScanner::new(DeletionConfig { dry_run: true }, &logger).run(data.path());
    }

    let contents = fs::read_to_string(&log_path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert!(lines.len() >= 3);
    assert!(lines[0].contains(" - delete_after - INFO - Starting scan of "));
    assert!(lines[1].ends_with("Running in DRY RUN mode - no files will be deleted"));
    assert!(lines.last().unwrap().contains("Scan completed in "));
}
