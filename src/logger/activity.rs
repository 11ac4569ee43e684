//! Activity logger: typed scan events rendered to human-readable records and
//! fanned out to pluggable sinks.
//!
//! The logger is built once per invocation and handed to the scanner by
//! reference. Sinks take `&self` and manage their own interior mutability, so
//! a single logger can be shared by every stage of a scan.

#![allow(missing_docs)]

use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};
use parking_lot::Mutex;

use crate::core::errors::DeleteAfterError;
use crate::policy::marker::MARKER_FILENAME;
use crate::policy::parser::{RetentionPolicy, TimeUnit};
use crate::scanner::stats::ScanStatistics;

/// Logger name stamped on every record.
pub const LOGGER_NAME: &str = "delete_after";

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Record severity, ordered from most to least verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Debug,
    Info,
    Warning,
    Error,
}

impl Level {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the scanner reports while it works.
#[derive(Debug)]
pub enum ScanEvent<'a> {
    ScanStarted {
        root: &'a Path,
    },
    DryRunMode,
    PolicyFound {
        dir: &'a Path,
    },
    PolicyParsed {
        marker: &'a Path,
        magnitude: f64,
        unit: TimeUnit,
        policy: RetentionPolicy,
    },
    BoundarySkipped {
        dir: &'a Path,
    },
    FileKept {
        path: &'a Path,
        age_seconds: u64,
        policy: RetentionPolicy,
    },
    FileDeleted {
        path: &'a Path,
        age_seconds: u64,
        policy: RetentionPolicy,
    },
    WouldDelete {
        path: &'a Path,
        age_seconds: u64,
        policy: RetentionPolicy,
    },
    /// Any recorded failure; severity follows whether it counts as a scan error.
    Failure {
        error: &'a DeleteAfterError,
    },
    ScanCompleted {
        stats: &'a ScanStatistics,
        elapsed: Duration,
    },
}

impl ScanEvent<'_> {
    #[must_use]
    pub fn level(&self) -> Level {
        match self {
            Self::PolicyFound { .. }
            | Self::PolicyParsed { .. }
            | Self::BoundarySkipped { .. }
            | Self::FileKept { .. } => Level::Debug,
            Self::ScanStarted { .. }
            | Self::DryRunMode
            | Self::FileDeleted { .. }
            | Self::WouldDelete { .. }
            | Self::ScanCompleted { .. } => Level::Info,
            Self::Failure { error } if error.is_scan_error() => Level::Error,
            Self::Failure { .. } => Level::Warning,
        }
    }
}

impl fmt::Display for ScanEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ScanStarted { root } => write!(f, "Starting scan of {}", root.display()),
            Self::DryRunMode => f.write_str("Running in DRY RUN mode - no files will be deleted"),
            Self::PolicyFound { dir } => {
                write!(f, "Found {MARKER_FILENAME} file in {}", dir.display())
            }
            Self::PolicyParsed {
                marker,
                magnitude,
                unit,
                policy,
            } => write!(
                f,
                "Parsed {}: {magnitude} {unit} = {} seconds",
                marker.display(),
                policy.max_age_seconds()
            ),
            Self::BoundarySkipped { dir } => write!(
                f,
                "Skipping {} - has its own {MARKER_FILENAME} file",
                dir.display()
            ),
            Self::FileKept {
                path,
                age_seconds,
                policy,
            } => write!(
                f,
                "Keeping {} ({})",
                path.display(),
                age_detail(*age_seconds, *policy)
            ),
            Self::FileDeleted {
                path,
                age_seconds,
                policy,
            } => write!(
                f,
                "Deleted {} ({})",
                path.display(),
                age_detail(*age_seconds, *policy)
            ),
            Self::WouldDelete {
                path,
                age_seconds,
                policy,
            } => write!(
                f,
                "[DRY RUN] Would delete {} ({})",
                path.display(),
                age_detail(*age_seconds, *policy)
            ),
            Self::Failure { error } => write!(f, "{error}"),
            Self::ScanCompleted { stats, elapsed } => write!(
                f,
                "Scan completed in {:.2}s - Directories: {}, Delete-after files: {}, \
                 Files deleted: {}, Errors: {}",
                elapsed.as_secs_f64(),
                stats.directories_scanned,
                stats.policy_files_found,
                stats.files_deleted,
                stats.errors
            ),
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn age_detail(age_seconds: u64, policy: RetentionPolicy) -> String {
    format!(
        "age: {:.1} days, limit: {:.1} days",
        age_seconds as f64 / SECONDS_PER_DAY,
        policy.max_age_seconds() as f64 / SECONDS_PER_DAY
    )
}

/// One rendered log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub ts: DateTime<Local>,
    pub level: Level,
    pub message: String,
}

impl LogRecord {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            ts: Local::now(),
            level,
            message: message.into(),
        }
    }

    /// `2026-01-02 03:04:05,678 - delete_after - INFO - message`
    #[must_use]
    pub fn format_line(&self) -> String {
        format!(
            "{} - {LOGGER_NAME} - {} - {}",
            self.ts.format("%Y-%m-%d %H:%M:%S,%3f"),
            self.level,
            self.message
        )
    }
}

/// Destination for log records.
pub trait LogSink {
    fn write(&self, record: &LogRecord);

    fn flush(&self) {}
}

/// Level-filtered fan-out to a set of sinks.
pub struct ActivityLogger {
    min_level: Level,
    sinks: Vec<Box<dyn LogSink>>,
}

impl ActivityLogger {
    pub fn new(min_level: Level) -> Self {
        Self {
            min_level,
            sinks: Vec::new(),
        }
    }

    /// Logger that drops everything.
    pub fn disabled() -> Self {
        Self::new(Level::Error)
    }

    /// `Debug` when verbose, `Info` otherwise.
    pub fn for_verbosity(verbose: bool) -> Self {
        Self::new(if verbose { Level::Debug } else { Level::Info })
    }

    #[must_use]
    pub fn with_sink<S: LogSink + 'static>(mut self, sink: S) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    pub fn enabled(&self, level: Level) -> bool {
        level >= self.min_level && !self.sinks.is_empty()
    }

    /// Render and dispatch an event if its level passes the filter.
    pub fn log(&self, event: &ScanEvent<'_>) {
        let level = event.level();
        if !self.enabled(level) {
            return;
        }
        self.write_record(&LogRecord::new(level, event.to_string()));
    }

    pub fn flush(&self) {
        for sink in &self.sinks {
            sink.flush();
        }
    }

    fn write_record(&self, record: &LogRecord) {
        for sink in &self.sinks {
            sink.write(record);
        }
    }
}

impl fmt::Debug for ActivityLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActivityLogger")
            .field("min_level", &self.min_level)
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

/// Captures records in memory. Clones share one buffer.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<LogRecord>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.records
            .lock()
            .iter()
            .map(|r| r.message.clone())
            .collect()
    }

    /// Whether any message at `level` contains `needle`.
    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.records
            .lock()
            .iter()
            .any(|r| r.level == level && r.message.contains(needle))
    }
}

impl LogSink for MemorySink {
    fn write(&self, record: &LogRecord) {
        self.records.lock().push(record.clone());
    }
}
