//! Append-only human-readable log file with rotation and multi-level fallback.
//!
//! Each record is written as one line with a single `write_all`, so a run that
//! is interrupted keeps everything logged so far.
//!
//! Four-level fallback chain:
//! 1. Primary path (system-wide, used only when its directory is writable)
//! 2. Fallback path (per-user)
//! 3. stderr with `[DA-LOG]` prefix
//! 4. Silent discard (logging failures never abort a scan)

#![allow(missing_docs)]

use std::fs::{self, File, OpenOptions, rename};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::core::config::LoggingConfig;
use crate::core::errors::{DeleteAfterError, Result};
use crate::logger::activity::{LogRecord, LogSink};

/// Degradation state of the file writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriterState {
    Normal,
    Fallback,
    Stderr,
    Discard,
}

/// Configuration for the log file writer.
#[derive(Debug, Clone)]
pub struct FileLogConfig {
    pub path: PathBuf,
    pub fallback_path: Option<PathBuf>,
    /// Maximum file size before rotation (bytes).
    pub max_size_bytes: u64,
    /// Number of rotated files to keep; 0 truncates in place.
    pub max_rotated_files: u32,
}

impl From<&LoggingConfig> for FileLogConfig {
    fn from(cfg: &LoggingConfig) -> Self {
        Self {
            path: cfg.path.clone(),
            fallback_path: cfg.fallback_path.clone(),
            max_size_bytes: cfg.max_size_bytes,
            max_rotated_files: cfg.max_rotated_files,
        }
    }
}

struct FileWriter {
    config: FileLogConfig,
    file: Option<File>,
    state: WriterState,
    bytes_written: u64,
}

/// Log sink appending formatted records to a file.
pub struct FileSink {
    inner: Mutex<FileWriter>,
}

impl FileSink {
    /// Open the log file. Falls through the degradation chain on failure.
    pub fn open(config: FileLogConfig) -> Self {
        let mut w = FileWriter {
            config,
            file: None,
            state: WriterState::Discard,
            bytes_written: 0,
        };
        w.try_open_primary();
        Self {
            inner: Mutex::new(w),
        }
    }

    /// Current degradation state.
    pub fn state(&self) -> &'static str {
        match self.inner.lock().state {
            WriterState::Normal => "normal",
            WriterState::Fallback => "fallback",
            WriterState::Stderr => "stderr",
            WriterState::Discard => "discard",
        }
    }

    /// File currently receiving records, if any.
    pub fn active_path(&self) -> Option<PathBuf> {
        let w = self.inner.lock();
        match w.state {
            WriterState::Normal => Some(w.config.path.clone()),
            WriterState::Fallback => w.config.fallback_path.clone(),
            WriterState::Stderr | WriterState::Discard => None,
        }
    }
}

impl LogSink for FileSink {
    fn write(&self, record: &LogRecord) {
        let line = format!("{}\n", record.format_line());
        self.inner.lock().write_line(&line);
    }

    fn flush(&self) {
        if let Some(f) = self.inner.lock().file.as_mut() {
            let _ = f.flush();
        }
    }
}

impl FileWriter {
    fn write_line(&mut self, line: &str) {
        if self.bytes_written + line.len() as u64 > self.config.max_size_bytes
            && matches!(self.state, WriterState::Normal | WriterState::Fallback)
        {
            self.rotate();
        }

        match self.state {
            WriterState::Normal | WriterState::Fallback => {
                if let Some(f) = self.file.as_mut() {
                    if f.write_all(line.as_bytes()).is_err() {
                        self.degrade();
                        self.write_line(line);
                        return;
                    }
                    self.bytes_written += line.len() as u64;
                } else {
                    self.degrade();
                    self.write_line(line);
                }
            }
            WriterState::Stderr => {
                let _ = write!(io::stderr(), "[DA-LOG] {line}");
            }
            WriterState::Discard => {}
        }
    }

    fn try_open_primary(&mut self) {
        if !parent_writable(&self.config.path) {
            self.try_open_fallback();
            return;
        }
        match open_append(&self.config.path) {
            Ok((file, size)) => {
                self.file = Some(file);
                self.state = WriterState::Normal;
                self.bytes_written = size;
            }
            Err(_) => self.try_open_fallback(),
        }
    }

    fn try_open_fallback(&mut self) {
        let Some(fb) = self.config.fallback_path.clone() else {
            self.state = WriterState::Stderr;
            let _ = writeln!(
                io::stderr(),
                "[DA-LOG] {} is not writable and no fallback configured, using stderr",
                self.config.path.display()
            );
            return;
        };
        match open_append(&fb) {
            Ok((file, size)) => {
                self.file = Some(file);
                self.state = WriterState::Fallback;
                self.bytes_written = size;
            }
            Err(err) => {
                self.state = WriterState::Stderr;
                let _ = writeln!(
                    io::stderr(),
                    "[DA-LOG] both log paths failed ({err}), using stderr"
                );
            }
        }
    }

    fn degrade(&mut self) {
        self.file = None;
        match self.state {
            WriterState::Normal => self.try_open_fallback(),
            WriterState::Fallback => {
                self.state = WriterState::Stderr;
                let _ = writeln!(io::stderr(), "[DA-LOG] fallback write failed, using stderr");
            }
            WriterState::Stderr => self.state = WriterState::Discard,
            WriterState::Discard => {}
        }
    }

    fn rotate(&mut self) {
        self.file = None;

        let base = match self.state {
            WriterState::Normal => self.config.path.clone(),
            WriterState::Fallback => match &self.config.fallback_path {
                Some(p) => p.clone(),
                None => return,
            },
            WriterState::Stderr | WriterState::Discard => return,
        };

        if self.config.max_rotated_files == 0 {
            let _ = fs::remove_file(&base);
        } else {
            // .N-1 → .N, …, .1 → .2, current → .1; the oldest falls off.
            let _ = fs::remove_file(rotated_name(&base, self.config.max_rotated_files));
            for i in (1..self.config.max_rotated_files).rev() {
                let _ = rename(rotated_name(&base, i), rotated_name(&base, i + 1));
            }
            let _ = rename(&base, rotated_name(&base, 1));
        }

        match open_append(&base) {
            Ok((file, _)) => {
                self.file = Some(file);
                self.bytes_written = 0;
            }
            Err(_) => self.degrade(),
        }
    }
}

#[cfg(unix)]
fn parent_writable(path: &Path) -> bool {
    use nix::unistd::{AccessFlags, access};

    match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        // A missing parent is created by `open_append`; let that decide.
        Some(parent) if parent.exists() => access(parent, AccessFlags::W_OK).is_ok(),
        _ => true,
    }
}

#[cfg(not(unix))]
fn parent_writable(_path: &Path) -> bool {
    true
}

/// Open or create a file for appending. Returns `(File, current_size)`.
fn open_append(path: &Path) -> Result<(File, u64)> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| DeleteAfterError::io(parent, source))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| DeleteAfterError::io(path, source))?;
    let size = file.metadata().map(|m| m.len()).unwrap_or(0);
    Ok((file, size))
}

/// `delete_after.log` → `delete_after.log.3`.
fn rotated_name(base: &Path, index: u32) -> PathBuf {
    let mut name = base.as_os_str().to_owned();
    name.push(format!(".{index}"));
    PathBuf::from(name)
}
