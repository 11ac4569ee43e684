//! Discovery walk: visits every directory under the scan root, finds policy
//! roots, and runs a scoped deletion pass for each one.
//!
//! Unlike the deletion pass, discovery never stops at policy boundaries: every
//! marker file is an independent policy root. Traversal uses an explicit
//! worklist, visits children in name order, and never follows directory
//! symlinks, so a symlink cycle cannot trap the walk.

#![allow(missing_docs)]

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime};

use serde::Serialize;

use crate::logger::activity::{ActivityLogger, ScanEvent};
use crate::policy::marker::{MARKER_FILENAME, marker_path, read_policy};
use crate::scanner::deletion::{DeletionConfig, DeletionExecutor, record_walk_failure};
use crate::scanner::stats::ScanStatistics;

/// Summary of a completed scan, as reported to the user.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub root: PathBuf,
    pub dry_run: bool,
    #[serde(flatten)]
    pub stats: ScanStatistics,
    pub elapsed_seconds: f64,
}

/// Single-threaded tree scanner.
pub struct TreeScanner<'a> {
    executor: DeletionExecutor,
    logger: &'a ActivityLogger,
}

impl<'a> TreeScanner<'a> {
    pub fn new(config: DeletionConfig, logger: &'a ActivityLogger) -> Self {
        Self {
            executor: DeletionExecutor::new(config),
            logger,
        }
    }

    /// Replace the wall clock used for file ages.
    #[must_use]
    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> SystemTime + Send + Sync + 'static,
    {
        self.executor = self.executor.with_clock(clock);
        self
    }

    /// Scan `root` with start/summary logging and timing.
    pub fn run(&self, root: &Path) -> ScanReport {
        let start = Instant::now();
        self.logger.log(&ScanEvent::ScanStarted { root });
        if self.executor.is_dry_run() {
            self.logger.log(&ScanEvent::DryRunMode);
        }

        let stats = self.scan(root);

        let elapsed = start.elapsed();
        self.logger.log(&ScanEvent::ScanCompleted {
            stats: &stats,
            elapsed,
        });
        self.logger.flush();

        ScanReport {
            root: root.to_path_buf(),
            dry_run: self.executor.is_dry_run(),
            stats,
            elapsed_seconds: elapsed.as_secs_f64(),
        }
    }

    /// Walk the whole tree under `root`. Never fails: every problem is logged
    /// and counted in the returned statistics.
    pub fn scan(&self, root: &Path) -> ScanStatistics {
        let mut stats = ScanStatistics::default();
        let mut pending: Vec<PathBuf> = vec![root.to_path_buf()];

        while let Some(dir) = pending.pop() {
            let Some(listing) = self.list_directory(&dir, &mut stats) else {
                continue;
            };
            stats.directories_scanned += 1;

            if listing.has_marker {
                stats.policy_files_found += 1;
                self.apply_policy(&dir, &mut stats);
            }

            pending.extend(listing.subdirs.into_iter().rev());
        }

        stats
    }

    fn apply_policy(&self, dir: &Path, stats: &mut ScanStatistics) {
        self.logger.log(&ScanEvent::PolicyFound { dir });
        match read_policy(dir) {
            Ok(root) => {
                self.logger.log(&ScanEvent::PolicyParsed {
                    marker: &marker_path(dir),
                    magnitude: root.declared.magnitude,
                    unit: root.declared.unit,
                    policy: root.declared.policy,
                });
                *stats += self.executor.run_pass(&root, self.logger);
            }
            Err(error) => {
                self.logger.log(&ScanEvent::Failure { error: &error });
                stats.errors += 1;
            }
        }
    }

    /// List one directory; `None` (with the error counted) if it can't be read.
    fn list_directory(&self, dir: &Path, stats: &mut ScanStatistics) -> Option<Listing> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(source) => {
                record_walk_failure(self.logger, dir, source);
                stats.errors += 1;
                return None;
            }
        };

        let mut listing = Listing::default();
        for entry_result in entries {
            let entry = match entry_result {
                Ok(entry) => entry,
                Err(source) => {
                    record_walk_failure(self.logger, dir, source);
                    stats.errors += 1;
                    return None;
                }
            };
            if entry.file_name() == MARKER_FILENAME {
                listing.has_marker = true;
            }
            // `file_type` does not follow symlinks.
            if entry.file_type().is_ok_and(|ft| ft.is_dir()) {
                listing.subdirs.push(entry.path());
            }
        }
        listing.subdirs.sort();
        Some(listing)
    }
}

#[derive(Debug, Default)]
struct Listing {
    has_marker: bool,
    subdirs: Vec<PathBuf>,
}
