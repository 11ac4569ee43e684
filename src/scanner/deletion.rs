//! Scoped deletion pass: removes expired files under one policy root.
//!
//! The pass walks the policy root with an explicit worklist. A subdirectory
//! that holds its own marker file is a boundary: it is dropped from the
//! worklist, so neither its files nor its descendants are touched by this
//! pass. The discovery walk handles it as a separate policy root.
//!
//! Failures are terminal for the smallest enclosing unit of work (one file or
//! one directory listing) and reported as counts, never propagated.

#![allow(missing_docs)]

use std::fs::{self, DirEntry, FileType, Metadata};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use crate::core::errors::DeleteAfterError;
use crate::logger::activity::{ActivityLogger, ScanEvent};
use crate::policy::marker::{MARKER_FILENAME, PolicyRoot, has_marker};
use crate::policy::parser::RetentionPolicy;
use crate::scanner::stats::PassOutcome;

/// Source of "now" for age computation.
pub type Clock = Arc<dyn Fn() -> SystemTime + Send + Sync>;

/// Configuration for the deletion executor.
#[derive(Debug, Clone, Default)]
pub struct DeletionConfig {
    /// Log and count qualifying files without removing them.
    pub dry_run: bool,
}

/// What happened to one candidate file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileOutcome {
    Kept,
    Deleted,
    Failed,
}

/// Runs scoped deletion passes.
pub struct DeletionExecutor {
    config: DeletionConfig,
    clock: Clock,
}

impl DeletionExecutor {
    pub fn new(config: DeletionConfig) -> Self {
        Self {
            config,
            clock: Arc::new(SystemTime::now),
        }
    }

    /// Replace the wall clock used for file ages.
    #[must_use]
    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> SystemTime + Send + Sync + 'static,
    {
        self.clock = Arc::new(clock);
        self
    }

    pub fn is_dry_run(&self) -> bool {
        self.config.dry_run
    }

    /// Delete every expired file governed by `root`.
    pub fn run_pass(&self, root: &PolicyRoot, logger: &ActivityLogger) -> PassOutcome {
        let mut outcome = PassOutcome::default();
        let mut pending: Vec<PathBuf> = vec![root.dir.clone()];

        while let Some(dir) = pending.pop() {
            if dir != root.dir && has_marker(&dir) {
                logger.log(&ScanEvent::BoundarySkipped { dir: &dir });
                continue;
            }

            let entries = match fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(source) => {
                    record_walk_failure(logger, &dir, source);
                    outcome.errors += 1;
                    continue;
                }
            };

            let mut children: Vec<PathBuf> = Vec::new();
            let mut abandoned = false;
            for entry_result in entries {
                let entry = match entry_result {
                    Ok(entry) => entry,
                    Err(source) => {
                        record_walk_failure(logger, &dir, source);
                        outcome.errors += 1;
                        abandoned = true;
                        break;
                    }
                };

                if entry.file_name() == MARKER_FILENAME {
                    continue;
                }

                let path = entry.path();
                let file_type = match entry.file_type() {
                    Ok(ft) => ft,
                    Err(source) => {
                        record_age_unavailable(logger, &path, source);
                        continue;
                    }
                };

                if file_type.is_dir() {
                    children.push(path);
                    continue;
                }

                match self.process_file(&entry, &path, file_type, root.declared.policy, logger) {
                    FileOutcome::Kept => {}
                    FileOutcome::Deleted => outcome.deleted += 1,
                    FileOutcome::Failed => outcome.errors += 1,
                }
            }

            if !abandoned {
                children.sort();
                pending.extend(children.into_iter().rev());
            }
        }

        outcome
    }

    fn process_file(
        &self,
        entry: &DirEntry,
        path: &Path,
        file_type: FileType,
        policy: RetentionPolicy,
        logger: &ActivityLogger,
    ) -> FileOutcome {
        // Symlinks are judged by their target; directory symlinks are never
        // entered and never removed.
        let metadata = if file_type.is_symlink() {
            fs::metadata(path)
        } else {
            entry.metadata()
        };
        let metadata = match metadata {
            Ok(m) => m,
            Err(source) => {
                record_age_unavailable(logger, path, source);
                return FileOutcome::Kept;
            }
        };
        if !metadata.is_file() {
            return FileOutcome::Kept;
        }

        let age_seconds = match self.age_of(&metadata) {
            Ok(age) => age,
            Err(source) => {
                record_age_unavailable(logger, path, source);
                return FileOutcome::Kept;
            }
        };

        if !policy.is_expired(age_seconds) {
            logger.log(&ScanEvent::FileKept {
                path,
                age_seconds,
                policy,
            });
            return FileOutcome::Kept;
        }

        if self.config.dry_run {
            logger.log(&ScanEvent::WouldDelete {
                path,
                age_seconds,
                policy,
            });
            return FileOutcome::Deleted;
        }

        match fs::remove_file(path) {
            Ok(()) => {
                logger.log(&ScanEvent::FileDeleted {
                    path,
                    age_seconds,
                    policy,
                });
                FileOutcome::Deleted
            }
            Err(source) => {
                let error = DeleteAfterError::DeletionFailed {
                    path: path.to_path_buf(),
                    source,
                };
                logger.log(&ScanEvent::Failure { error: &error });
                FileOutcome::Failed
            }
        }
    }

    fn age_of(&self, metadata: &Metadata) -> std::io::Result<u64> {
        let modified = metadata.modified()?;
        Ok(age_seconds(modified, (self.clock)()))
    }
}

/// Whole seconds between `modified` and `now`; 0 for future timestamps.
pub fn age_seconds(modified: SystemTime, now: SystemTime) -> u64 {
    now.duration_since(modified).map_or(0, |d| d.as_secs())
}

pub(crate) fn record_walk_failure(logger: &ActivityLogger, dir: &Path, source: std::io::Error) {
    let error = DeleteAfterError::DirectoryWalkFailed {
        path: dir.to_path_buf(),
        source,
    };
    logger.log(&ScanEvent::Failure { error: &error });
}

fn record_age_unavailable(logger: &ActivityLogger, path: &Path, source: std::io::Error) {
    let error = DeleteAfterError::FileAgeUnavailable {
        path: path.to_path_buf(),
        source,
    };
    logger.log(&ScanEvent::Failure { error: &error });
}
