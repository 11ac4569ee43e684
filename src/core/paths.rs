//! Shared path utilities: root resolution, pre-flight validation, home expansion.

use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::core::errors::{DeleteAfterError, Result, RootProblem};

/// Canonicalize `path` and check that it names an existing directory.
///
/// This is the pre-flight check run before any scan starts. On failure the
/// reported path is absolute but not canonical.
pub fn validate_root_directory(path: &Path) -> Result<PathBuf> {
    let reject = |reason: RootProblem| DeleteAfterError::InvalidRootDirectory {
        path: std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf()),
        reason,
    };
    let canonical = fs::canonicalize(path).map_err(|err| match err.kind() {
        ErrorKind::NotFound | ErrorKind::NotADirectory => reject(RootProblem::Missing),
        _ => reject(RootProblem::Inaccessible(err.to_string())),
    })?;
    if canonical.is_dir() {
        Ok(canonical)
    } else {
        Err(DeleteAfterError::InvalidRootDirectory {
            path: canonical,
            reason: RootProblem::NotADirectory,
        })
    }
}

/// The invoking user's home directory, `/tmp` when `HOME` is unset.
pub fn home_dir() -> PathBuf {
    env::var_os("HOME")
        .filter(|h| !h.is_empty())
        .map_or_else(|| PathBuf::from("/tmp"), PathBuf::from)
}

/// Expand a leading `~` or `~/` to the home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => home_dir().join(rest),
        Err(_) => path.to_path_buf(),
    }
}
