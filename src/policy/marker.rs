//! `.delete_after` marker files: detection and reading.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::core::errors::{DeleteAfterError, Result};
use crate::policy::parser::{self, ParsedPolicy, PolicyParseError};

/// Filename whose presence makes a directory a policy root.
pub const MARKER_FILENAME: &str = ".delete_after";

/// A directory paired with the policy its marker declares.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyRoot {
    pub dir: PathBuf,
    pub declared: ParsedPolicy,
}

/// Path of the marker file for `dir`.
pub fn marker_path(dir: &Path) -> PathBuf {
    dir.join(MARKER_FILENAME)
}

/// Whether `dir` holds an entry named like the marker file.
///
/// Uses `symlink_metadata` so a dangling marker symlink still counts; reading
/// it will then fail as unreadable.
pub fn has_marker(dir: &Path) -> bool {
    match fs::symlink_metadata(marker_path(dir)) {
        Ok(_) => true,
        Err(err) => err.kind() != ErrorKind::NotFound && err.kind() != ErrorKind::NotADirectory,
    }
}

/// Read and parse the marker file in `dir`.
pub fn read_policy(dir: &Path) -> Result<PolicyRoot> {
    let path = marker_path(dir);
    let raw = fs::read_to_string(&path).map_err(|source| DeleteAfterError::PolicyUnreadable {
        path: path.clone(),
        source,
    })?;
    let content = raw.trim().to_string();

    let declared = parser::parse(&content).map_err(|err| match err {
        PolicyParseError::Malformed => DeleteAfterError::MalformedPolicy {
            path: path.clone(),
            content: content.clone(),
        },
        PolicyParseError::UnknownUnit { unit } => DeleteAfterError::UnknownUnit {
            path: path.clone(),
            unit,
            content: content.clone(),
        },
    })?;

    Ok(PolicyRoot {
        dir: dir.to_path_buf(),
        declared,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_marker(dir: &Path, content: &str) {
        fs::write(dir.join(MARKER_FILENAME), content).unwrap();
    }

    #[test]
    fn reads_valid_marker() {
        let dir = tempfile::tempdir().unwrap();
        write_marker(dir.path(), "7 days\n");
        let root = read_policy(dir.path()).unwrap();
        assert_eq!(root.dir, dir.path());
        assert_eq!(root.declared.policy.max_age_seconds(), 604_800);
        assert_eq!(root.declared.unit, parser::TimeUnit::Day);
    }

    #[test]
    fn malformed_marker_reports_path_and_content() {
        let dir = tempfile::tempdir().unwrap();
        write_marker(dir.path(), "  abc minutes  ");
        let err = read_policy(dir.path()).unwrap_err();
        match err {
            DeleteAfterError::MalformedPolicy { path, content } => {
                assert_eq!(path, dir.path().join(MARKER_FILENAME));
                assert_eq!(content, "abc minutes");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_unit_is_distinct_from_malformed() {
        let dir = tempfile::tempdir().unwrap();
        write_marker(dir.path(), "5 fortnights");
        let err = read_policy(dir.path()).unwrap_err();
        assert_eq!(err.code(), "DA-2002");
        assert!(err.is_scan_error());
    }

    #[test]
    fn missing_marker_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_policy(dir.path()).unwrap_err();
        assert!(matches!(err, DeleteAfterError::PolicyUnreadable { .. }));
    }

    #[test]
    fn marker_directory_is_detected_but_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join(MARKER_FILENAME)).unwrap();
        assert!(has_marker(dir.path()));
        let err = read_policy(dir.path()).unwrap_err();
        assert_eq!(err.code(), "DA-2003");
    }

    #[test]
    fn has_marker_false_for_plain_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("data.txt"), "x").unwrap();
        assert!(!has_marker(dir.path()));
    }

    #[test]
    #[cfg(unix)]
    fn dangling_marker_symlink_counts_as_present() {
        let dir = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink(
            dir.path().join("missing-target"),
            dir.path().join(MARKER_FILENAME),
        )
        .unwrap();
        assert!(has_marker(dir.path()));
        assert_eq!(read_policy(dir.path()).unwrap_err().code(), "DA-2003");
    }
}
