//! DA-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::policy::parser::TimeUnit;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, DeleteAfterError>;

/// Top-level error type for delete-after.
#[derive(Debug, Error)]
pub enum DeleteAfterError {
    #[error("[DA-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[DA-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[DA-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[DA-1101] {path} is not a usable root directory: {reason}")]
    InvalidRootDirectory { path: PathBuf, reason: RootProblem },

    #[error("[DA-2001] invalid format in {path}: {content:?}, expected '<number> <unit>'")]
    MalformedPolicy { path: PathBuf, content: String },

    #[error(
        "[DA-2002] unknown unit {unit:?} in {path} (content {content:?}). Valid units: {}",
        TimeUnit::valid_units()
    )]
    UnknownUnit {
        path: PathBuf,
        unit: String,
        content: String,
    },

    #[error("[DA-2003] cannot read policy file {path}: {source}")]
    PolicyUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[DA-3001] cannot determine age of {path}: {source}")]
    FileAgeUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[DA-3002] failed to delete {path}: {source}")]
    DeletionFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[DA-3003] failed to walk directory {path}: {source}")]
    DirectoryWalkFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[DA-3900] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DeleteAfterError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "DA-1001",
            Self::MissingConfig { .. } => "DA-1002",
            Self::ConfigParse { .. } => "DA-1003",
            Self::InvalidRootDirectory { .. } => "DA-1101",
            Self::MalformedPolicy { .. } => "DA-2001",
            Self::UnknownUnit { .. } => "DA-2002",
            Self::PolicyUnreadable { .. } => "DA-2003",
            Self::FileAgeUnavailable { .. } => "DA-3001",
            Self::DeletionFailed { .. } => "DA-3002",
            Self::DirectoryWalkFailed { .. } => "DA-3003",
            Self::Io { .. } => "DA-3900",
        }
    }

    /// Whether the failure increments the scan's error counter.
    ///
    /// An unavailable file age only downgrades the file to "keep".
    #[must_use]
    pub const fn is_scan_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedPolicy { .. }
                | Self::UnknownUnit { .. }
                | Self::PolicyUnreadable { .. }
                | Self::DeletionFailed { .. }
                | Self::DirectoryWalkFailed { .. }
        )
    }

    /// Convenience constructor for IO errors with a known path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

/// Why a scan root failed the pre-flight check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RootProblem {
    Missing,
    NotADirectory,
    /// Any other stat failure, with the OS message.
    Inaccessible(String),
}

impl fmt::Display for RootProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => f.write_str("does not exist"),
            Self::NotADirectory => f.write_str("not a directory"),
            Self::Inaccessible(msg) => f.write_str(msg),
        }
    }
}

impl From<toml::de::Error> for DeleteAfterError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}
