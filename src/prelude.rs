//! Convenience re-exports for library consumers.
//!
//! ```rust,no_run
//! use delete_after::prelude::*;
//! ```

// Core
pub use crate::core::config::Config;
pub use crate::core::errors::{DeleteAfterError, Result, RootProblem};
pub use crate::core::paths::validate_root_directory;

// Policy
pub use crate::policy::marker::{MARKER_FILENAME, PolicyRoot, read_policy};
pub use crate::policy::parser::{
    ParsedPolicy, PolicyParseError, RetentionPolicy, TimeUnit, parse,
};

// Logger
pub use crate::logger::activity::{ActivityLogger, Level, LogSink, MemorySink, ScanEvent};
pub use crate::logger::file::{FileLogConfig, FileSink};

// Scanner
pub use crate::scanner::deletion::{DeletionConfig, DeletionExecutor};
pub use crate::scanner::stats::{PassOutcome, ScanStatistics};
pub use crate::scanner::walker::{ScanReport, TreeScanner};
