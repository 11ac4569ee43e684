#![forbid(unsafe_code)]

//! delete-after: retention housekeeping driven by `.delete_after` marker files.
//!
//! A directory holding a `.delete_after` file (content such as `7 days` or
//! `2.5 hours`) is a policy root. Files below it that are older than the
//! declared period are removed, except inside subdirectories that declare a
//! policy of their own; those are separate policy roots.
//!
//! # Library usage
//!
//! ```rust,no_run
//! use delete_after::prelude::*;
//!
//! let logger = ActivityLogger::for_verbosity(false);
//! let stats = TreeScanner::new(DeletionConfig { dry_run: true }, &logger)
//!     .scan(std::path::Path::new("/data"));
//! println!("{} files would be deleted", stats.files_deleted);
//! ```

pub mod prelude;

pub mod core;
pub mod logger;
pub mod policy;
pub mod scanner;
