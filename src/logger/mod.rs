//! Activity logging: typed scan events, pluggable sinks, append-only log file.

pub mod activity;
pub mod file;
