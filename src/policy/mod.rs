//! Retention policies: marker-file grammar and marker discovery.

pub mod marker;
pub mod parser;
