//! Tree scanner: discovery walk, scoped deletion passes, statistics.

pub mod deletion;
pub mod stats;
pub mod walker;
