//! Scan counters.

use std::ops::AddAssign;

use serde::Serialize;

/// Totals accumulated over one scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanStatistics {
    /// Directories listed by the discovery walk.
    pub directories_scanned: u64,
    /// Marker files encountered, parseable or not.
    pub policy_files_found: u64,
    /// Files removed, or that would have been removed in dry-run mode.
    pub files_deleted: u64,
    pub errors: u64,
}

/// Result of one scoped deletion pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassOutcome {
    pub deleted: u64,
    pub errors: u64,
}

impl AddAssign<PassOutcome> for ScanStatistics {
    fn add_assign(&mut self, rhs: PassOutcome) {
        self.files_deleted += rhs.deleted;
        self.errors += rhs.errors;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pass_outcomes_accumulate() {
        let mut stats = ScanStatistics::default();
        stats += PassOutcome {
            deleted: 2,
            errors: 1,
        };
        stats += PassOutcome {
            deleted: 3,
            errors: 0,
        };
        assert_eq!(stats.files_deleted, 5);
        assert_eq!(stats.errors, 1);
        assert_eq!(stats.directories_scanned, 0);
    }

    #[test]
    fn serializes_with_stable_field_names() {
        let stats = ScanStatistics {
            directories_scanned: 4,
            policy_files_found: 2,
            files_deleted: 1,
            errors: 0,
        };
        let value = serde_json::to_value(stats).unwrap();
        assert_eq!(value["directories_scanned"], 4);
        assert_eq!(value["policy_files_found"], 2);
        assert_eq!(value["files_deleted"], 1);
        assert_eq!(value["errors"], 0);
    }
}
