//! Diagnostic run summary, logged at the end of a pipeline run.

use serde::{Deserialize, Serialize};

/// A diagnostic record of one pipeline run: not a spec public output, just
/// ambient observability logged at `info` level once aggregation finishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Number of swaps discovered and processed.
    pub swap_count: u64,
    /// First block number covered by the batch.
    pub first_block: u64,
    /// Last block number covered by the batch.
    pub last_block: u64,
    /// Wall-clock time spent scanning, in milliseconds.
    pub scan_millis: u64,
    /// Wall-clock time spent driving swaps (decrypt + tree + prove), in
    /// milliseconds.
    pub swap_drive_millis: u64,
    /// Wall-clock time spent in recursive aggregation, in milliseconds.
    pub aggregation_millis: u64,
}

#[cfg(test)]
mod tests {
    use super::RunSummary;

    #[test]
    fn serde_round_trip() {
        let summary = RunSummary {
            swap_count: 6,
            first_block: 100,
            last_block: 142,
            scan_millis: 12,
            swap_drive_millis: 340,
            aggregation_millis: 58,
        };
        let json = serde_json::to_string(&summary).expect("serialize");
        let back: RunSummary = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, summary);
    }
}
