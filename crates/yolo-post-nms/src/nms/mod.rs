//! Suppression strategies

pub mod greedy;

pub use greedy::GreedyOverlapSuppressor;

use serde::{Deserialize, Serialize};

/// Counters describing what one suppression call did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuppressionReport {
    /// Records in the buffer
    pub boxes: usize,
    /// Box pairs whose overlap was measured
    pub pairs_evaluated: usize,
    /// Pairs whose overlap exceeded the threshold
    pub overlapping_pairs: usize,
    /// Class scores changed from nonzero to zero
    pub scores_zeroed: usize,
}

impl SuppressionReport {
    pub fn new(boxes: usize) -> Self {
        Self {
            boxes,
            ..Default::default()
        }
    }

    /// Accumulate another report, e.g. across a batch
    pub fn merge(&mut self, other: &SuppressionReport) {
        self.boxes += other.boxes;
        self.pairs_evaluated += other.pairs_evaluated;
        self.overlapping_pairs += other.overlapping_pairs;
        self.scores_zeroed += other.scores_zeroed;
    }
}
