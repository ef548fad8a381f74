//! Greedy per-class suppression in network emission order

use yolo_post_core::PredictionBuffer;

use super::SuppressionReport;
use crate::bbox::{OverlapMetric, corner_boxes};
use crate::traits::SuppressionStrategy;

/// Forces the lower of two same-class scores to zero whenever the two boxes overlap by
/// more than the threshold.
///
/// Boxes are visited in buffer order, not by confidence. For each box `i` every later box
/// `j` is compared once; per class, `score[i]` is zeroed if it is strictly lower, otherwise
/// `score[j]` is zeroed, so ties keep the earlier box. Scores zeroed by earlier boxes take
/// part in later comparisons as zero, which makes a second pass a no-op.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GreedyOverlapSuppressor {
    metric: OverlapMetric,
}

impl GreedyOverlapSuppressor {
    pub fn new(metric: OverlapMetric) -> Self {
        Self { metric }
    }

    /// Plain IoU overlap (darknet `greedynms`)
    pub fn iou() -> Self {
        Self::new(OverlapMetric::Iou)
    }

    /// Distance-aware overlap, accepted under the darknet `diounms` name with `beta_nms = 1`
    pub fn diou() -> Self {
        Self::new(OverlapMetric::Diou)
    }

    pub fn metric(&self) -> OverlapMetric {
        self.metric
    }

    /// Run suppression over `buffer`, zeroing class scores in place
    pub fn suppress_in_place(
        &self,
        buffer: &mut PredictionBuffer,
        threshold: f32,
    ) -> SuppressionReport {
        let n = buffer.len();
        let mut report = SuppressionReport::new(n);
        if n < 2 {
            return report;
        }

        let corners = corner_boxes(buffer);
        let mut overlaps = Vec::with_capacity(n);
        let mut anchor_scores = vec![0.0; buffer.num_classes()];

        for i in 0..n - 1 {
            self.metric
                .measure_against(&corners[i], &corners[i + 1..], &mut overlaps);
            report.pairs_evaluated += overlaps.len();

            // Row i is compared against all later rows as it stood at the start of this
            // iteration; zeroes written to it below do not feed back into this iteration.
            anchor_scores.copy_from_slice(buffer.record(i).class_scores());

            let overlapping = overlaps
                .iter()
                .enumerate()
                .filter(|&(_, &overlap)| overlap > threshold);

            for (offset, _) in overlapping {
                report.overlapping_pairs += 1;

                let j = i + 1 + offset;
                let (scores_i, scores_j) = buffer.class_scores_pair_mut(i, j);
                for (c, &a) in anchor_scores.iter().enumerate() {
                    if a < scores_j[c] {
                        report.scores_zeroed += usize::from(scores_i[c] != 0.0);
                        scores_i[c] = 0.0;
                    } else {
                        report.scores_zeroed += usize::from(scores_j[c] != 0.0);
                        scores_j[c] = 0.0;
                    }
                }
            }
        }

        report
    }
}

impl SuppressionStrategy for GreedyOverlapSuppressor {
    fn name(&self) -> &str {
        match self.metric {
            OverlapMetric::Iou => "greedynms",
            OverlapMetric::Diou => "diounms",
        }
    }

    fn suppress(&self, buffer: &mut PredictionBuffer, threshold: f32) -> SuppressionReport {
        self.suppress_in_place(buffer, threshold)
    }
}
