//! Strategy selection per detector head

use log::debug;
use std::collections::HashMap;
use std::fmt;
use yolo_post_core::PredictionBuffer;

use super::config::{NmsKind, SuppressionConfig};
use crate::error::{NmsError, Result};
use crate::nms::{GreedyOverlapSuppressor, SuppressionReport};
use crate::traits::SuppressionStrategy;
use crate::utils::validate::validate_geometry;

/// Runs the strategy a head's configuration asks for
pub struct NmsDispatcher {
    strategies: HashMap<NmsKind, Box<dyn SuppressionStrategy>>,
}

impl NmsDispatcher {
    /// Dispatcher with the built-in strategies registered
    pub fn new() -> Self {
        Self::empty()
            .with_strategy(NmsKind::Greedy, Box::new(GreedyOverlapSuppressor::iou()))
            .with_strategy(NmsKind::Diou, Box::new(GreedyOverlapSuppressor::diou()))
    }

    /// Dispatcher with nothing registered
    pub fn empty() -> Self {
        Self {
            strategies: HashMap::new(),
        }
    }

    /// Register or replace the strategy for `kind`
    pub fn with_strategy(mut self, kind: NmsKind, strategy: Box<dyn SuppressionStrategy>) -> Self {
        self.strategies.insert(kind, strategy);
        self
    }

    pub fn strategy(&self, kind: NmsKind) -> Option<&dyn SuppressionStrategy> {
        self.strategies.get(&kind).map(|strategy| strategy.as_ref())
    }

    /// Suppress overlapping detections of one image in place.
    ///
    /// Configuration and box geometry are checked first; on error the buffer is left
    /// exactly as it was.
    pub fn suppress(
        &self,
        buffer: &mut PredictionBuffer,
        config: &SuppressionConfig,
    ) -> Result<SuppressionReport> {
        config.validate()?;
        let strategy = self
            .strategy(config.kind)
            .ok_or_else(|| NmsError::MissingStrategy(config.kind.to_string()))?;
        validate_geometry(buffer)?;

        let report = strategy.suppress(buffer, config.threshold);
        debug!(
            "{}: {} boxes, {} of {} pairs above {}, {} scores zeroed",
            strategy.name(),
            report.boxes,
            report.overlapping_pairs,
            report.pairs_evaluated,
            config.threshold,
            report.scores_zeroed
        );

        Ok(report)
    }

    /// Same as [`suppress`](Self::suppress) with the kind given by its cfg name
    pub fn suppress_named(
        &self,
        buffer: &mut PredictionBuffer,
        kind: &str,
        threshold: f32,
    ) -> Result<SuppressionReport> {
        let config = SuppressionConfig::from_kind_name(kind, threshold)?;
        self.suppress(buffer, &config)
    }
}

impl Default for NmsDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for NmsDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<_> = self.strategies.keys().map(NmsKind::as_str).collect();
        kinds.sort_unstable();
        f.debug_struct("NmsDispatcher")
            .field("strategies", &kinds)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn overlapping_pair() -> PredictionBuffer {
        PredictionBuffer::from_rows(
            2,
            [
                [5.0_f32, 5.0, 10.0, 10.0, 1.0, 0.9, 0.3],
                [7.5, 5.0, 10.0, 10.0, 1.0, 0.7, 0.3],
            ],
        )
        .unwrap()
    }

    struct CountingStrategy {
        calls: AtomicUsize,
    }

    impl SuppressionStrategy for CountingStrategy {
        fn name(&self) -> &str {
            "counting"
        }

        fn suppress(&self, buffer: &mut PredictionBuffer, _threshold: f32) -> SuppressionReport {
            self.calls.fetch_add(1, Ordering::SeqCst);
            SuppressionReport::new(buffer.len())
        }
    }

    #[test]
    fn test_dispatch_greedy() {
        let mut buffer = overlapping_pair();
        let report = NmsDispatcher::new()
            .suppress(&mut buffer, &SuppressionConfig::greedy(0.5))
            .unwrap();

        assert_eq!(report.scores_zeroed, 2);
        assert_eq!(buffer.record(1).class_scores(), &[0.0, 0.0]);
    }

    #[test]
    fn test_dispatch_by_name() {
        let mut buffer = overlapping_pair();
        let dispatcher = NmsDispatcher::default();
        dispatcher.suppress_named(&mut buffer, "diounms", 0.5).unwrap();
        assert_eq!(buffer.record(1).class_scores(), &[0.0, 0.0]);

        let err = dispatcher
            .suppress_named(&mut buffer, "cornersnms", 0.5)
            .unwrap_err();
        assert!(matches!(err, NmsError::UnsupportedSuppressionKind(_)));
    }

    #[test]
    fn test_invalid_threshold_leaves_buffer() {
        let mut buffer = overlapping_pair();
        let before = buffer.clone();
        let err = NmsDispatcher::new()
            .suppress(&mut buffer, &SuppressionConfig::greedy(-0.2))
            .unwrap_err();

        assert_eq!(err, NmsError::InvalidThreshold(-0.2));
        assert_eq!(buffer, before);
    }

    #[test]
    fn test_degenerate_box_leaves_buffer() {
        let mut buffer = overlapping_pair();
        buffer.push_detection([6.0, 5.0, 10.0, 0.0], 1.0, &[0.1, 0.1]).unwrap();
        let before = buffer.clone();

        let err = NmsDispatcher::new()
            .suppress(&mut buffer, &SuppressionConfig::default())
            .unwrap_err();
        assert!(matches!(err, NmsError::DegenerateGeometry { index: 2, .. }));
        assert_eq!(buffer, before);
    }

    #[test]
    fn test_vanishing_boxes_are_rejected() {
        let mut buffer = PredictionBuffer::from_rows(
            1,
            [
                [5.0_f32, 5.0, 1e-30, 1e-30, 1.0, 0.9],
                [5.0, 5.0, 1e-30, 1e-30, 1.0, 0.5],
            ],
        )
        .unwrap();
        let before = buffer.clone();

        let err = NmsDispatcher::new()
            .suppress(&mut buffer, &SuppressionConfig::greedy(0.5))
            .unwrap_err();
        assert!(matches!(err, NmsError::DegenerateGeometry { index: 0, .. }));
        assert_eq!(buffer, before);
    }

    #[test]
    fn test_missing_strategy() {
        let mut buffer = overlapping_pair();
        let err = NmsDispatcher::empty()
            .suppress(&mut buffer, &SuppressionConfig::default())
            .unwrap_err();
        assert_eq!(err, NmsError::MissingStrategy("greedynms".to_string()));
    }

    #[test]
    fn test_replace_strategy() {
        let dispatcher = NmsDispatcher::new().with_strategy(
            NmsKind::Diou,
            Box::new(CountingStrategy {
                calls: AtomicUsize::new(0),
            }),
        );
        let mut buffer = overlapping_pair();
        let before = buffer.clone();

        dispatcher
            .suppress(&mut buffer, &SuppressionConfig::diou(0.5))
            .unwrap();
        assert_eq!(buffer, before);
        assert_eq!(dispatcher.strategy(NmsKind::Diou).unwrap().name(), "counting");
        assert_eq!(dispatcher.strategy(NmsKind::Greedy).unwrap().name(), "greedynms");
        assert_eq!(
            format!("{:?}", dispatcher),
            r#"NmsDispatcher { strategies: ["diounms", "greedynms"] }"#
        );
    }
}
