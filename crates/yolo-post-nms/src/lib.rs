//! Non-maximum suppression for YOLO prediction buffers
//!
//! Per-class, in-place suppression of overlapping detections with pluggable strategies
//! selected per detector head.

pub mod bbox;
pub mod dispatch;
pub mod error;
pub mod nms;
pub mod utils;

// Re-export commonly used types
pub use bbox::{CenterBox, CornerBox, OverlapMetric};
pub use dispatch::{NmsDispatcher, NmsKind, SuppressionConfig};
pub use error::{NmsError, Result};
pub use nms::{GreedyOverlapSuppressor, SuppressionReport};
pub use traits::SuppressionStrategy;

/// Core traits for suppression
pub mod traits {
    use crate::nms::SuppressionReport;
    use yolo_post_core::PredictionBuffer;

    /// A way of eliminating overlapping detections from one image's buffer.
    ///
    /// Implementations zero class scores in place and never add, remove or reorder rows.
    /// Inputs are already validated by the dispatcher.
    pub trait SuppressionStrategy: Send + Sync {
        fn name(&self) -> &str;

        fn suppress(&self, buffer: &mut PredictionBuffer, threshold: f32) -> SuppressionReport;
    }
}
