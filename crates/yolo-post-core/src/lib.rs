//! Data model for YOLO postprocessing.
//!
//! Holds the per-image prediction buffer the suppression stage mutates in place, the
//! row layout shared with the decoding stage, and loading of prediction batches.

pub mod batch;
pub mod buffer;
pub mod layout;

pub use batch::PredictionBatch;
pub use buffer::{Detection, DetectionRecord, PredictionBuffer};

pub type Result<T> = anyhow::Result<T>;
