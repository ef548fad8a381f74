//! Utility modules

pub mod batch;
pub mod validate;

pub use batch::{BatchOutcome, suppress_batch};
pub use validate::{validate_geometry, validate_threshold};
