//! Per-head strategy dispatch

pub mod config;
pub mod dispatcher;

pub use config::{NMS_THRESHOLD, NmsKind, SuppressionConfig};
pub use dispatcher::NmsDispatcher;
