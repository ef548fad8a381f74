//! Error taxonomy for suppression

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum NmsError {
    /// Configuration names a strategy that is not implemented
    #[error("unsupported suppression kind: {0:?}")]
    UnsupportedSuppressionKind(String),

    /// The dispatcher has no strategy registered for a known kind
    #[error("no strategy registered for suppression kind {0}")]
    MissingStrategy(String),

    /// A box with zero, negative or non-finite size; its overlap is undefined
    #[error("degenerate box at index {index}: (cx={cx}, cy={cy}, w={w}, h={h})")]
    DegenerateGeometry {
        index: usize,
        cx: f32,
        cy: f32,
        w: f32,
        h: f32,
    },

    /// Overlap threshold outside [0, 1]
    #[error("invalid overlap threshold {0}, expected a value in [0, 1]")]
    InvalidThreshold(f32),

    /// Pairwise overlap needs operands of equal length
    #[error("pairwise operands differ in length: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },
}

pub type Result<T> = std::result::Result<T, NmsError>;
