//! Field layout of a prediction row.
//!
//! A row is `[tx, ty, tw, th, objectness, class_0, .., class_{C-1}]`, exactly as the
//! detector head emits it after decoding.

use anyhow::Context;

use crate::Result;

pub const YOLO_TX: usize = 0;
pub const YOLO_TY: usize = 1;
pub const YOLO_TW: usize = 2;
pub const YOLO_TH: usize = 3;
pub const YOLO_OBJ: usize = 4;
pub const YOLO_CLASS_START: usize = 5;

/// Number of box + objectness fields preceding the class scores.
pub const YOLO_NUM_BBOX_ATTRS: usize = YOLO_CLASS_START;

// Corner-form box fields
pub const BBOX_X1: usize = 0;
pub const BBOX_Y1: usize = 1;
pub const BBOX_X2: usize = 2;
pub const BBOX_Y2: usize = 3;

/// Row width for a head predicting `num_classes` classes.
///
/// Saturates instead of overflowing; constructors reject such class counts through
/// [`checked_row_stride`].
pub const fn row_stride(num_classes: usize) -> usize {
    YOLO_NUM_BBOX_ATTRS.saturating_add(num_classes)
}

/// Row width, or an error when `5 + num_classes` does not fit in `usize`
pub fn checked_row_stride(num_classes: usize) -> Result<usize> {
    num_classes
        .checked_add(YOLO_NUM_BBOX_ATTRS)
        .with_context(|| format!("num_classes {} is too large for a row", num_classes))
}
