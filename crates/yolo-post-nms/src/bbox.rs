//! Bounding box geometry
//!
//! Center-form to corner-form conversion and overlap measures. Everything here is pure;
//! boxes with non-positive width or height are a caller precondition and produce an
//! undefined (NaN or infinite) overlap.

use serde::{Deserialize, Serialize};
use yolo_post_core::PredictionBuffer;
use yolo_post_core::layout::{BBOX_X1, BBOX_X2, BBOX_Y1, BBOX_Y2};

use crate::error::{NmsError, Result};

/// Box in center form, as emitted by the detector head
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CenterBox {
    pub cx: f32,
    pub cy: f32,
    pub w: f32,
    pub h: f32,
}

impl CenterBox {
    pub fn new(cx: f32, cy: f32, w: f32, h: f32) -> Self {
        Self { cx, cy, w, h }
    }

    /// From `[cx, cy, w, h]`
    pub fn from_array([cx, cy, w, h]: [f32; 4]) -> Self {
        Self { cx, cy, w, h }
    }

    /// Convert to corner form
    pub fn to_corners(&self) -> CornerBox {
        let half_w = self.w / 2.0;
        let half_h = self.h / 2.0;
        CornerBox {
            x1: self.cx - half_w,
            y1: self.cy - half_h,
            x2: self.cx + half_w,
            y2: self.cy + half_h,
        }
    }

    /// True when the box has no positive area or a non-finite parameter
    pub fn is_degenerate(&self) -> bool {
        !(self.cx.is_finite() && self.cy.is_finite() && self.w.is_finite() && self.h.is_finite())
            || self.w <= 0.0
            || self.h <= 0.0
    }
}

/// Box in corner form: top-left `(x1, y1)`, bottom-right `(x2, y2)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CornerBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl CornerBox {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn to_array(&self) -> [f32; 4] {
        let mut corners = [0.0; 4];
        corners[BBOX_X1] = self.x1;
        corners[BBOX_Y1] = self.y1;
        corners[BBOX_X2] = self.x2;
        corners[BBOX_Y2] = self.y2;
        corners
    }

    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    /// Signed area; negative or zero for degenerate boxes
    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    pub fn center(&self) -> (f32, f32) {
        ((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
    }

    pub fn is_degenerate(&self) -> bool {
        let area = self.area();
        area.is_nan() || area <= 0.0 || self.x2 < self.x1 || self.y2 < self.y1
    }

    /// Intersection over union with another box
    pub fn iou(&self, other: &CornerBox) -> f32 {
        iou(self, other)
    }

    /// Distance-aware intersection over union with another box
    pub fn diou(&self, other: &CornerBox) -> f32 {
        diou(self, other)
    }

    /// Check if IoU with another box exceeds `threshold`
    pub fn overlaps(&self, other: &CornerBox, threshold: f32) -> bool {
        self.iou(other) > threshold
    }
}

impl From<CenterBox> for CornerBox {
    fn from(value: CenterBox) -> Self {
        value.to_corners()
    }
}

/// `[cx, cy, w, h]` to `[x1, y1, x2, y2]`
pub fn to_corners(center_box: [f32; 4]) -> [f32; 4] {
    CenterBox::from_array(center_box).to_corners().to_array()
}

/// Corner boxes for every record of `buffer`, in index order
pub fn corner_boxes(buffer: &PredictionBuffer) -> Vec<CornerBox> {
    buffer
        .records()
        .map(|record| CenterBox::from_array(record.center_box()).to_corners())
        .collect()
}

/// Area of the intersection rectangle, zero when the boxes are disjoint on either axis
pub fn intersection_area(a: &CornerBox, b: &CornerBox) -> f32 {
    let x_a = a.x1.max(b.x1);
    let y_a = a.y1.max(b.y1);
    let x_b = a.x2.min(b.x2);
    let y_b = a.y2.min(b.y2);

    (x_b - x_a).max(0.0) * (y_b - y_a).max(0.0)
}

/// Intersection over union of two corner-form boxes.
///
/// Division is unguarded: two degenerate boxes give NaN.
pub fn iou(a: &CornerBox, b: &CornerBox) -> f32 {
    let inter_area = intersection_area(a, b);
    inter_area / (a.area() + b.area() - inter_area)
}

/// IoU minus the squared center distance normalized by the squared diagonal of the
/// smallest box enclosing both. Lies in `[-1, 1]`.
///
/// The distance term is used as is; darknet's `beta_nms` exponent is fixed at 1.
pub fn diou(a: &CornerBox, b: &CornerBox) -> f32 {
    let (acx, acy) = a.center();
    let (bcx, bcy) = b.center();
    let center_dist_sq = (acx - bcx).powi(2) + (acy - bcy).powi(2);

    let enclose_w = a.x2.max(b.x2) - a.x1.min(b.x1);
    let enclose_h = a.y2.max(b.y2) - a.y1.min(b.y1);
    let diagonal_sq = enclose_w.powi(2) + enclose_h.powi(2);

    iou(a, b) - center_dist_sq / diagonal_sq
}

/// Elementwise IoU of two equally long batches: `out[k] = iou(a[k], b[k])`
pub fn pairwise_iou(a: &[CornerBox], b: &[CornerBox]) -> Result<Vec<f32>> {
    if a.len() != b.len() {
        return Err(NmsError::LengthMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    Ok(a.iter().zip(b).map(|(a, b)| iou(a, b)).collect())
}

/// IoU of `anchor` against each box of `others`
pub fn iou_against(anchor: &CornerBox, others: &[CornerBox]) -> Vec<f32> {
    others.iter().map(|other| iou(anchor, other)).collect()
}

/// Overlap measure used to decide whether two boxes are duplicates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlapMetric {
    #[default]
    Iou,
    Diou,
}

impl OverlapMetric {
    pub fn measure(&self, a: &CornerBox, b: &CornerBox) -> f32 {
        match self {
            OverlapMetric::Iou => iou(a, b),
            OverlapMetric::Diou => diou(a, b),
        }
    }

    /// Overlap of `anchor` against each box of `others`, written into `out`
    pub fn measure_against(&self, anchor: &CornerBox, others: &[CornerBox], out: &mut Vec<f32>) {
        out.clear();
        out.extend(others.iter().map(|other| self.measure(anchor, other)));
    }
}
