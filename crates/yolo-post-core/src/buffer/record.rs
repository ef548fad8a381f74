use serde::{Deserialize, Serialize};

use crate::layout::{YOLO_CLASS_START, YOLO_OBJ, YOLO_TH, YOLO_TW, YOLO_TX, YOLO_TY};

/// Read-only view of one row of a [`PredictionBuffer`](super::PredictionBuffer).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionRecord<'a> {
    index: usize,
    row: &'a [f32],
}

impl<'a> DetectionRecord<'a> {
    pub(crate) fn new(index: usize, row: &'a [f32]) -> Self {
        Self { index, row }
    }

    /// Position of this record in the buffer (network emission order)
    pub fn index(&self) -> usize {
        self.index
    }

    /// Box parameters in center form: `[cx, cy, w, h]`
    pub fn center_box(&self) -> [f32; 4] {
        [
            self.row[YOLO_TX],
            self.row[YOLO_TY],
            self.row[YOLO_TW],
            self.row[YOLO_TH],
        ]
    }

    pub fn objectness(&self) -> f32 {
        self.row[YOLO_OBJ]
    }

    /// Objectness-weighted class scores
    pub fn class_scores(&self) -> &'a [f32] {
        &self.row[YOLO_CLASS_START..]
    }

    /// Raw row including box, objectness and class fields
    pub fn as_slice(&self) -> &'a [f32] {
        self.row
    }
}

/// A (box, class) pair that survived suppression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub index: usize,
    pub class_id: usize,
    pub score: f32,
    pub cx: f32,
    pub cy: f32,
    pub w: f32,
    pub h: f32,
}

impl Detection {
    pub(crate) fn from_record(record: &DetectionRecord<'_>, class_id: usize, score: f32) -> Self {
        let [cx, cy, w, h] = record.center_box();
        Self {
            index: record.index(),
            class_id,
            score,
            cx,
            cy,
            w,
            h,
        }
    }
}
