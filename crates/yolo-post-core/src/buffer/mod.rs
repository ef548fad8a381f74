//! Per-image prediction buffer
//!
//! One row per candidate box, stored flat with a fixed stride of `5 + num_classes`.
//! Row order is the order boxes were emitted by the network and is never changed here.

mod record;

pub use record::{Detection, DetectionRecord};

use anyhow::{Context, ensure};
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::layout::{YOLO_CLASS_START, YOLO_NUM_BBOX_ATTRS, checked_row_stride, row_stride};

/// Prediction rows for a single image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BufferRows", into = "BufferRows")]
pub struct PredictionBuffer {
    num_classes: usize,
    data: Vec<f32>,
}

/// Serialized form: one array per row
#[derive(Debug, Clone, Serialize, Deserialize)]
struct BufferRows {
    num_classes: usize,
    rows: Vec<Vec<f32>>,
}

impl PredictionBuffer {
    /// Create an empty buffer for a head predicting `num_classes` classes
    pub fn new(num_classes: usize) -> Self {
        Self {
            num_classes,
            data: Vec::new(),
        }
    }

    /// Wrap an already flattened `[N * (5 + C)]` array
    pub fn from_flat(num_classes: usize, data: Vec<f32>) -> Result<Self> {
        let stride = checked_row_stride(num_classes)?;
        ensure!(
            data.len() % stride == 0,
            "buffer of {} values is not a whole number of {}-wide rows",
            data.len(),
            stride
        );
        Ok(Self { num_classes, data })
    }

    /// Build from individual rows, each exactly `5 + num_classes` wide
    pub fn from_rows<R: AsRef<[f32]>>(
        num_classes: usize,
        rows: impl IntoIterator<Item = R>,
    ) -> Result<Self> {
        let stride = checked_row_stride(num_classes)?;
        let mut data = Vec::new();

        for (index, row) in rows.into_iter().enumerate() {
            let row = row.as_ref();
            ensure!(
                row.len() == stride,
                "row {} has {} fields, expected {} ({} box attributes + {} classes)",
                index,
                row.len(),
                stride,
                YOLO_NUM_BBOX_ATTRS,
                num_classes
            );
            data.extend_from_slice(row);
        }

        Ok(Self { num_classes, data })
    }

    /// Append one detection given its center-form box, objectness and class scores
    pub fn push_detection(
        &mut self,
        center_box: [f32; 4],
        objectness: f32,
        class_scores: &[f32],
    ) -> Result<()> {
        ensure!(
            class_scores.len() == self.num_classes,
            "expected {} class scores, got {}",
            self.num_classes,
            class_scores.len()
        );
        self.data.extend_from_slice(&center_box);
        self.data.push(objectness);
        self.data.extend_from_slice(class_scores);
        Ok(())
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    /// Width of one row
    pub fn stride(&self) -> usize {
        row_stride(self.num_classes)
    }

    /// Number of detection records
    pub fn len(&self) -> usize {
        self.data.len() / self.stride()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// View of record `index`, or `None` past the end
    pub fn get(&self, index: usize) -> Option<DetectionRecord<'_>> {
        let stride = self.stride();
        let start = index.checked_mul(stride)?;
        self.data
            .get(start..start + stride)
            .map(|row| DetectionRecord::new(index, row))
    }

    /// View of record `index`
    ///
    /// Panics if `index >= self.len()`.
    pub fn record(&self, index: usize) -> DetectionRecord<'_> {
        let stride = self.stride();
        DetectionRecord::new(index, &self.data[index * stride..(index + 1) * stride])
    }

    /// Iterate records in index order
    pub fn records(&self) -> impl Iterator<Item = DetectionRecord<'_>> {
        self.data
            .chunks_exact(self.stride())
            .enumerate()
            .map(|(index, row)| DetectionRecord::new(index, row))
    }

    /// Center-form boxes of all records, in index order
    pub fn center_boxes(&self) -> Vec<[f32; 4]> {
        self.records().map(|record| record.center_box()).collect()
    }

    /// Mutable class scores of two distinct records, `first < second`
    ///
    /// Panics if `first >= second` or `second >= self.len()`.
    pub fn class_scores_pair_mut(
        &mut self,
        first: usize,
        second: usize,
    ) -> (&mut [f32], &mut [f32]) {
        assert!(first < second, "records must be distinct and ordered");
        let stride = self.stride();
        let (head, tail) = self.data.split_at_mut(second * stride);
        let a = &mut head[first * stride..(first + 1) * stride];
        let b = &mut tail[..stride];
        (&mut a[YOLO_CLASS_START..], &mut b[YOLO_CLASS_START..])
    }

    /// Flat view of every value
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Number of class-score entries equal to zero
    pub fn zero_score_count(&self) -> usize {
        self.records()
            .flat_map(|record| record.class_scores().iter())
            .filter(|&&score| score == 0.0)
            .count()
    }

    /// Every (box, class) whose score is nonzero and at least `min_score`, in index order.
    ///
    /// A zero score marks a class suppressed for that box; the record itself stays.
    pub fn surviving_detections(&self, min_score: f32) -> Vec<Detection> {
        let mut detections = Vec::new();
        for record in self.records() {
            for (class_id, &score) in record.class_scores().iter().enumerate() {
                if score != 0.0 && score >= min_score {
                    detections.push(Detection::from_record(&record, class_id, score));
                }
            }
        }
        detections
    }

    /// Copy out the rows, e.g. for serialization
    pub fn to_rows(&self) -> Vec<Vec<f32>> {
        self.records().map(|record| record.as_slice().to_vec()).collect()
    }
}

impl TryFrom<BufferRows> for PredictionBuffer {
    type Error = anyhow::Error;

    fn try_from(value: BufferRows) -> Result<Self> {
        PredictionBuffer::from_rows(value.num_classes, value.rows)
            .context("Invalid prediction buffer")
    }
}

impl From<PredictionBuffer> for BufferRows {
    fn from(value: PredictionBuffer) -> Self {
        BufferRows {
            num_classes: value.num_classes,
            rows: value.to_rows(),
        }
    }
}
