//! Loading of prediction batches produced by the decoding stage

use anyhow::{Context, ensure};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::Result;
use crate::buffer::PredictionBuffer;
use crate::layout::checked_row_stride;

/// A batch of decoded predictions, `[B][N][5 + C]`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionBatch {
    pub num_classes: usize,
    pub images: Vec<Vec<Vec<f32>>>,
}

impl PredictionBatch {
    /// Load a batch from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read predictions: {:?}", path))?;

        Self::from_json(&contents)
            .with_context(|| format!("Failed to parse predictions: {:?}", path))
    }

    /// Parse a batch from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        let batch: PredictionBatch =
            serde_json::from_str(json).context("Malformed prediction batch JSON")?;
        batch.validate()?;
        Ok(batch)
    }

    /// Collect already built buffers into a batch
    pub fn from_buffers(num_classes: usize, buffers: &[PredictionBuffer]) -> Result<Self> {
        let mut images = Vec::with_capacity(buffers.len());
        for (image, buffer) in buffers.iter().enumerate() {
            ensure!(
                buffer.num_classes() == num_classes,
                "image {} has {} classes, batch has {}",
                image,
                buffer.num_classes(),
                num_classes
            );
            images.push(buffer.to_rows());
        }
        Ok(Self {
            num_classes,
            images,
        })
    }

    /// Check every row has the expected width
    pub fn validate(&self) -> Result<()> {
        let stride = checked_row_stride(self.num_classes)?;
        for (image, rows) in self.images.iter().enumerate() {
            for (index, row) in rows.iter().enumerate() {
                ensure!(
                    row.len() == stride,
                    "image {} row {} has {} fields, expected {}",
                    image,
                    index,
                    row.len(),
                    stride
                );
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Split into one buffer per image
    pub fn into_buffers(self) -> Result<Vec<PredictionBuffer>> {
        let num_classes = self.num_classes;
        self.images
            .into_iter()
            .enumerate()
            .map(|(image, rows)| {
                PredictionBuffer::from_rows(num_classes, rows)
                    .with_context(|| format!("Invalid rows in image {}", image))
            })
            .collect()
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize prediction batch")
    }
}
