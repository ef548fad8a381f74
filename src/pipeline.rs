//! Suppression over a prediction batch file

use anyhow::{Result, bail};
use log::info;
use serde::Serialize;
use yolo_post_core::{Detection, PredictionBatch};
use yolo_post_nms::{NmsDispatcher, SuppressionConfig, SuppressionReport, utils::suppress_batch};

use crate::settings::{PostprocessConfig, validate_min_score};

/// Result for one image
#[derive(Debug, Clone, Serialize)]
pub struct ImageDetections {
    pub image: usize,
    pub report: SuppressionReport,
    pub detections: Vec<Detection>,
}

/// Result for a whole batch
#[derive(Debug, Clone, Serialize)]
pub struct BatchDetections {
    pub head: usize,
    pub config: SuppressionConfig,
    pub min_score: f32,
    pub total: SuppressionReport,
    pub images: Vec<ImageDetections>,
}

/// Suppress every image of `batch` with the settings of `head` and collect survivors
pub fn run_suppression(
    batch: PredictionBatch,
    config: &PostprocessConfig,
    head: usize,
    min_score: Option<f32>,
) -> Result<BatchDetections> {
    let head_config = *config.head(head)?;
    let min_score = min_score.unwrap_or(config.min_score);
    validate_min_score(min_score)?;

    let mut buffers = batch.into_buffers()?;
    let dispatcher = NmsDispatcher::new();
    let outcome = suppress_batch(&dispatcher, &mut buffers, &head_config);

    if let Some((image, err)) = outcome.failures().next() {
        bail!("image {}: {}", image, err);
    }
    let total = outcome.total();

    let images: Vec<ImageDetections> = buffers
        .iter()
        .zip(outcome.results)
        .enumerate()
        .map(|(image, (buffer, result))| ImageDetections {
            image,
            report: result.unwrap_or_default(),
            detections: buffer.surviving_detections(min_score),
        })
        .collect();

    info!(
        "{} images, {} boxes, {} scores zeroed, {} detections kept",
        images.len(),
        total.boxes,
        total.scores_zeroed,
        images.iter().map(|image| image.detections.len()).sum::<usize>()
    );

    Ok(BatchDetections {
        head,
        config: head_config,
        min_score,
        total,
        images,
    })
}
