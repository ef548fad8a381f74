//! Suppression over a batch of images
//!
//! Images share no state, so with the `parallel` feature they are processed on rayon's
//! pool. Each image is still suppressed sequentially.

use log::warn;
use yolo_post_core::PredictionBuffer;

use crate::dispatch::{NmsDispatcher, SuppressionConfig};
use crate::error::{NmsError, Result};
use crate::nms::SuppressionReport;

/// Per-image results of a batch, in input order
#[derive(Debug)]
pub struct BatchOutcome {
    pub results: Vec<Result<SuppressionReport>>,
}

impl BatchOutcome {
    /// Sum of the reports of every image that succeeded
    pub fn total(&self) -> SuppressionReport {
        let mut total = SuppressionReport::default();
        for report in self.results.iter().flatten() {
            total.merge(report);
        }
        total
    }

    /// Images whose suppression failed, with their error
    pub fn failures(&self) -> impl Iterator<Item = (usize, &NmsError)> {
        self.results
            .iter()
            .enumerate()
            .filter_map(|(image, result)| result.as_ref().err().map(|err| (image, err)))
    }

    pub fn is_ok(&self) -> bool {
        self.results.iter().all(|result| result.is_ok())
    }
}

/// Suppress every buffer with the same head configuration.
///
/// A failing image leaves its buffer untouched and does not stop the others.
pub fn suppress_batch(
    dispatcher: &NmsDispatcher,
    buffers: &mut [PredictionBuffer],
    config: &SuppressionConfig,
) -> BatchOutcome {
    #[cfg(feature = "parallel")]
    let results: Vec<_> = {
        use rayon::prelude::*;
        buffers
            .par_iter_mut()
            .map(|buffer| dispatcher.suppress(buffer, config))
            .collect()
    };

    #[cfg(not(feature = "parallel"))]
    let results: Vec<_> = buffers
        .iter_mut()
        .map(|buffer| dispatcher.suppress(buffer, config))
        .collect();

    for (image, result) in results.iter().enumerate() {
        if let Err(err) = result {
            warn!("image {}: suppression skipped: {}", image, err);
        }
    }

    BatchOutcome { results }
}
