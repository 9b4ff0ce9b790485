//! Per-frame map over an image batch.

use rayon::prelude::*;
use vbatch_common::VbatchResult;
use vbatch_frame_model::{Image, ImageBatch};

/// Applies a transform to every image of a batch and collects the results.
///
/// The transform receives `(position, total, image)` and may return `None` to
/// drop that frame. Output order always matches input order, whether the map
/// runs sequentially or on the rayon pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchProcessor {
    parallel: bool,
}

impl Default for BatchProcessor {
    fn default() -> Self {
        Self::sequential()
    }
}

impl BatchProcessor {
    pub fn new(parallel: bool) -> Self {
        Self { parallel }
    }

    pub fn sequential() -> Self {
        Self::new(false)
    }

    pub fn parallel() -> Self {
        Self::new(true)
    }

    pub fn process<F>(&self, batch: &ImageBatch, f: F) -> VbatchResult<ImageBatch>
    where
        F: Fn(usize, usize, &Image) -> Option<Image> + Sync,
    {
        let total = batch.len();
        let results: Vec<Option<Image>> = if self.parallel {
            batch
                .images()
                .par_iter()
                .enumerate()
                .map(|(n, image)| f(n, total, image))
                .collect()
        } else {
            batch
                .iter()
                .enumerate()
                .map(|(n, image)| f(n, total, image))
                .collect()
        };

        let images: Vec<Image> = results.into_iter().flatten().collect();
        if images.len() != total {
            tracing::debug!(
                input = total,
                output = images.len(),
                "batch processor dropped frames"
            );
        }
        ImageBatch::new(images)
    }
}
