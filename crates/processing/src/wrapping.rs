//! Moving between plain image batches and frame sets.

use serde::{Deserialize, Serialize};
use vbatch_common::{VbatchError, VbatchResult};
use vbatch_frame_model::{FrameRate, FrameSet, Image, ImageBatch};

/// How index gaps are treated when a frame set is flattened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GapMode {
    /// Fill gaps with blended frames.
    #[default]
    Blend,
    /// Refuse sets with gaps.
    Fail,
    /// Ignore gaps and emit the stored frames back to back.
    Reindex,
}

/// A flattened frame set with its timing metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct UnwrappedFrames {
    pub images: Vec<Image>,
    pub framerate: f64,
    pub framerate_rounded: i64,
    pub framerate_base: u32,
    pub framerate_divisor: u32,
    pub first_index: i64,
    pub indexed_length: i64,
    pub frame_count: usize,
}

/// Tag `batch` with indices `first_index, first_index + step, ...`.
pub fn images_to_frameset(
    batch: ImageBatch,
    first_index: i64,
    step: i64,
    framerate_base: u32,
    framerate_divisor: u32,
) -> VbatchResult<FrameSet> {
    if step < 1 {
        return Err(VbatchError::invalid_parameter(
            "step",
            format!("must be at least 1, got {step}"),
        ));
    }
    if framerate_base == 0 {
        return Err(VbatchError::invalid_parameter(
            "framerate_base",
            "must be at least 1",
        ));
    }
    let framerate = FrameRate::new(framerate_base, framerate_divisor);
    let indices = (0..batch.len() as i64)
        .map(|i| first_index + i * step)
        .collect();
    FrameSet::new(batch, framerate, indices)
}

/// Flatten `frames` to a list of images plus metadata.
///
/// `frame_count` is the number of stored frames, before any gap filling.
pub fn unwrap_frameset(frames: &FrameSet, gap_mode: GapMode) -> VbatchResult<UnwrappedFrames> {
    let images = match gap_mode {
        GapMode::Fail if frames.has_index_gaps() => {
            return Err(VbatchError::incompatible(
                "unwrap",
                format!(
                    "frame set with indices {}..={} contains gaps",
                    frames.first_index(),
                    frames.last_index()
                ),
            ))
        }
        GapMode::Blend => frames.get_blended_frame_images()?,
        GapMode::Fail | GapMode::Reindex => frames.images().to_vec(),
    };

    let framerate = frames.framerate();
    Ok(UnwrappedFrames {
        images,
        framerate: framerate.as_f64(),
        framerate_rounded: framerate.rounded(),
        framerate_base: framerate.base(),
        framerate_divisor: framerate.divisor(),
        first_index: frames.first_index(),
        indexed_length: frames.indexed_length(),
        frame_count: frames.len(),
    })
}
