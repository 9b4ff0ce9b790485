//! Fades and blended splices.

use vbatch_common::{VbatchError, VbatchResult};
use vbatch_frame_model::FrameSet;

use crate::batch::BatchProcessor;

/// Linear brightness ramp over `length` frames at one end of a batch.
///
/// A falling ramp (`start > end`) ends on the last frame; a rising ramp
/// starts on the first. Frames outside the ramp are left alone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadeRamp {
    length: i64,
    start: f64,
    end: f64,
}

impl FadeRamp {
    pub fn new(length: i64, start: f64, end: f64) -> Self {
        Self {
            length: length.abs(),
            start,
            end,
        }
    }

    pub fn fade_out(length: i64) -> Self {
        Self::new(length, 1.0, 0.0)
    }

    pub fn fade_in(length: i64) -> Self {
        Self::new(length, 0.0, 1.0)
    }

    /// Brightness factor for frame `n` of `total`, or `None` if untouched.
    pub fn brightness_at(&self, n: usize, total: usize) -> Option<f64> {
        if self.length == 0 || total == 0 {
            return None;
        }
        let (n, last) = (n as i64, total as i64 - 1);
        let delta = (self.end - self.start) / self.length as f64;
        let (from, to) = if self.start > self.end {
            ((last - self.length).max(0), last)
        } else {
            (0, last.min(self.length))
        };
        (from..=to)
            .contains(&n)
            .then(|| self.start + (n - from) as f64 * delta)
    }

    pub fn apply(&self, frames: &FrameSet, processor: BatchProcessor) -> VbatchResult<FrameSet> {
        let batch = processor.process(frames.batch(), |n, total, image| {
            Some(match self.brightness_at(n, total) {
                Some(factor) => image.change_brightness(factor),
                None => image.clone(),
            })
        })?;
        FrameSet::new(batch, frames.framerate(), frames.indices().to_vec())
    }
}

/// Darken the last `fade_seconds` of `frames` down to black.
pub fn fade_to_black(
    frames: &FrameSet,
    fade_seconds: f64,
    processor: BatchProcessor,
) -> VbatchResult<FrameSet> {
    let length = frames.framerate().seconds_to_frames(fade_seconds);
    tracing::debug!(frames = frames.len(), length, "fade to black");
    FadeRamp::fade_out(length).apply(frames, processor)
}

/// Brighten the first `fade_seconds` of `frames` up from black.
pub fn fade_from_black(
    frames: &FrameSet,
    fade_seconds: f64,
    processor: BatchProcessor,
) -> VbatchResult<FrameSet> {
    let length = frames.framerate().seconds_to_frames(fade_seconds);
    tracing::debug!(frames = frames.len(), length, "fade from black");
    FadeRamp::fade_in(length).apply(frames, processor)
}

/// Splice `after` onto `first` with a cross-fade of up to `fade_seconds`.
///
/// Both sets must be gap-free and share framerate and frame size. The fade
/// is capped at twice the shorter set's length and at each set's length.
pub fn blended_transition(
    first: &FrameSet,
    after: &FrameSet,
    fade_seconds: f64,
) -> VbatchResult<FrameSet> {
    const OPERATION: &str = "blended transition";

    if first.has_index_gaps() || after.has_index_gaps() {
        return Err(VbatchError::incompatible(
            OPERATION,
            "frame sets must not contain index gaps",
        ));
    }
    if first.framerate() != after.framerate() {
        return Err(VbatchError::incompatible(
            OPERATION,
            format!(
                "frame rate {} differs from {}",
                first.framerate(),
                after.framerate()
            ),
        ));
    }
    if first.image_dimensions() != after.image_dimensions() {
        return Err(VbatchError::incompatible(
            OPERATION,
            format!(
                "image dimensions {:?} differ from {:?}",
                first.image_dimensions(),
                after.image_dimensions()
            ),
        ));
    }

    let (a, b) = (first.len() as i64, after.len() as i64);
    let fade_length = (2 * a.min(b))
        .min(first.framerate().seconds_to_frames(fade_seconds))
        .min(a)
        .min(b);
    tracing::debug!(first = a, after = b, fade_length, "blended transition");
    first.fade_to(after, fade_length)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vbatch_frame_model::{Channels, FrameRate, Image};

    fn set(level: f32, count: usize, fps: u32) -> FrameSet {
        let images = (0..count)
            .map(|_| Image::solid(2, 2, Channels::Rgb, [level, level, level, 1.0]))
            .collect();
        FrameSet::from_images(images, FrameRate::from_fps(fps), (0..count as i64).collect())
            .unwrap()
    }

    fn levels(frames: &FrameSet) -> Vec<f32> {
        frames.images().iter().map(|img| img.pixel(0, 0)[0]).collect()
    }

    #[test]
    fn test_fade_out_ramp() {
        let ramp = FadeRamp::fade_out(4);
        let factors: Vec<_> = (0..5).map(|n| ramp.brightness_at(n, 5)).collect();
        assert_eq!(
            factors,
            vec![Some(1.0), Some(0.75), Some(0.5), Some(0.25), Some(0.0)]
        );
        assert_eq!(ramp.brightness_at(0, 8), None);
    }

    #[test]
    fn test_fade_in_ramp() {
        let ramp = FadeRamp::fade_in(2);
        let factors: Vec<_> = (0..4).map(|n| ramp.brightness_at(n, 4)).collect();
        assert_eq!(factors, vec![Some(0.0), Some(0.5), Some(1.0), None]);
    }

    #[test]
    fn test_zero_length_ramp_is_noop() {
        assert_eq!(FadeRamp::fade_out(0).brightness_at(0, 3), None);
    }

    #[test]
    fn test_fade_to_black_darkens_tail() {
        let frames = set(0.8, 5, 4);
        let out = fade_to_black(&frames, 1.0, BatchProcessor::sequential()).unwrap();
        let l = levels(&out);
        assert_eq!(out.indices(), frames.indices());
        assert!((l[0] - 0.8).abs() < 1e-6);
        assert!((l[2] - 0.4).abs() < 1e-6);
        assert_eq!(l[4], 0.0);
    }

    #[test]
    fn test_fade_from_black_brightens_head() {
        let frames = set(0.8, 6, 4);
        let out = fade_from_black(&frames, 1.0, BatchProcessor::parallel()).unwrap();
        let l = levels(&out);
        assert_eq!(l[0], 0.0);
        assert!((l[4] - 0.8).abs() < 1e-6);
        assert!((l[5] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_blended_transition_caps_fade() {
        let a = set(0.0, 3, 24);
        let b = set(0.9, 4, 24);
        // One second would be 24 frames; the cap is the shorter length.
        let out = blended_transition(&a, &b, 1.0).unwrap();
        assert_eq!(out.len(), 7);
        let blended = levels(&out)
            .iter()
            .filter(|v| **v != 0.0 && (**v - 0.9).abs() > 1e-6)
            .count();
        assert_eq!(blended, 3);
    }

    #[test]
    fn test_blended_transition_rejects_gaps() {
        let a = set(0.0, 3, 24);
        let gappy =
            FrameSet::from_images(a.images().to_vec(), FrameRate::from_fps(24), vec![0, 2, 3])
                .unwrap();
        assert!(blended_transition(&gappy, &a, 1.0).is_err());
    }

    #[test]
    fn test_blended_transition_rejects_framerate_mismatch() {
        let err = blended_transition(&set(0.0, 3, 24), &set(0.0, 3, 30), 0.5).unwrap_err();
        assert!(err.to_string().contains("blended transition"));
    }
}
