//! Progress easing for camera motion.
//!
//! Every camera move maps a frame's linear progress through the sequence
//! (0 at the first index, 1 at the last) to the factor handed to the frame
//! geometry. The mapping is one of a closed set of strategies.

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};
use vbatch_common::{VbatchError, VbatchResult};
use vbatch_frame_model::{FrameRate, FrameSet};

/// Straight-line remaps of progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinearMotion {
    /// `f`
    Forward,
    /// `1 - f`
    Reverse,
    /// `f / 2`: the first half of the range.
    FirstHalf,
    /// `0.5 + f / 2`: the second half of the range.
    SecondHalf,
}

impl LinearMotion {
    pub fn apply(self, f: f64) -> f64 {
        match self {
            Self::Forward => f,
            Self::Reverse => 1.0 - f,
            Self::FirstHalf => f * 0.5,
            Self::SecondHalf => 0.5 + f * 0.5,
        }
    }
}

/// Periodic easing: `sin(2π (t + phase) / period) * 0.5 + 0.5`, where `t` is
/// the elapsed time of the frame within the sequence.
///
/// Progress is first scaled by `total / (total + 1)` so that a looping clip
/// does not show its start pose twice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SineMotion {
    period_seconds: f64,
    phase_seconds: f64,
    total_frames: i64,
    framerate: FrameRate,
    half_range: bool,
}

impl SineMotion {
    pub fn new(
        period_seconds: f64,
        phase_seconds: f64,
        total_frames: i64,
        framerate: FrameRate,
    ) -> VbatchResult<Self> {
        if !(period_seconds > 0.0) || !period_seconds.is_finite() {
            return Err(VbatchError::invalid_parameter(
                "period_seconds",
                format!("must be a positive number of seconds, got {period_seconds}"),
            ));
        }
        Ok(Self {
            period_seconds,
            phase_seconds,
            total_frames,
            framerate,
            half_range: false,
        })
    }

    /// Sine easing spanning the indexed length of `frames`.
    pub fn for_frames(
        frames: &FrameSet,
        period_seconds: f64,
        phase_seconds: f64,
    ) -> VbatchResult<Self> {
        Self::new(
            period_seconds,
            phase_seconds,
            frames.indexed_length(),
            frames.framerate(),
        )
    }

    /// Halve the looped progress before converting it to time.
    pub fn with_half_range(mut self, half_range: bool) -> Self {
        self.half_range = half_range;
        self
    }

    pub fn apply(&self, f: f64) -> f64 {
        let total = self.total_frames as f64;
        let mut f = f * total / (total + 1.0);
        if self.half_range {
            f *= 0.5;
        }
        let length_seconds = self.framerate.frames_to_seconds(self.total_frames);
        let t = length_seconds * f;
        ((t + self.phase_seconds) * TAU / self.period_seconds).sin() * 0.5 + 0.5
    }
}

/// Easing strategy applied to raw progress.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MotionEasing {
    Linear(LinearMotion),
    Sine(SineMotion),
}

impl MotionEasing {
    /// Eased factor for `f`. Not clamped; callers clamp to `[0, 1]`.
    pub fn apply(&self, f: f64) -> f64 {
        match self {
            Self::Linear(motion) => motion.apply(f),
            Self::Sine(motion) => motion.apply(f),
        }
    }
}

impl From<LinearMotion> for MotionEasing {
    fn from(value: LinearMotion) -> Self {
        Self::Linear(value)
    }
}

impl From<SineMotion> for MotionEasing {
    fn from(value: SineMotion) -> Self {
        Self::Sine(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_linear_variants() {
        assert_eq!(LinearMotion::Forward.apply(0.3), 0.3);
        assert!(close(LinearMotion::Reverse.apply(0.3), 0.7));
        assert!(close(LinearMotion::FirstHalf.apply(1.0), 0.5));
        assert!(close(LinearMotion::SecondHalf.apply(0.0), 0.5));
        assert!(close(LinearMotion::SecondHalf.apply(1.0), 1.0));
    }

    #[test]
    fn test_sine_starts_mid_range() {
        let sine = SineMotion::new(1.0, 0.0, 24, FrameRate::from_fps(24)).unwrap();
        assert!(close(sine.apply(0.0), 0.5));
    }

    #[test]
    fn test_sine_loops_without_repeating_start() {
        // 24 frames at 24 fps with a one second period: the last frame sits
        // one frame short of a full cycle.
        let sine = SineMotion::new(1.0, 0.0, 24, FrameRate::from_fps(24)).unwrap();
        let last = sine.apply(1.0);
        let expected = (TAU * 24.0 / 25.0).sin() * 0.5 + 0.5;
        assert!(close(last, expected));
        assert!(!close(last, 0.5));
    }

    #[test]
    fn test_sine_quarter_period_peaks() {
        let sine = SineMotion::new(4.0, 1.0, 10, FrameRate::from_fps(10)).unwrap();
        assert!(close(sine.apply(0.0), 1.0));
    }

    #[test]
    fn test_half_range_slows_progress() {
        let full = SineMotion::new(8.0, 0.0, 8, FrameRate::from_fps(1)).unwrap();
        let half = full.with_half_range(true);
        assert!(close(half.apply(1.0), full.apply(0.5)));
    }

    #[test]
    fn test_zero_period_rejected() {
        let err = SineMotion::new(0.0, 0.0, 10, FrameRate::default()).unwrap_err();
        assert!(matches!(err, VbatchError::InvalidParameter { .. }));
    }

    #[test]
    fn test_easing_serializes() {
        let easing = MotionEasing::from(LinearMotion::Reverse);
        let json = serde_json::to_string(&easing).unwrap();
        let back: MotionEasing = serde_json::from_str(&json).unwrap();
        assert_eq!(back, easing);
    }
}
