//! Rational frame rates.

use serde::{Deserialize, Serialize};

/// Two frame rates closer than this (in frames per second) compare equal.
const FPS_EPSILON: f64 = 0.001;

/// Frames per second expressed as `base / divisor`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FrameRate {
    base: u32,
    divisor: u32,
}

impl FrameRate {
    /// Create a frame rate. A divisor below 1 is raised to 1.
    pub fn new(base: u32, divisor: u32) -> Self {
        Self {
            base,
            divisor: divisor.max(1),
        }
    }

    /// Whole-number frame rate (`fps / 1`).
    pub fn from_fps(fps: u32) -> Self {
        Self::new(fps, 1)
    }

    pub fn base(&self) -> u32 {
        self.base
    }

    pub fn divisor(&self) -> u32 {
        self.divisor
    }

    pub fn as_f64(&self) -> f64 {
        f64::from(self.base) / f64::from(self.divisor)
    }

    pub fn rounded(&self) -> i64 {
        self.as_f64().round_ties_even() as i64
    }

    /// Number of whole frames covering `seconds`, rounded half to even.
    pub fn seconds_to_frames(&self, seconds: f64) -> i64 {
        (self.as_f64() * seconds).round_ties_even() as i64
    }

    /// Duration in seconds of `frames` frames.
    pub fn frames_to_seconds(&self, frames: i64) -> f64 {
        if self.base == 0 {
            return 0.0;
        }
        frames as f64 / self.as_f64()
    }
}

impl Default for FrameRate {
    fn default() -> Self {
        Self::from_fps(24)
    }
}

impl PartialEq for FrameRate {
    fn eq(&self, other: &Self) -> bool {
        (self.as_f64() - other.as_f64()).abs() < FPS_EPSILON
    }
}

impl std::fmt::Display for FrameRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3}", self.as_f64())
    }
}
