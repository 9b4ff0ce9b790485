//! Virtual camera moves over a frame set.
//!
//! [`BatchCameraMotion`] works out each frame's progress from its index,
//! eases it with a [`MotionEasing`], and hands the factor to a
//! [`FrameGeometry`] that crops, resizes, or rotates the frame to the output
//! size. Indices and framerate pass through untouched.

use serde::{Deserialize, Serialize};
use vbatch_common::{VbatchError, VbatchResult};
use vbatch_frame_model::{FrameSet, Image, Quad2d, Resampling, Vector2d};

use crate::batch::BatchProcessor;
use crate::easing::{LinearMotion, MotionEasing, SineMotion};

/// Zoom direction for a linear zoom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ZoomDirection {
    /// Start on the full frame, end on an output-sized centre crop.
    #[default]
    In,
    /// The reverse of `In`.
    Out,
}

/// Which part of the full traversal a pan covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PanMode {
    #[default]
    EdgeToEdge,
    CenterToEdge,
    EdgeToCenter,
}

impl PanMode {
    fn linear_motion(self) -> LinearMotion {
        match self {
            PanMode::EdgeToEdge => LinearMotion::Forward,
            PanMode::CenterToEdge => LinearMotion::SecondHalf,
            PanMode::EdgeToCenter => LinearMotion::FirstHalf,
        }
    }
}

/// Per-frame geometry driven by an eased factor in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FrameGeometry {
    /// Centre crop shrinking from the full frame (factor 1) to the output
    /// size (factor 0), resized to the output size.
    Zoom,
    /// Output-sized window sliding across the frame along `direction`.
    Pan { direction: Vector2d },
    /// Rotation by `factor * degrees`, then an output-sized centre crop.
    Roll { degrees: f64 },
}

impl FrameGeometry {
    pub fn apply(&self, image: &Image, f: f64, width: u32, height: u32) -> Image {
        match *self {
            FrameGeometry::Zoom => zoom_frame(image, f, width, height),
            FrameGeometry::Pan { direction } => pan_frame(image, direction, f, width, height),
            FrameGeometry::Roll { degrees } => roll_frame(image, degrees, f, width, height),
        }
    }
}

fn zoom_frame(image: &Image, f: f64, width: u32, height: u32) -> Image {
    let (ow, oh) = (f64::from(width), f64::from(height));
    let w = (f64::from(image.width()) - ow) * f + ow;
    let h = (f64::from(image.height()) - oh) * f + oh;
    let c = image.quad().center();
    image
        .crop_rounded(c.x - w * 0.5, c.y - h * 0.5, c.x + w * 0.5, c.y + h * 0.5)
        .resize(i64::from(width), i64::from(height), Resampling::Bilinear)
}

fn pan_frame(image: &Image, direction: Vector2d, f: f64, width: u32, height: u32) -> Image {
    if image.width() < width || image.height() < height {
        return image.clone();
    }
    let Some(dir) = direction.normalized() else {
        return image.clone();
    };

    let (ow, oh) = (f64::from(width), f64::from(height));
    let space = Quad2d::new(
        ow * 0.5,
        oh * 0.5,
        f64::from(image.width()) - ow * 0.5,
        f64::from(image.height()) - oh * 0.5,
    );
    let travel = match space.calculate_intersections(space.center(), dir) {
        Some((a, b)) => b.sub(a).align(dir),
        None => clipped_travel(&space, dir),
    };

    let start = space.center().sub(travel.scale(0.5));
    let window = Quad2d::centered(start, ow, oh).translate(travel.scale(f));
    let x0 = window.min.x.round() as i64;
    let y0 = window.min.y.round() as i64;
    image.crop(x0, y0, x0 + i64::from(width), y0 + i64::from(height))
}

/// Longest chord through the centre of `space` along `dir`, clipped axis by
/// axis. Handles spaces that are flat on one axis, where the edge crossings
/// are degenerate.
fn clipped_travel(space: &Quad2d, dir: Vector2d) -> Vector2d {
    let half = [
        (space.width() * 0.5, dir.x.abs()),
        (space.height() * 0.5, dir.y.abs()),
    ];
    let t = half
        .iter()
        .filter(|(_, d)| *d > f64::EPSILON)
        .map(|(extent, d)| extent / d)
        .fold(f64::INFINITY, f64::min);
    if t.is_finite() {
        dir.scale(2.0 * t)
    } else {
        Vector2d::ZERO
    }
}

fn roll_frame(image: &Image, degrees: f64, f: f64, width: u32, height: u32) -> Image {
    let cx = (f64::from(image.width()) * 0.5).round() as i64;
    let cy = (f64::from(image.height()) * 0.5).round() as i64;
    let x0 = cx - i64::from(width / 2);
    let y0 = cy - i64::from(height / 2);
    image
        .rotate(f * degrees)
        .crop(x0, y0, x0 + i64::from(width), y0 + i64::from(height))
}

/// A camera move over every frame of a set.
#[derive(Debug, Clone)]
pub struct BatchCameraMotion<'a> {
    frames: &'a FrameSet,
    output_width: u32,
    output_height: u32,
    easing: MotionEasing,
    geometry: FrameGeometry,
    processor: BatchProcessor,
}

impl<'a> BatchCameraMotion<'a> {
    pub fn new(
        frames: &'a FrameSet,
        output_width: u32,
        output_height: u32,
        easing: MotionEasing,
        geometry: FrameGeometry,
    ) -> VbatchResult<Self> {
        if output_width == 0 || output_height == 0 {
            return Err(VbatchError::invalid_parameter(
                "output size",
                format!("must be at least 1x1, got {output_width}x{output_height}"),
            ));
        }
        Ok(Self {
            frames,
            output_width,
            output_height,
            easing,
            geometry,
            processor: BatchProcessor::default(),
        })
    }

    /// Linear zoom in or out.
    pub fn zoom(
        frames: &'a FrameSet,
        output_width: u32,
        output_height: u32,
        direction: ZoomDirection,
    ) -> VbatchResult<Self> {
        let motion = match direction {
            ZoomDirection::In => LinearMotion::Reverse,
            ZoomDirection::Out => LinearMotion::Forward,
        };
        Self::new(
            frames,
            output_width,
            output_height,
            motion.into(),
            FrameGeometry::Zoom,
        )
    }

    /// Zoom oscillating with a sine of the given period.
    pub fn zoom_sine(
        frames: &'a FrameSet,
        output_width: u32,
        output_height: u32,
        period_seconds: f64,
        phase_seconds: f64,
    ) -> VbatchResult<Self> {
        let sine = SineMotion::for_frames(frames, period_seconds, phase_seconds)?;
        Self::new(
            frames,
            output_width,
            output_height,
            sine.into(),
            FrameGeometry::Zoom,
        )
    }

    /// Linear pan along `direction`.
    pub fn pan(
        frames: &'a FrameSet,
        output_width: u32,
        output_height: u32,
        direction: Vector2d,
        mode: PanMode,
    ) -> VbatchResult<Self> {
        Self::new(
            frames,
            output_width,
            output_height,
            mode.linear_motion().into(),
            FrameGeometry::Pan { direction },
        )
    }

    /// Pan oscillating along `direction`. Only edge-to-edge and
    /// edge-to-centre are meaningful for a periodic move.
    pub fn pan_sine(
        frames: &'a FrameSet,
        output_width: u32,
        output_height: u32,
        direction: Vector2d,
        period_seconds: f64,
        phase_seconds: f64,
        mode: PanMode,
    ) -> VbatchResult<Self> {
        let half_range = match mode {
            PanMode::EdgeToEdge => false,
            PanMode::EdgeToCenter => true,
            PanMode::CenterToEdge => {
                return Err(VbatchError::invalid_parameter(
                    "pan_mode",
                    "sine pan supports edge to edge and edge to center only",
                ))
            }
        };
        let sine = SineMotion::for_frames(frames, period_seconds, phase_seconds)?
            .with_half_range(half_range);
        Self::new(
            frames,
            output_width,
            output_height,
            sine.into(),
            FrameGeometry::Pan { direction },
        )
    }

    /// Linear roll from 0 to `degrees`.
    pub fn roll(
        frames: &'a FrameSet,
        output_width: u32,
        output_height: u32,
        degrees: f64,
    ) -> VbatchResult<Self> {
        Self::new(
            frames,
            output_width,
            output_height,
            LinearMotion::Forward.into(),
            FrameGeometry::Roll { degrees },
        )
    }

    /// Roll oscillating between 0 and `degrees`.
    pub fn roll_sine(
        frames: &'a FrameSet,
        output_width: u32,
        output_height: u32,
        degrees: f64,
        period_seconds: f64,
        phase_seconds: f64,
    ) -> VbatchResult<Self> {
        let sine = SineMotion::for_frames(frames, period_seconds, phase_seconds)?;
        Self::new(
            frames,
            output_width,
            output_height,
            sine.into(),
            FrameGeometry::Roll { degrees },
        )
    }

    pub fn with_processor(mut self, processor: BatchProcessor) -> Self {
        self.processor = processor;
        self
    }

    /// Eased, clamped factor for every frame, in frame order.
    ///
    /// Raw progress is `(index - first) / (last - first)`, or 0.5 for a set
    /// whose first and last index coincide.
    pub fn progress_factors(&self) -> Vec<f64> {
        let first = self.frames.first_index();
        let last = self.frames.last_index();
        self.frames
            .indices()
            .iter()
            .map(|&index| {
                let raw = if first == last {
                    0.5
                } else {
                    (index - first) as f64 / (last - first) as f64
                };
                self.easing.apply(raw).clamp(0.0, 1.0)
            })
            .collect()
    }

    fn pass_through_reason(&self) -> Option<&'static str> {
        let FrameGeometry::Pan { direction } = self.geometry else {
            return None;
        };
        if direction.is_zero() {
            return Some("pan direction is zero");
        }
        match self.frames.image_dimensions() {
            Some((w, h)) if w < self.output_width || h < self.output_height => {
                Some("output is larger than input")
            }
            _ => None,
        }
    }

    pub fn execute(&self) -> VbatchResult<FrameSet> {
        if let Some(reason) = self.pass_through_reason() {
            tracing::warn!(
                geometry = ?self.geometry,
                output_width = self.output_width,
                output_height = self.output_height,
                "Cannot pan, passing frames through unchanged: {reason}"
            );
            return Ok(self.frames.clone());
        }

        let factors = self.progress_factors();
        let batch = self.processor.process(self.frames.batch(), |n, _, image| {
            Some(
                self.geometry
                    .apply(image, factors[n], self.output_width, self.output_height),
            )
        })?;

        tracing::debug!(
            frames = batch.len(),
            geometry = ?self.geometry,
            easing = ?self.easing,
            "camera motion applied"
        );
        FrameSet::new(
            batch,
            self.frames.framerate(),
            self.frames.indices().to_vec(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vbatch_frame_model::{Channels, FrameRate};

    /// Each pixel encodes its own coordinates: r = x / 100, g = y / 100.
    fn gradient(width: u32, height: u32) -> Image {
        let mut data = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&[x as f32 / 100.0, y as f32 / 100.0, 0.0]);
            }
        }
        Image::from_raw(width, height, 3, &data).unwrap()
    }

    fn frames(image: Image, indices: &[i64]) -> FrameSet {
        let images = indices.iter().map(|_| image.clone()).collect();
        FrameSet::from_images(images, FrameRate::from_fps(24), indices.to_vec()).unwrap()
    }

    #[test]
    fn test_single_frame_progress_is_half() {
        let set = frames(gradient(8, 8), &[5]);
        let motion = BatchCameraMotion::zoom(&set, 4, 4, ZoomDirection::In).unwrap();
        assert_eq!(motion.progress_factors(), vec![0.5]);
        let out = motion.execute().unwrap();
        assert_eq!(out.image_dimensions(), Some((4, 4)));
    }

    #[test]
    fn test_zoom_in_ends_on_centre_crop() {
        let image = gradient(8, 6);
        let set = frames(image.clone(), &[0, 1, 2]);
        let motion = BatchCameraMotion::zoom(&set, 4, 2, ZoomDirection::In).unwrap();
        assert_eq!(motion.progress_factors(), vec![1.0, 0.5, 0.0]);

        let out = motion.execute().unwrap();
        assert_eq!(out.indices(), set.indices());
        assert_eq!(out.images()[2], image.crop(2, 2, 6, 4));
    }

    #[test]
    fn test_zoom_out_mirrors_zoom_in() {
        let set = frames(gradient(8, 8), &[0, 4]);
        let out = BatchCameraMotion::zoom(&set, 4, 4, ZoomDirection::Out).unwrap();
        assert_eq!(out.progress_factors(), vec![0.0, 1.0]);
    }

    #[test]
    fn test_progress_follows_indices_not_positions() {
        let set = frames(gradient(4, 4), &[0, 1, 4]);
        let motion = BatchCameraMotion::roll(&set, 4, 4, 0.0).unwrap();
        assert_eq!(motion.progress_factors(), vec![0.0, 0.25, 1.0]);
    }

    #[test]
    fn test_pan_zero_direction_is_identity() {
        let set = frames(gradient(8, 8), &[0, 1, 2]);
        let out = BatchCameraMotion::pan(&set, 4, 4, Vector2d::ZERO, PanMode::EdgeToEdge)
            .unwrap()
            .execute()
            .unwrap();
        assert_eq!(out, set);
    }

    #[test]
    fn test_pan_output_larger_than_input_is_identity() {
        let set = frames(gradient(4, 4), &[0, 1]);
        let out = BatchCameraMotion::pan(&set, 8, 8, Vector2d::new(1.0, 0.0), PanMode::EdgeToEdge)
            .unwrap()
            .execute()
            .unwrap();
        assert_eq!(out, set);
    }

    #[test]
    fn test_pan_left_to_right() {
        let image = gradient(10, 6);
        let set = frames(image.clone(), &[0, 1]);
        let out = BatchCameraMotion::pan(&set, 4, 4, Vector2d::new(1.0, 0.0), PanMode::EdgeToEdge)
            .unwrap()
            .execute()
            .unwrap();
        assert_eq!(out.images()[0], image.crop(0, 1, 4, 5));
        assert_eq!(out.images()[1], image.crop(6, 1, 10, 5));
    }

    #[test]
    fn test_pan_right_to_left() {
        let image = gradient(10, 6);
        let set = frames(image.clone(), &[0, 1]);
        let out = BatchCameraMotion::pan(&set, 4, 4, Vector2d::new(-1.0, 0.0), PanMode::EdgeToEdge)
            .unwrap()
            .execute()
            .unwrap();
        assert_eq!(out.images()[0], image.crop(6, 1, 10, 5));
        assert_eq!(out.images()[1], image.crop(0, 1, 4, 5));
    }

    #[test]
    fn test_pan_across_frame_of_output_height() {
        let image = gradient(10, 4);
        let set = frames(image.clone(), &[0, 1]);
        let out = BatchCameraMotion::pan(&set, 4, 4, Vector2d::new(1.0, 0.0), PanMode::EdgeToEdge)
            .unwrap()
            .execute()
            .unwrap();
        assert_eq!(out.images()[0], image.crop(0, 0, 4, 4));
        assert_eq!(out.images()[1], image.crop(6, 0, 10, 4));
    }

    #[test]
    fn test_diagonal_pan_on_flat_space_stays_centred() {
        let image = gradient(10, 4);
        let geometry = FrameGeometry::Pan {
            direction: Vector2d::new(1.0, 1.0),
        };
        assert_eq!(geometry.apply(&image, 0.0, 4, 4), image.crop(3, 0, 7, 4));
        assert_eq!(geometry.apply(&image, 1.0, 4, 4), image.crop(3, 0, 7, 4));
    }

    #[test]
    fn test_pan_modes_cover_halves() {
        let set = frames(gradient(10, 6), &[0, 1]);
        let dir = Vector2d::new(1.0, 0.0);
        let center_to_edge = BatchCameraMotion::pan(&set, 4, 4, dir, PanMode::CenterToEdge).unwrap();
        assert_eq!(center_to_edge.progress_factors(), vec![0.5, 1.0]);
        let edge_to_center = BatchCameraMotion::pan(&set, 4, 4, dir, PanMode::EdgeToCenter).unwrap();
        assert_eq!(edge_to_center.progress_factors(), vec![0.0, 0.5]);
    }

    #[test]
    fn test_pan_geometry_within_bounds() {
        let image = gradient(12, 9);
        let geometry = FrameGeometry::Pan {
            direction: Vector2d::new(1.0, -1.0),
        };
        for step in 0..=4 {
            let out = geometry.apply(&image, step as f64 / 4.0, 5, 5);
            assert_eq!(out.dimensions(), (5, 5));
            // Alpha stays opaque only if the window never leaves the frame.
            for y in 0..5 {
                for x in 0..5 {
                    assert_eq!(out.pixel(x, y)[3], 1.0);
                }
            }
        }
    }

    #[test]
    fn test_sine_pan_rejects_center_to_edge() {
        let set = frames(gradient(8, 8), &[0, 1]);
        let result = BatchCameraMotion::pan_sine(
            &set,
            4,
            4,
            Vector2d::new(1.0, 0.0),
            1.0,
            0.0,
            PanMode::CenterToEdge,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_roll_quarter_turn() {
        let image = Image::solid(6, 6, Channels::Rgb, [1.0, 1.0, 1.0, 1.0]);
        let set = frames(gradient(6, 6), &[0, 1]).merge(&frames(image, &[2])).unwrap();
        let out = BatchCameraMotion::roll(&set, 4, 4, 90.0)
            .unwrap()
            .execute()
            .unwrap();
        assert_eq!(out.image_dimensions(), Some((4, 4)));
        assert_eq!(out.images()[0], gradient(6, 6).crop(1, 1, 5, 5));
        assert_eq!(out.images()[2], Image::solid(4, 4, Channels::Rgb, [1.0, 1.0, 1.0, 1.0]));
    }

    #[test]
    fn test_zero_output_size_rejected() {
        let set = frames(gradient(4, 4), &[0]);
        assert!(BatchCameraMotion::roll(&set, 0, 4, 10.0).is_err());
    }
}
