//! Frame size helpers.

use serde::{Deserialize, Serialize};
use vbatch_common::{VbatchError, VbatchResult};
use vbatch_frame_model::FrameSet;

/// Sizes offered for the long edge of a frame.
pub const COMMON_SIZES: [u32; 8] = [3840, 1920, 1440, 1280, 768, 720, 640, 512];

/// Aspect ratios offered as `(wide, narrow)` pairs.
pub const COMMON_ASPECTS: [(u32, u32); 8] = [
    (16, 9),
    (16, 10),
    (4, 3),
    (1, 1),
    (5, 4),
    (3, 2),
    (21, 9),
    (14, 9),
];

/// Working-size divisors offered.
pub const COMMON_DIVISORS: [u32; 4] = [8, 4, 2, 1];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Orientation {
    #[default]
    Wide,
    Tall,
}

/// Rounding used when snapping a length to a multiple of the alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AlignmentType {
    #[default]
    Ceil,
    Floor,
    Nearest,
}

impl AlignmentType {
    pub fn align(self, n: i64, alignment: i64) -> i64 {
        if alignment <= 1 {
            return n;
        }
        let q = n as f64 / alignment as f64;
        let q = match self {
            AlignmentType::Ceil => q.ceil(),
            AlignmentType::Floor => q.floor(),
            AlignmentType::Nearest => q.round_ties_even(),
        };
        q as i64 * alignment
    }
}

/// Working and final frame sizes, already oriented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameDimensions {
    pub width: i64,
    pub height: i64,
    pub final_width: i64,
    pub final_height: i64,
}

/// Working size for a final frame of `size` pixels along the long edge.
///
/// The working width is `size / divisor` snapped to `alignment`; the working
/// height follows from the aspect ratio and is snapped the same way. `Tall`
/// swaps width and height in both pairs.
pub fn common_frame_dimensions(
    size: u32,
    aspect: (u32, u32),
    orientation: Orientation,
    divisor: u32,
    alignment: i64,
    alignment_type: AlignmentType,
) -> VbatchResult<FrameDimensions> {
    let (rw, rh) = aspect;
    if rw == 0 || rh == 0 {
        return Err(VbatchError::invalid_parameter(
            "aspect_ratio",
            format!("{rw}:{rh} has a zero side"),
        ));
    }
    if divisor == 0 {
        return Err(VbatchError::invalid_parameter("divisor", "must be at least 1"));
    }

    let ratio = f64::from(rh) / f64::from(rw);
    let final_width = i64::from(size);
    let final_height = (final_width as f64 * ratio).round_ties_even() as i64;
    let width = alignment_type.align(
        (f64::from(size) / f64::from(divisor)).round_ties_even() as i64,
        alignment,
    );
    let height =
        alignment_type.align((width as f64 * ratio).round_ties_even() as i64, alignment);

    Ok(match orientation {
        Orientation::Wide => FrameDimensions {
            width,
            height,
            final_width,
            final_height,
        },
        Orientation::Tall => FrameDimensions {
            width: height,
            height: width,
            final_width: final_height,
            final_height: final_width,
        },
    })
}

/// Frame size of `frames` scaled by `factor`, rounded to whole pixels.
pub fn scaled_dimensions(frames: &FrameSet, factor: f64) -> VbatchResult<(i64, i64)> {
    let (w, h) = frames
        .image_dimensions()
        .ok_or_else(|| VbatchError::processing("cannot scale the dimensions of an empty frame set"))?;
    Ok((
        (f64::from(w) * factor).round_ties_even() as i64,
        (f64::from(h) * factor).round_ties_even() as i64,
    ))
}

/// Parse an aspect ratio written as `"16:9"`.
pub fn parse_aspect(text: &str) -> VbatchResult<(u32, u32)> {
    let invalid = || VbatchError::invalid_parameter("aspect_ratio", format!("'{text}' is not W:H"));
    let (w, h) = text.split_once(':').ok_or_else(invalid)?;
    let w = w.trim().parse().map_err(|_| invalid())?;
    let h = h.trim().parse().map_err(|_| invalid())?;
    Ok((w, h))
}
