//! VBatch Frame Model
//!
//! Defines the core data contracts for batches of video frames:
//! - **FrameSet:** An ordered, gap-tolerant sequence of images keyed by frame index
//! - **FrameRate:** Rational frames-per-second with seconds/frames conversion
//! - **Image / ImageBatch:** Normalized RGB(A) pixel arrays and equal-shaped batches
//! - **Geometry:** 2D vectors and axis-aligned rectangles with line intersection
//!
//! Every transform returns a new value; nothing here mutates in place.

pub mod batch;
pub mod framerate;
pub mod frameset;
pub mod raster;
pub mod vector;

pub use batch::*;
pub use framerate::*;
pub use frameset::*;
pub use raster::*;
pub use vector::*;
