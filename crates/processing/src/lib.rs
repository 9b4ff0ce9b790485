//! VBatch Processing
//!
//! Transforms over indexed frame sets:
//! - **Camera motion:** Zoom, pan, and roll driven by linear or sine easing
//! - **Transitions:** Fades to and from black, blended splices between sets
//! - **Cut and join:** Merge with priority, split, concatenate, repeat, reindex
//! - **Wrapping:** Image batches in, flattened images and metadata out
//!
//! This crate is pure computation. Inputs are frame sets and scalars;
//! outputs are new frame sets. Nothing here reads configuration or files.

pub mod batch;
pub mod camera;
pub mod cut_and_join;
pub mod dimensions;
pub mod easing;
pub mod transitions;
pub mod wrapping;

pub use batch::BatchProcessor;
pub use camera::{BatchCameraMotion, FrameGeometry, PanMode, ZoomDirection};
pub use easing::{LinearMotion, MotionEasing, SineMotion};
