//! Equal-shaped batches of images.
//!
//! An [`ImageBatch`] is the in-memory stand-in for the host's image tensor:
//! `count × height × width × channels`, every frame the same shape.

use vbatch_common::{VbatchError, VbatchResult};

use crate::raster::{Channels, Image};

/// Ordered images sharing one width, height, and channel layout.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageBatch {
    images: Vec<Image>,
}

impl ImageBatch {
    /// Build a batch, rejecting mixed shapes.
    pub fn new(images: Vec<Image>) -> VbatchResult<Self> {
        if let Some(first) = images.first() {
            let shape = (first.dimensions(), first.channels());
            if let Some((pos, odd)) = images
                .iter()
                .enumerate()
                .find(|(_, img)| (img.dimensions(), img.channels()) != shape)
            {
                return Err(VbatchError::construction(format!(
                    "image {pos} is {:?} {:?}, batch is {:?} {:?}",
                    odd.dimensions(),
                    odd.channels(),
                    shape.0,
                    shape.1
                )));
            }
        }
        Ok(Self { images })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    // Images drawn from an existing batch already share one shape.
    pub(crate) fn from_validated(images: Vec<Image>) -> Self {
        Self { images }
    }

    /// Split a flat `count × height × width × channels` array into frames.
    pub fn from_raw(
        count: usize,
        height: u32,
        width: u32,
        channels: usize,
        data: &[f32],
    ) -> VbatchResult<Self> {
        let frame_len = height as usize * width as usize * channels;
        if data.len() != count * frame_len {
            return Err(VbatchError::construction(format!(
                "tensor has {} values, expected {count}x{height}x{width}x{channels}",
                data.len()
            )));
        }
        if count == 0 {
            return Ok(Self::empty());
        }
        if frame_len == 0 {
            return Err(VbatchError::construction(format!(
                "tensor of {count} frames has zero-sized frames {height}x{width}x{channels}"
            )));
        }
        let images = data
            .chunks_exact(frame_len)
            .map(|chunk| Image::from_raw(width, height, channels, chunk))
            .collect::<VbatchResult<Vec<_>>>()?;
        Self::new(images)
    }

    /// Flat `count × height × width × channels` copy.
    pub fn to_raw(&self) -> Vec<f32> {
        self.images.iter().flat_map(Image::to_raw).collect()
    }

    /// `(count, height, width, channels)`, or `None` when empty.
    pub fn shape(&self) -> Option<(usize, u32, u32, usize)> {
        self.images.first().map(|img| {
            (
                self.images.len(),
                img.height(),
                img.width(),
                img.channels().count(),
            )
        })
    }

    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.images.first().map(Image::dimensions)
    }

    pub fn channels(&self) -> Option<Channels> {
        self.images.first().map(Image::channels)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn images(&self) -> &[Image] {
        &self.images
    }

    pub fn get(&self, i: usize) -> Option<&Image> {
        self.images.get(i)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Image> {
        self.images.iter()
    }

    pub fn into_images(self) -> Vec<Image> {
        self.images
    }
}

impl<'a> IntoIterator for &'a ImageBatch {
    type Item = &'a Image;
    type IntoIter = std::slice::Iter<'a, Image>;

    fn into_iter(self) -> Self::IntoIter {
        self.images.iter()
    }
}
