//! Indexed frame sequences.
//!
//! A [`FrameSet`] pairs an [`ImageBatch`] with one integer index per image.
//! Indices are strictly increasing but need not be contiguous: a set with
//! indices `[0, 1, 4]` is missing frames 2 and 3, which the inbetween
//! generators can fill in. All operations return new sets.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use vbatch_common::{VbatchError, VbatchResult};

use crate::batch::ImageBatch;
use crate::framerate::FrameRate;
use crate::raster::Image;

/// An image tagged with its frame index.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedImage {
    pub image: Image,
    pub index: i64,
}

impl IndexedImage {
    pub fn new(image: Image, index: i64) -> Self {
        Self { image, index }
    }
}

/// How missing frames are synthesized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FillMode {
    /// Cross-fade the neighbours, weighted by distance.
    Blend,
    /// Copy the nearer neighbour; ties go to the later frame.
    ClosestFrame,
    /// Copy the earlier neighbour.
    PreviousFrame,
}

/// Ordered, gap-tolerant sequence of images keyed by frame index.
#[derive(Debug, Clone)]
pub struct FrameSet {
    batch: ImageBatch,
    framerate: FrameRate,
    indices: Vec<i64>,
    indexed_length: i64,
    indexed_images: OnceLock<Vec<IndexedImage>>,
}

impl FrameSet {
    /// Create a frame set.
    ///
    /// Fails if `indices` and `batch` differ in length or the indices are
    /// not strictly increasing.
    pub fn new(batch: ImageBatch, framerate: FrameRate, indices: Vec<i64>) -> VbatchResult<Self> {
        if batch.len() != indices.len() {
            return Err(VbatchError::construction(format!(
                "frame set has {} images but {} indices",
                batch.len(),
                indices.len()
            )));
        }
        if let Some(w) = indices.windows(2).find(|w| w[1] <= w[0]) {
            return Err(VbatchError::construction(format!(
                "frame indices must be strictly increasing, found {} followed by {}",
                w[0], w[1]
            )));
        }
        Ok(Self::from_parts(batch, framerate, indices))
    }

    /// Indices `0..n` in batch order.
    pub fn sequential(batch: ImageBatch, framerate: FrameRate) -> Self {
        let indices = (0..batch.len() as i64).collect();
        Self::from_parts(batch, framerate, indices)
    }

    pub fn empty(framerate: FrameRate) -> Self {
        Self::from_parts(ImageBatch::empty(), framerate, Vec::new())
    }

    pub fn from_images(
        images: Vec<Image>,
        framerate: FrameRate,
        indices: Vec<i64>,
    ) -> VbatchResult<Self> {
        Self::new(ImageBatch::new(images)?, framerate, indices)
    }

    /// Build from `(image, index)` pairs, which must already be in index order.
    pub fn from_indexed_images(
        items: Vec<IndexedImage>,
        framerate: FrameRate,
    ) -> VbatchResult<Self> {
        let (images, indices) = items
            .into_iter()
            .map(|item| (item.image, item.index))
            .unzip();
        Self::from_images(images, framerate, indices)
    }

    // Callers guarantee the invariants checked in `new`.
    fn from_parts(batch: ImageBatch, framerate: FrameRate, indices: Vec<i64>) -> Self {
        let indexed_length = match (indices.first(), indices.last()) {
            (Some(first), Some(last)) => last - first + 1,
            _ => 0,
        };
        Self {
            batch,
            framerate,
            indices,
            indexed_length,
            indexed_images: OnceLock::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn framerate(&self) -> FrameRate {
        self.framerate
    }

    pub fn indices(&self) -> &[i64] {
        &self.indices
    }

    pub fn batch(&self) -> &ImageBatch {
        &self.batch
    }

    pub fn images(&self) -> &[Image] {
        self.batch.images()
    }

    /// First frame index, or -1 when empty.
    pub fn first_index(&self) -> i64 {
        self.indices.first().copied().unwrap_or(-1)
    }

    /// Last frame index, or -1 when empty.
    pub fn last_index(&self) -> i64 {
        self.indices.last().copied().unwrap_or(-1)
    }

    /// Span from first to last index including gaps; 0 when empty.
    pub fn indexed_length(&self) -> i64 {
        self.indexed_length
    }

    /// `(width, height)` of the frames, or `None` when empty.
    pub fn image_dimensions(&self) -> Option<(u32, u32)> {
        self.batch.dimensions()
    }

    /// The frames paired with their indices. Built on first access.
    pub fn indexed_images(&self) -> &[IndexedImage] {
        self.indexed_images.get_or_init(|| {
            self.batch
                .iter()
                .zip(&self.indices)
                .map(|(image, &index)| IndexedImage::new(image.clone(), index))
                .collect()
        })
    }

    /// True if any two consecutive indices are more than one apart.
    pub fn has_index_gaps(&self) -> bool {
        self.indices.windows(2).any(|w| w[1] - w[0] != 1)
    }

    /// Same images, indices replaced with `first, first + step, ...`.
    pub fn reindexed(&self, first: i64, step: i64) -> VbatchResult<FrameSet> {
        let indices = (0..self.len() as i64).map(|i| first + i * step).collect();
        FrameSet::new(self.batch.clone(), self.framerate, indices)
    }

    /// Every index shifted by `delta`.
    pub fn with_offset(&self, delta: i64) -> FrameSet {
        let indices = self.indices.iter().map(|i| i + delta).collect();
        Self::from_parts(self.batch.clone(), self.framerate, indices)
    }

    /// Image order reversed; the index list stays as it was.
    pub fn reversed(&self) -> FrameSet {
        let images = self.batch.images().iter().rev().cloned().collect();
        Self::from_parts(ImageBatch::from_validated(images), self.framerate, self.indices.clone())
    }

    /// Union of both index sets. On an index present in both, `self` wins.
    ///
    /// Swap receiver and argument to give the other set priority.
    pub fn merge(&self, other: &FrameSet) -> VbatchResult<FrameSet> {
        self.ensure_compatible("merge", other)?;

        let mut items = Vec::with_capacity(self.len() + other.len());
        let (mut i, mut j) = (0, 0);
        loop {
            match (self.indices.get(i), other.indices.get(j)) {
                (Some(&a), Some(&b)) if a == b => {
                    items.push((self.images()[i].clone(), a));
                    i += 1;
                    j += 1;
                }
                (Some(&a), Some(&b)) if a < b => {
                    items.push((self.images()[i].clone(), a));
                    i += 1;
                }
                (Some(&a), None) => {
                    items.push((self.images()[i].clone(), a));
                    i += 1;
                }
                (_, Some(&b)) => {
                    items.push((other.images()[j].clone(), b));
                    j += 1;
                }
                (None, None) => break,
            }
        }

        let (images, indices): (Vec<_>, Vec<_>) = items.into_iter().unzip();
        tracing::debug!(
            left = self.len(),
            right = other.len(),
            merged = indices.len(),
            "merged frame sets"
        );
        FrameSet::from_images(images, self.framerate, indices)
    }

    /// `other` appended after this set, reindexed to continue at
    /// `last_index + 1` with step 1.
    pub fn concat(&self, other: &FrameSet) -> VbatchResult<FrameSet> {
        self.ensure_compatible("concat", other)?;
        let tail = other.reindexed(self.last_index() + 1, 1)?;
        let mut images = self.images().to_vec();
        images.extend_from_slice(tail.images());
        let mut indices = self.indices.clone();
        indices.extend_from_slice(tail.indices());
        FrameSet::from_images(images, self.framerate, indices)
    }

    /// This set followed by itself, `times` times in total, contiguously
    /// reindexed from the current first index.
    pub fn repeated(&self, times: usize) -> VbatchResult<FrameSet> {
        if times == 0 {
            return Err(VbatchError::processing("repeat count must be at least 1"));
        }
        let mut images = Vec::with_capacity(self.len() * times);
        for _ in 0..times {
            images.extend_from_slice(self.images());
        }
        let first = self.first_index();
        let indices = (0..images.len() as i64).map(|i| first + i).collect();
        FrameSet::from_images(images, self.framerate, indices)
    }

    /// Split into halves at `len / 2`, sharing up to `overlap` frames.
    ///
    /// The first half gains `overlap / 2` leading frames of the second half;
    /// the second half gains the rest of the overlap as trailing frames of
    /// the first half. Indices are kept.
    pub fn split_half(&self, overlap: usize) -> VbatchResult<(FrameSet, FrameSet)> {
        let items = self.indexed_images();
        let n = items.len() / 2;
        let (first, second) = items.split_at(n);

        let first_extra = second.len().min(overlap / 2);
        let second_extra = first.len().min(overlap - first_extra);

        let head: Vec<IndexedImage> = first
            .iter()
            .chain(&second[..first_extra])
            .cloned()
            .collect();
        let tail: Vec<IndexedImage> = first[first.len() - second_extra..]
            .iter()
            .chain(second)
            .cloned()
            .collect();

        tracing::debug!(
            total = items.len(),
            first = head.len(),
            second = tail.len(),
            overlap,
            "split frame set"
        );
        Ok((
            FrameSet::from_indexed_images(head, self.framerate)?,
            FrameSet::from_indexed_images(tail, self.framerate)?,
        ))
    }

    /// The first `count` frames and the remainder.
    pub fn split_beginning(&self, count: usize) -> (FrameSet, FrameSet) {
        self.split_at(count.min(self.len()))
    }

    /// The remainder and the last `count` frames.
    pub fn split_end(&self, count: usize) -> (FrameSet, FrameSet) {
        self.split_at(self.len() - count.min(self.len()))
    }

    fn split_at(&self, at: usize) -> (FrameSet, FrameSet) {
        let (a_img, b_img) = self.images().split_at(at);
        let (a_idx, b_idx) = self.indices.split_at(at);
        (
            Self::from_parts(
                ImageBatch::from_validated(a_img.to_vec()),
                self.framerate,
                a_idx.to_vec(),
            ),
            Self::from_parts(
                ImageBatch::from_validated(b_img.to_vec()),
                self.framerate,
                b_idx.to_vec(),
            ),
        )
    }

    /// Fill every index gap according to `mode`.
    pub fn generate_inbetween(&self, mode: FillMode) -> VbatchResult<FrameSet> {
        match mode {
            FillMode::Blend => self.generate_inbetween_blended(),
            FillMode::ClosestFrame => self.generate_inbetween_closest(),
            FillMode::PreviousFrame => self.generate_inbetween_previous(),
        }
    }

    /// Fill gaps with cross-fades weighted by position between neighbours.
    pub fn generate_inbetween_blended(&self) -> VbatchResult<FrameSet> {
        self.with_fillers(blend_filler)
    }

    /// Fill gaps with copies of the earlier neighbour.
    pub fn generate_inbetween_previous(&self) -> VbatchResult<FrameSet> {
        self.with_fillers(|prev, _next, _| Ok(prev.image.clone()))
    }

    /// Fill gaps with copies of the nearer neighbour.
    ///
    /// The earlier frame is used only when strictly nearer, so an index
    /// equidistant from both neighbours takes the later frame.
    pub fn generate_inbetween_closest(&self) -> VbatchResult<FrameSet> {
        self.with_fillers(|prev, next, index| {
            if (index - prev.index).abs() < (next.index - index).abs() {
                Ok(prev.image.clone())
            } else {
                Ok(next.image.clone())
            }
        })
    }

    /// All frames in index order with every gap filled by blending.
    pub fn get_blended_frame_images(&self) -> VbatchResult<Vec<Image>> {
        let items = self.indexed_images();
        let mut output = Vec::with_capacity(self.indexed_length.max(0) as usize);
        if let Some(first) = items.first() {
            output.push(first.image.clone());
        }
        for pair in items.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            for index in prev.index + 1..next.index {
                output.push(blend_filler(prev, next, index)?);
            }
            output.push(next.image.clone());
        }
        Ok(output)
    }

    fn with_fillers<F>(&self, fill: F) -> VbatchResult<FrameSet>
    where
        F: Fn(&IndexedImage, &IndexedImage, i64) -> VbatchResult<Image>,
    {
        let mut fillers = Vec::new();
        for pair in self.indexed_images().windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            for index in prev.index + 1..next.index {
                fillers.push(IndexedImage::new(fill(prev, next, index)?, index));
            }
        }
        if fillers.is_empty() {
            return Ok(self.clone());
        }
        tracing::debug!(generated = fillers.len(), "generated inbetween frames");
        self.merge(&FrameSet::from_indexed_images(fillers, self.framerate)?)
    }

    /// Splice `other` after this set with a cross-fade of `fade_length` frames.
    ///
    /// This set is kept whole. The first `fade_length` frames of `other` are
    /// replaced by blends of this set's last `fade_length` frames into them,
    /// at weights `(i + 1) / (fade_length + 1)`; the remaining frames of
    /// `other` follow. Everything after this set is indexed contiguously from
    /// `last_index + 1`. A `fade_length` below 1 is a plain [`concat`].
    ///
    /// [`concat`]: FrameSet::concat
    pub fn fade_to(&self, other: &FrameSet, fade_length: i64) -> VbatchResult<FrameSet> {
        if fade_length < 1 {
            return self.concat(other);
        }
        self.ensure_compatible("fade", other)?;
        let fade = fade_length as usize;
        if fade > self.len() || fade > other.len() {
            return Err(VbatchError::incompatible(
                "fade",
                format!(
                    "fade length {fade} exceeds frame set lengths {} and {}",
                    self.len(),
                    other.len()
                ),
            ));
        }

        let mut images = self.images().to_vec();
        let tail_start = self.len() - fade;
        for i in 0..fade {
            let f = (i + 1) as f64 / (fade + 1) as f64;
            let prev = &self.images()[tail_start + i];
            images.push(prev.cross_fade(&other.images()[i], f)?);
        }
        images.extend_from_slice(&other.images()[fade..]);

        let mut indices = self.indices.clone();
        let start = self.last_index() + 1;
        indices.extend((0..other.len() as i64).map(|i| start + i));

        tracing::debug!(
            first = self.len(),
            second = other.len(),
            fade,
            "faded frame sets"
        );
        FrameSet::from_images(images, self.framerate, indices)
    }

    fn ensure_compatible(&self, operation: &str, other: &FrameSet) -> VbatchResult<()> {
        if self.framerate != other.framerate {
            return Err(VbatchError::incompatible(
                operation,
                format!(
                    "frame rate {} differs from {}",
                    self.framerate, other.framerate
                ),
            ));
        }
        if let (Some(a), Some(b)) = (self.image_dimensions(), other.image_dimensions()) {
            if a != b {
                return Err(VbatchError::incompatible(
                    operation,
                    format!("image dimensions {a:?} differ from {b:?}"),
                ));
            }
        }
        Ok(())
    }
}

impl PartialEq for FrameSet {
    fn eq(&self, other: &Self) -> bool {
        self.framerate == other.framerate
            && self.indices == other.indices
            && self.batch == other.batch
    }
}

fn blend_filler(prev: &IndexedImage, next: &IndexedImage, index: i64) -> VbatchResult<Image> {
    let f = (index - prev.index) as f64 / (next.index - prev.index) as f64;
    prev.image.cross_fade(&next.image, f)
}
