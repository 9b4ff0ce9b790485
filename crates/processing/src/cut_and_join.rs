//! Cutting frame sets apart and joining them back together.

use serde::{Deserialize, Serialize};
use vbatch_common::{VbatchError, VbatchResult};
use vbatch_frame_model::FrameSet;

/// Which input keeps its frame when both sets hold the same index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Priority {
    #[default]
    UseAWhenPossible,
    UseBWhenPossible,
}

/// Union of `a` and `b` by index, resolving collisions by `priority`.
pub fn merge_frames(a: &FrameSet, b: &FrameSet, priority: Priority) -> VbatchResult<FrameSet> {
    match priority {
        Priority::UseAWhenPossible => a.merge(b),
        Priority::UseBWhenPossible => b.merge(a),
    }
}

/// Two halves sharing `overlap` frames between them.
pub fn split(frames: &FrameSet, overlap: usize) -> VbatchResult<(FrameSet, FrameSet)> {
    frames.split_half(overlap)
}

/// The first `count` frames, and everything after them.
pub fn split_beginning(frames: &FrameSet, count: usize) -> (FrameSet, FrameSet) {
    frames.split_beginning(count)
}

/// Everything before the last `count` frames, and those frames.
pub fn split_end(frames: &FrameSet, count: usize) -> (FrameSet, FrameSet) {
    frames.split_end(count)
}

/// `second` appended to `first`, continuing its indices.
pub fn concat(first: &FrameSet, second: &FrameSet) -> VbatchResult<FrameSet> {
    first.concat(second)
}

/// Chain any number of sets end to end.
pub fn concat_all<'a, I>(sets: I) -> VbatchResult<FrameSet>
where
    I: IntoIterator<Item = &'a FrameSet>,
{
    let mut sets = sets.into_iter();
    let first = sets
        .next()
        .ok_or_else(|| VbatchError::processing("concat needs at least one frame set"))?;
    sets.try_fold(first.clone(), |joined, next| joined.concat(next))
}

/// Play the frames backwards over the same indices.
pub fn reverse(frames: &FrameSet) -> FrameSet {
    frames.reversed()
}

/// Loop the frames `times` times.
pub fn repeat(frames: &FrameSet, times: usize) -> VbatchResult<FrameSet> {
    frames.repeated(times)
}

/// Replace the indices with `first, first + step, ...`.
pub fn reindex(frames: &FrameSet, first: i64, step: i64) -> VbatchResult<FrameSet> {
    if step < 1 {
        return Err(VbatchError::invalid_parameter(
            "step",
            format!("must be at least 1, got {step}"),
        ));
    }
    frames.reindexed(first, step)
}

/// Shift every index by `delta`.
pub fn offset(frames: &FrameSet, delta: i64) -> FrameSet {
    frames.with_offset(delta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vbatch_frame_model::{Channels, FrameRate, Image};

    fn set(level: f32, indices: &[i64]) -> FrameSet {
        let images = indices
            .iter()
            .map(|_| Image::solid(1, 1, Channels::Rgb, [level, level, level, 1.0]))
            .collect();
        FrameSet::from_images(images, FrameRate::from_fps(12), indices.to_vec()).unwrap()
    }

    fn levels(frames: &FrameSet) -> Vec<f32> {
        frames.images().iter().map(|img| img.pixel(0, 0)[0]).collect()
    }

    #[test]
    fn test_merge_priority_swaps_receiver() {
        let a = set(0.25, &[0, 1, 2]);
        let b = set(0.75, &[2, 3]);
        let use_a = merge_frames(&a, &b, Priority::UseAWhenPossible).unwrap();
        let use_b = merge_frames(&a, &b, Priority::UseBWhenPossible).unwrap();
        assert_eq!(use_a.indices(), &[0, 1, 2, 3]);
        assert_eq!(levels(&use_a)[2], 0.25);
        assert_eq!(levels(&use_b)[2], 0.75);
    }

    #[test]
    fn test_concat_all_chains_in_order() {
        let parts = [set(0.0, &[0, 1]), set(0.5, &[7]), set(1.0, &[3, 9])];
        let joined = concat_all(&parts).unwrap();
        assert_eq!(joined.indices(), &[0, 1, 2, 3, 4]);
        assert_eq!(levels(&joined), vec![0.0, 0.0, 0.5, 1.0, 1.0]);
        assert!(concat_all(std::iter::empty()).is_err());
    }

    #[test]
    fn test_reindex_rejects_non_positive_step() {
        let frames = set(0.0, &[0, 1]);
        assert!(matches!(
            reindex(&frames, 0, 0),
            Err(VbatchError::InvalidParameter { .. })
        ));
        assert_eq!(reindex(&frames, 5, 3).unwrap().indices(), &[5, 8]);
    }

    #[test]
    fn test_split_and_rejoin() {
        let frames = set(0.5, &[0, 1, 2, 3, 4]);
        let (head, tail) = split_beginning(&frames, 2);
        assert_eq!(head.len(), 2);
        assert_eq!(concat(&head, &tail).unwrap(), frames);

        let (first, second) = split(&frames, 0).unwrap();
        assert_eq!(first.indices(), &[0, 1]);
        assert_eq!(second.indices(), &[2, 3, 4]);
    }
}
