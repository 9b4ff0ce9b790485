use proptest::prelude::*;
use vbatch_frame_model::{Channels, FrameRate, FrameSet, Image, ImageBatch, Vector2d};
use vbatch_processing::cut_and_join::{merge_frames, Priority};
use vbatch_processing::transitions::blended_transition;
use vbatch_processing::wrapping::{images_to_frameset, unwrap_frameset, GapMode};
use vbatch_processing::{BatchCameraMotion, BatchProcessor, PanMode, ZoomDirection};

fn checker(width: u32, height: u32) -> Image {
    let mut data = Vec::with_capacity((width * height * 3) as usize);
    for y in 0..height {
        for x in 0..width {
            let v = if (x + y) % 2 == 0 { 1.0 } else { 0.0 };
            data.extend_from_slice(&[v, v, v]);
        }
    }
    Image::from_raw(width, height, 3, &data).expect("checker data matches size")
}

fn clip(count: usize, first_index: i64, step: i64) -> FrameSet {
    let batch = ImageBatch::new(vec![checker(32, 18); count]).expect("same shapes");
    images_to_frameset(batch, first_index, step, 24, 1).expect("valid clip")
}

#[test]
fn sparse_clip_pans_then_unwraps_to_full_length() {
    let frames = clip(4, 0, 3);
    let panned = BatchCameraMotion::pan(&frames, 16, 9, Vector2d::new(1.0, 1.0), PanMode::EdgeToEdge)
        .expect("valid output size")
        .with_processor(BatchProcessor::parallel())
        .execute()
        .expect("pan succeeds");

    assert_eq!(panned.indices(), frames.indices());
    assert_eq!(panned.image_dimensions(), Some((16, 9)));

    let unwrapped = unwrap_frameset(&panned, GapMode::Blend).expect("blend fills gaps");
    assert_eq!(unwrapped.images.len(), 10);
    assert_eq!(unwrapped.frame_count, 4);
}

#[test]
fn zoomed_clips_join_with_a_blended_transition() {
    let a = BatchCameraMotion::zoom(&clip(6, 0, 1), 16, 16, ZoomDirection::In)
        .expect("valid output size")
        .execute()
        .expect("zoom succeeds");
    let b = BatchCameraMotion::zoom_sine(&clip(6, 0, 1), 16, 16, 0.5, 0.0)
        .expect("valid period")
        .execute()
        .expect("zoom succeeds");

    let joined = blended_transition(&a, &b, 0.125).expect("compatible clips");
    assert_eq!(joined.len(), 12);
    assert!(!joined.has_index_gaps());
    assert_eq!(joined.first_index(), 0);
}

#[test]
fn merge_priority_survives_camera_motion() {
    let base = clip(4, 0, 1);
    let roll = BatchCameraMotion::roll(&base, 18, 18, 30.0)
        .expect("valid output size")
        .execute()
        .expect("roll succeeds");
    let still = BatchCameraMotion::roll(&base, 18, 18, 0.0)
        .expect("valid output size")
        .execute()
        .expect("roll succeeds");

    let merged = merge_frames(&roll, &still, Priority::UseBWhenPossible).expect("same shape");
    assert_eq!(merged, still);
}

proptest! {
    #[test]
    fn progress_factors_stay_in_unit_range(
        count in 1usize..12,
        step in 1i64..4,
        period in 0.1f64..4.0,
        phase in -2.0f64..2.0,
    ) {
        let frames = clip(count, 0, step);
        let motions = [
            BatchCameraMotion::zoom(&frames, 8, 8, ZoomDirection::Out),
            BatchCameraMotion::zoom_sine(&frames, 8, 8, period, phase),
            BatchCameraMotion::pan_sine(
                &frames, 8, 8, Vector2d::new(0.0, 1.0), period, phase, PanMode::EdgeToCenter,
            ),
            BatchCameraMotion::roll_sine(&frames, 8, 8, 45.0, period, phase),
        ];
        for motion in motions {
            let motion = motion.expect("valid parameters");
            let factors = motion.progress_factors();
            prop_assert_eq!(factors.len(), count);
            prop_assert!(factors.iter().all(|f| (0.0..=1.0).contains(f)));
        }
    }

    #[test]
    fn camera_motion_keeps_indices_and_framerate(count in 1usize..6, first in -5i64..5) {
        let frames = clip(count, first, 2);
        let out = BatchCameraMotion::zoom(&frames, 10, 6, ZoomDirection::In)
            .expect("valid output size")
            .execute()
            .expect("zoom succeeds");
        prop_assert_eq!(out.indices(), frames.indices());
        prop_assert_eq!(out.framerate(), FrameRate::from_fps(24));
        prop_assert_eq!(out.image_dimensions(), Some((10, 6)));
    }
}

#[test]
fn solid_frames_fade_between_levels() {
    let dark = FrameSet::sequential(
        ImageBatch::new(vec![Image::solid(2, 2, Channels::Rgb, [0.0, 0.0, 0.0, 1.0]); 4])
            .expect("same shapes"),
        FrameRate::from_fps(8),
    );
    let light = FrameSet::sequential(
        ImageBatch::new(vec![Image::solid(2, 2, Channels::Rgb, [1.0, 1.0, 1.0, 1.0]); 4])
            .expect("same shapes"),
        FrameRate::from_fps(8),
    );
    let joined = blended_transition(&dark, &light, 0.25).expect("compatible clips");
    let levels: Vec<f32> = joined.images().iter().map(|img| img.pixel(0, 0)[0]).collect();
    assert_eq!(levels.len(), 8);
    assert!((levels[4] - 1.0 / 3.0).abs() < 1e-6);
    assert!((levels[5] - 2.0 / 3.0).abs() < 1e-6);
    assert_eq!(levels[6], 1.0);
}
