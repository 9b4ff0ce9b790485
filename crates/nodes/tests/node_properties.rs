use proptest::prelude::*;
use vbatch_common::UiConfig;
use vbatch_frame_model::{Channels, FrameSet, Image, ImageBatch};
use vbatch_nodes::{NodeCatalog, NodeInputs, NodeValue};
use vbatch_processing::BatchProcessor;

fn catalog() -> NodeCatalog {
    NodeCatalog::new(&UiConfig::default()).with_processor(BatchProcessor::sequential())
}

fn batch(count: usize) -> ImageBatch {
    ImageBatch::new(
        (0..count)
            .map(|i| {
                let v = i as f32 / count as f32;
                Image::solid(2, 2, Channels::Rgb, [v, v, v, 1.0])
            })
            .collect(),
    )
    .expect("same shapes")
}

fn create(catalog: &NodeCatalog, count: usize, first: i64, step: i64) -> FrameSet {
    catalog
        .execute(
            "Create Frame Set",
            NodeInputs::new()
                .with("images", batch(count))
                .with("first_frame_index", first)
                .with("step", step),
        )
        .expect("create frame set")
        .frames("frames")
        .expect("frames output")
        .clone()
}

proptest! {
    #[test]
    fn created_indices_follow_first_and_step(
        count in 1usize..6,
        first in -50i64..50,
        step in 1i64..8,
        offset in -20i64..20,
    ) {
        let catalog = catalog();
        let frames = create(&catalog, count, first, step);
        let expected: Vec<i64> = (0..count as i64).map(|k| first + k * step).collect();
        prop_assert_eq!(frames.indices(), expected.as_slice());

        let shifted = catalog
            .execute(
                "Frame Set Offset",
                NodeInputs::new().with("frames", frames).with("offset", offset),
            )
            .expect("offset");
        let shifted = shifted.frames("frames").expect("frames output");
        let expected: Vec<i64> = expected.iter().map(|i| i + offset).collect();
        prop_assert_eq!(shifted.indices(), expected.as_slice());
    }

    #[test]
    fn blended_unwrap_fills_the_span(count in 1usize..6, first in -10i64..10, step in 1i64..5) {
        let catalog = catalog();
        let frames = create(&catalog, count, first, step);
        let span = (count as i64 - 1) * step + 1;

        let out = catalog
            .execute("Unwrap Frame Set", NodeInputs::new().with("frames", frames))
            .expect("unwrap");
        match out.get("images") {
            Some(NodeValue::Images(images)) => prop_assert_eq!(images.len() as i64, span),
            other => prop_assert!(false, "unexpected images output {:?}", other),
        }
        prop_assert_eq!(out.get("indexed_length"), Some(&NodeValue::Int(span)));
        prop_assert_eq!(out.get("frame_count"), Some(&NodeValue::Int(count as i64)));
        prop_assert_eq!(out.get("first_index"), Some(&NodeValue::Int(first)));
    }
}
