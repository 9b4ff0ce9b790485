//! Run one node over image files and write its outputs.

use std::path::{Path, PathBuf};

use vbatch_common::AppConfig;
use vbatch_frame_model::{FrameRate, FrameSet, Image, ImageBatch};
use vbatch_nodes::{NodeCatalog, NodeInputs, NodeValue, ParamKind};

pub struct RunArgs {
    pub node: String,
    pub params: Vec<String>,
    pub fps: Option<u32>,
    pub output: PathBuf,
    pub second: Vec<PathBuf>,
    pub images: Vec<PathBuf>,
}

pub fn run(config: &AppConfig, args: RunArgs) -> anyhow::Result<()> {
    let catalog = NodeCatalog::from_config(config);
    let descriptor = catalog
        .find(&args.node)
        .ok_or_else(|| anyhow::anyhow!("Unknown node '{}'. Try `vbatch nodes`.", args.node))?;

    let framerate = match args.fps {
        Some(fps) => FrameRate::from_fps(fps),
        None => FrameRate::new(config.defaults.framerate_base, config.defaults.framerate_divisor),
    };
    if framerate.base() == 0 {
        anyhow::bail!("--fps must be at least 1");
    }

    let mut inputs = NodeInputs::new();

    // Image sources go to the frame inputs in declaration order.
    let mut sources = [args.images.as_slice(), args.second.as_slice()].into_iter();
    for spec in descriptor.inputs.iter().filter(|s| s.kind.is_frames()) {
        let Some(paths) = sources.next().filter(|p| !p.is_empty()) else {
            break;
        };
        let batch = load_batch(paths)?;
        match spec.kind {
            ParamKind::Images => inputs.insert(&spec.name, batch),
            _ => inputs.insert(&spec.name, FrameSet::sequential(batch, framerate)),
        }
    }
    if sources.next().is_some_and(|p| !p.is_empty()) {
        tracing::warn!(node = %descriptor.name, "node has one frame input, ignoring --second");
    }

    for param in &args.params {
        let (name, raw) = param
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("Parameter '{param}' is not NAME=VALUE"))?;
        let name = name.trim();
        let spec = descriptor.input(name).ok_or_else(|| {
            anyhow::anyhow!("Node '{}' has no input '{name}'", descriptor.name)
        })?;
        inputs.insert(name, parse_param(name, &spec.kind, raw.trim())?);
    }

    let node_name = descriptor.name.clone();
    let outputs = catalog
        .execute(&node_name, inputs)
        .map_err(|e| anyhow::anyhow!("Failed to run '{node_name}': {e}"))?;

    let frame_outputs = outputs
        .iter()
        .filter(|(_, v)| matches!(v, NodeValue::Frames(_) | NodeValue::Images(_)))
        .count();

    for (name, value) in outputs.iter() {
        let dir = if frame_outputs > 1 {
            args.output.join(name)
        } else {
            args.output.clone()
        };
        match value {
            NodeValue::Frames(frames) => {
                let written = write_frames(&dir, frames)?;
                println!(
                    "{name}: {written} frames [{}..={}] @ {:.3} fps -> {}",
                    frames.first_index(),
                    frames.last_index(),
                    frames.framerate().as_f64(),
                    dir.display()
                );
            }
            NodeValue::Images(batch) => {
                let written = write_images(&dir, batch)?;
                println!("{name}: {written} images -> {}", dir.display());
            }
            NodeValue::Int(v) => println!("{name}: {v}"),
            NodeValue::Float(v) => println!("{name}: {v}"),
            NodeValue::Text(v) => println!("{name}: {v}"),
        }
    }

    Ok(())
}

fn parse_param(name: &str, kind: &ParamKind, raw: &str) -> anyhow::Result<NodeValue> {
    let value = match kind {
        ParamKind::Int { .. } => NodeValue::Int(
            raw.parse()
                .map_err(|e| anyhow::anyhow!("Input '{name}' expects an integer: {e}"))?,
        ),
        ParamKind::Float { .. } => NodeValue::Float(
            raw.parse()
                .map_err(|e| anyhow::anyhow!("Input '{name}' expects a number: {e}"))?,
        ),
        ParamKind::Choice { .. } => NodeValue::Text(raw.to_string()),
        ParamKind::FrameSet | ParamKind::Images => {
            anyhow::bail!("Input '{name}' takes frames; pass image files instead")
        }
    };
    Ok(value)
}

fn load_batch(paths: &[PathBuf]) -> anyhow::Result<ImageBatch> {
    let images = paths
        .iter()
        .map(|path| {
            let decoded = image::open(path)
                .map_err(|e| anyhow::anyhow!("Failed to open {}: {e}", path.display()))?;
            Ok(Image::from_dynamic(&decoded))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    tracing::debug!(count = images.len(), "decoded input images");
    ImageBatch::new(images).map_err(|e| anyhow::anyhow!("Input images do not match: {e}"))
}

fn write_frames(dir: &Path, frames: &FrameSet) -> anyhow::Result<usize> {
    std::fs::create_dir_all(dir)?;
    for (image, index) in frames.images().iter().zip(frames.indices()) {
        save_png(image, &dir.join(format!("{index:06}.png")))?;
    }
    Ok(frames.len())
}

fn write_images(dir: &Path, batch: &ImageBatch) -> anyhow::Result<usize> {
    std::fs::create_dir_all(dir)?;
    for (i, image) in batch.iter().enumerate() {
        save_png(image, &dir.join(format!("{i:06}.png")))?;
    }
    Ok(batch.len())
}

fn save_png(image: &Image, path: &Path) -> anyhow::Result<()> {
    let dynamic = image.to_dynamic();
    let result = if image.channels().count() == 4 {
        dynamic.to_rgba8().save(path)
    } else {
        dynamic.to_rgb8().save(path)
    };
    result.map_err(|e| anyhow::anyhow!("Failed to write {}: {e}", path.display()))
}
