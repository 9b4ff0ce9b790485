//! The closed set of nodes and their execution.

use vbatch_common::{ProcessingDefaults, VbatchError, VbatchResult};
use vbatch_frame_model::{FillMode, Vector2d};
use vbatch_processing::cut_and_join::{self, Priority};
use vbatch_processing::dimensions::{self, AlignmentType, Orientation};
use vbatch_processing::transitions;
use vbatch_processing::wrapping::{self, GapMode};
use vbatch_processing::{BatchCameraMotion, BatchProcessor, PanMode, ZoomDirection};

use crate::descriptor::{InputSpec, NodeCategory, OutputSpec, ParamKind, ValueType};
use crate::value::{NodeInputs, NodeOutputs};

const PAN_MODES: [(&str, PanMode); 3] = [
    ("edge to edge", PanMode::EdgeToEdge),
    ("center to edge", PanMode::CenterToEdge),
    ("edge to center", PanMode::EdgeToCenter),
];
const SINE_PAN_MODES: [(&str, PanMode); 2] = [
    ("edge to edge", PanMode::EdgeToEdge),
    ("edge to center", PanMode::EdgeToCenter),
];
const ZOOM_DIRECTIONS: [(&str, ZoomDirection); 2] =
    [("in", ZoomDirection::In), ("out", ZoomDirection::Out)];
const FILL_MODES: [(&str, FillMode); 3] = [
    ("BLEND", FillMode::Blend),
    ("CLOSEST FRAME", FillMode::ClosestFrame),
    ("PREVIOUS FRAME", FillMode::PreviousFrame),
];
const GAP_MODES: [(&str, GapMode); 3] = [
    ("BLEND", GapMode::Blend),
    ("FAIL", GapMode::Fail),
    ("REINDEX", GapMode::Reindex),
];
const PRIORITIES: [(&str, Priority); 2] = [
    ("use_a_when_possible", Priority::UseAWhenPossible),
    ("use_b_when_possible", Priority::UseBWhenPossible),
];
const ORIENTATIONS: [(&str, Orientation); 2] =
    [("wide", Orientation::Wide), ("tall", Orientation::Tall)];
const ALIGNMENT_TYPES: [(&str, AlignmentType); 3] = [
    ("ceil", AlignmentType::Ceil),
    ("floor", AlignmentType::Floor),
    ("nearest", AlignmentType::Nearest),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    CreateFrameSet,
    UnwrapFrameSet,
    InbetweenFrames,
    FrameSetMerger,
    FrameSetSplitter,
    SplitBeginning,
    SplitEnd,
    Concatenate,
    Reverse,
    Repeat,
    Reindex,
    Offset,
    FadeToBlack,
    FadeFromBlack,
    BlendedTransition,
    LinearCameraZoom,
    LinearCameraPan,
    LinearCameraRoll,
    SineCameraZoom,
    SineCameraPan,
    SineCameraRoll,
    CommonFrameDimensions,
    FrameSetDimensionsScaled,
}

impl NodeKind {
    pub const ALL: [NodeKind; 23] = [
        NodeKind::CreateFrameSet,
        NodeKind::UnwrapFrameSet,
        NodeKind::InbetweenFrames,
        NodeKind::FrameSetMerger,
        NodeKind::FrameSetSplitter,
        NodeKind::SplitBeginning,
        NodeKind::SplitEnd,
        NodeKind::Concatenate,
        NodeKind::Reverse,
        NodeKind::Repeat,
        NodeKind::Reindex,
        NodeKind::Offset,
        NodeKind::FadeToBlack,
        NodeKind::FadeFromBlack,
        NodeKind::BlendedTransition,
        NodeKind::LinearCameraZoom,
        NodeKind::LinearCameraPan,
        NodeKind::LinearCameraRoll,
        NodeKind::SineCameraZoom,
        NodeKind::SineCameraPan,
        NodeKind::SineCameraRoll,
        NodeKind::CommonFrameDimensions,
        NodeKind::FrameSetDimensionsScaled,
    ];

    /// Undecorated node name.
    pub fn base_name(self) -> &'static str {
        match self {
            NodeKind::CreateFrameSet => "Create Frame Set",
            NodeKind::UnwrapFrameSet => "Unwrap Frame Set",
            NodeKind::InbetweenFrames => "Generate Inbetween Frames",
            NodeKind::FrameSetMerger => "Frame Set Merger",
            NodeKind::FrameSetSplitter => "Frame Set Splitter",
            NodeKind::SplitBeginning => "Frame Set Split Beginning",
            NodeKind::SplitEnd => "Frame Set Split End",
            NodeKind::Concatenate => "Frame Set Concatenate",
            NodeKind::Reverse => "Frame Set Reverse",
            NodeKind::Repeat => "Frame Set Repeat",
            NodeKind::Reindex => "Frame Set Reindex",
            NodeKind::Offset => "Frame Set Offset",
            NodeKind::FadeToBlack => "Fade To Black",
            NodeKind::FadeFromBlack => "Fade From Black",
            NodeKind::BlendedTransition => "Blended Transition",
            NodeKind::LinearCameraZoom => "Linear Camera Zoom",
            NodeKind::LinearCameraPan => "Linear Camera Pan",
            NodeKind::LinearCameraRoll => "Linear Camera Roll",
            NodeKind::SineCameraZoom => "Sine Camera Zoom",
            NodeKind::SineCameraPan => "Sine Camera Pan",
            NodeKind::SineCameraRoll => "Sine Camera Roll",
            NodeKind::CommonFrameDimensions => "Common Frame Dimensions",
            NodeKind::FrameSetDimensionsScaled => "Frame Set Frame Dimensions Scaled",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            NodeKind::CreateFrameSet | NodeKind::UnwrapFrameSet => "📽",
            NodeKind::InbetweenFrames => "🧱",
            NodeKind::FrameSetMerger => "🗍",
            NodeKind::FrameSetSplitter | NodeKind::SplitBeginning | NodeKind::SplitEnd => "✂",
            NodeKind::Concatenate => "🔗",
            NodeKind::Reverse => "⇄",
            NodeKind::Repeat => "🔁",
            NodeKind::Reindex | NodeKind::Offset => "🔢",
            NodeKind::FadeToBlack => "≻",
            NodeKind::FadeFromBlack => "≺",
            NodeKind::BlendedTransition => "⧓",
            NodeKind::LinearCameraZoom | NodeKind::SineCameraZoom => "🔭",
            NodeKind::LinearCameraPan | NodeKind::SineCameraPan => "👉",
            NodeKind::LinearCameraRoll | NodeKind::SineCameraRoll => "↻",
            NodeKind::CommonFrameDimensions | NodeKind::FrameSetDimensionsScaled => "⌗",
        }
    }

    pub fn category(self) -> NodeCategory {
        match self {
            NodeKind::InbetweenFrames => NodeCategory::Base,
            NodeKind::CreateFrameSet
            | NodeKind::UnwrapFrameSet
            | NodeKind::FrameSetMerger
            | NodeKind::FrameSetSplitter
            | NodeKind::SplitBeginning
            | NodeKind::SplitEnd
            | NodeKind::Concatenate
            | NodeKind::Reverse
            | NodeKind::Repeat
            | NodeKind::Reindex
            | NodeKind::Offset => NodeCategory::Batch,
            NodeKind::FadeToBlack | NodeKind::FadeFromBlack | NodeKind::BlendedTransition => {
                NodeCategory::Transitions
            }
            NodeKind::LinearCameraZoom
            | NodeKind::LinearCameraPan
            | NodeKind::LinearCameraRoll
            | NodeKind::SineCameraZoom
            | NodeKind::SineCameraPan
            | NodeKind::SineCameraRoll => NodeCategory::Camera,
            NodeKind::CommonFrameDimensions | NodeKind::FrameSetDimensionsScaled => {
                NodeCategory::Utils
            }
        }
    }

    /// Declared inputs, with defaults taken from `defaults` where relevant.
    pub fn inputs(self, defaults: &ProcessingDefaults) -> Vec<InputSpec> {
        let frames = || InputSpec::new("frames", ParamKind::FrameSet);
        let output_size = || {
            [
                InputSpec::new(
                    "output_width",
                    ParamKind::int_range(i64::from(defaults.output_width), Some(1), None),
                ),
                InputSpec::new(
                    "output_height",
                    ParamKind::int_range(i64::from(defaults.output_height), Some(1), None),
                ),
            ]
        };
        let direction = || {
            [
                InputSpec::new("direction_x", ParamKind::float(1.0)),
                InputSpec::new("direction_y", ParamKind::float(-1.0)),
            ]
        };
        let periodic = || {
            [
                InputSpec::new("period_seconds", ParamKind::seconds(1.0)),
                InputSpec::new("phase_seconds", ParamKind::float(0.0)),
            ]
        };
        let degrees = || InputSpec::new("degrees", ParamKind::float(45.0));
        let fade = || InputSpec::new("fade_seconds", ParamKind::seconds(1.0));

        match self {
            NodeKind::CreateFrameSet => vec![
                InputSpec::new("images", ParamKind::Images),
                InputSpec::new("first_frame_index", ParamKind::int(0)),
                InputSpec::new("step", ParamKind::int_range(1, Some(1), Some(256))),
                InputSpec::new(
                    "framerate_base",
                    ParamKind::int_range(i64::from(defaults.framerate_base), Some(1), None),
                ),
                InputSpec::new(
                    "framerate_divisor",
                    ParamKind::int_range(i64::from(defaults.framerate_divisor), Some(1), None),
                ),
            ],
            NodeKind::UnwrapFrameSet => vec![
                frames(),
                InputSpec::new("gap_mode", choice(&GAP_MODES)),
            ],
            NodeKind::InbetweenFrames => vec![
                frames(),
                InputSpec::new("fill_mode", choice(&FILL_MODES)),
            ],
            NodeKind::FrameSetMerger => vec![
                InputSpec::new("a", ParamKind::FrameSet),
                InputSpec::new("b", ParamKind::FrameSet),
                InputSpec::new("priority", choice(&PRIORITIES)),
            ],
            NodeKind::FrameSetSplitter => vec![
                frames(),
                InputSpec::new("overlap", ParamKind::int_range(0, Some(0), None)),
            ],
            NodeKind::SplitBeginning | NodeKind::SplitEnd => vec![
                frames(),
                InputSpec::new("count", ParamKind::int_range(1, Some(0), None)),
            ],
            NodeKind::Concatenate => vec![
                InputSpec::new("first", ParamKind::FrameSet),
                InputSpec::new("second", ParamKind::FrameSet),
            ],
            NodeKind::Reverse => vec![frames()],
            NodeKind::Repeat => vec![
                frames(),
                InputSpec::new("times", ParamKind::int_range(2, Some(1), None)),
            ],
            NodeKind::Reindex => vec![
                frames(),
                InputSpec::new("first_frame_index", ParamKind::int(0)),
                InputSpec::new("step", ParamKind::int_range(1, Some(1), Some(256))),
            ],
            NodeKind::Offset => vec![frames(), InputSpec::new("offset", ParamKind::int(0))],
            NodeKind::FadeToBlack | NodeKind::FadeFromBlack => vec![frames(), fade()],
            NodeKind::BlendedTransition => vec![
                InputSpec::new("frames_first", ParamKind::FrameSet),
                InputSpec::new("frames_after", ParamKind::FrameSet),
                fade(),
            ],
            NodeKind::LinearCameraZoom => {
                let mut specs = vec![frames()];
                specs.extend(output_size());
                specs.push(InputSpec::new("direction", choice(&ZOOM_DIRECTIONS)));
                specs
            }
            NodeKind::LinearCameraPan => {
                let mut specs = vec![frames()];
                specs.extend(output_size());
                specs.extend(direction());
                specs.push(InputSpec::new("pan_mode", choice(&PAN_MODES)));
                specs
            }
            NodeKind::LinearCameraRoll => {
                let mut specs = vec![frames()];
                specs.extend(output_size());
                specs.push(degrees());
                specs
            }
            NodeKind::SineCameraZoom => {
                let mut specs = vec![frames()];
                specs.extend(output_size());
                specs.extend(periodic());
                specs
            }
            NodeKind::SineCameraPan => {
                let mut specs = vec![frames()];
                specs.extend(output_size());
                specs.extend(direction());
                specs.extend(periodic());
                specs.push(InputSpec::new("pan_mode", choice(&SINE_PAN_MODES)));
                specs
            }
            NodeKind::SineCameraRoll => {
                let mut specs = vec![frames()];
                specs.extend(output_size());
                specs.extend(periodic());
                specs.push(degrees());
                specs
            }
            NodeKind::CommonFrameDimensions => vec![
                InputSpec::new("size", number_choice(&dimensions::COMMON_SIZES)),
                InputSpec::new("aspect_ratio", aspect_choice()),
                InputSpec::new("orientation", choice(&ORIENTATIONS)),
                InputSpec::new("divisor", number_choice(&dimensions::COMMON_DIVISORS)),
                InputSpec::new("alignment", ParamKind::int_range(64, Some(1), Some(512))),
                InputSpec::new("alignment_type", choice(&ALIGNMENT_TYPES)),
            ],
            NodeKind::FrameSetDimensionsScaled => vec![
                frames(),
                InputSpec::new(
                    "factor",
                    ParamKind::Float {
                        default: 1.0,
                        min: Some(0.01),
                        step: None,
                    },
                ),
            ],
        }
    }

    pub fn outputs(self) -> Vec<OutputSpec> {
        let frames = || vec![OutputSpec::new("frames", ValueType::FrameSet)];
        match self {
            NodeKind::UnwrapFrameSet => vec![
                OutputSpec::new("images", ValueType::Images),
                OutputSpec::new("framerate_float", ValueType::Float),
                OutputSpec::new("framerate_rounded", ValueType::Int),
                OutputSpec::new("framerate_base", ValueType::Int),
                OutputSpec::new("framerate_divisor", ValueType::Int),
                OutputSpec::new("first_index", ValueType::Int),
                OutputSpec::new("indexed_length", ValueType::Int),
                OutputSpec::new("frame_count", ValueType::Int),
            ],
            NodeKind::FrameSetSplitter => vec![
                OutputSpec::new("first_half", ValueType::FrameSet),
                OutputSpec::new("second_half", ValueType::FrameSet),
            ],
            NodeKind::SplitBeginning => vec![
                OutputSpec::new("beginning", ValueType::FrameSet),
                OutputSpec::new("remainder", ValueType::FrameSet),
            ],
            NodeKind::SplitEnd => vec![
                OutputSpec::new("remainder", ValueType::FrameSet),
                OutputSpec::new("end", ValueType::FrameSet),
            ],
            NodeKind::CommonFrameDimensions => vec![
                OutputSpec::new("width", ValueType::Int),
                OutputSpec::new("height", ValueType::Int),
                OutputSpec::new("final_width", ValueType::Int),
                OutputSpec::new("final_height", ValueType::Int),
            ],
            NodeKind::FrameSetDimensionsScaled => vec![
                OutputSpec::new("width", ValueType::Int),
                OutputSpec::new("height", ValueType::Int),
            ],
            _ => frames(),
        }
    }

    /// Run the node. `inputs` must already carry defaults for scalars.
    pub fn execute(
        self,
        inputs: &NodeInputs,
        processor: BatchProcessor,
    ) -> VbatchResult<NodeOutputs> {
        let out = NodeOutputs::new();
        let outputs = match self {
            NodeKind::CreateFrameSet => {
                let frames = wrapping::images_to_frameset(
                    inputs.images("images")?.clone(),
                    inputs.int("first_frame_index")?,
                    inputs.int("step")?,
                    inputs.u32_at_least("framerate_base", 1)?,
                    inputs.u32_at_least("framerate_divisor", 1)?,
                )?;
                out.with("frames", frames)
            }
            NodeKind::UnwrapFrameSet => {
                let gap_mode = pick(inputs, "gap_mode", &GAP_MODES)?;
                let u = wrapping::unwrap_frameset(inputs.frames("frames")?, gap_mode)?;
                out.with("images", vbatch_frame_model::ImageBatch::new(u.images)?)
                    .with("framerate_float", u.framerate)
                    .with("framerate_rounded", u.framerate_rounded)
                    .with("framerate_base", i64::from(u.framerate_base))
                    .with("framerate_divisor", i64::from(u.framerate_divisor))
                    .with("first_index", u.first_index)
                    .with("indexed_length", u.indexed_length)
                    .with("frame_count", u.frame_count as i64)
            }
            NodeKind::InbetweenFrames => {
                let mode = pick(inputs, "fill_mode", &FILL_MODES)?;
                out.with(
                    "frames",
                    inputs.frames("frames")?.generate_inbetween(mode)?,
                )
            }
            NodeKind::FrameSetMerger => {
                let priority = pick(inputs, "priority", &PRIORITIES)?;
                out.with(
                    "frames",
                    cut_and_join::merge_frames(inputs.frames("a")?, inputs.frames("b")?, priority)?,
                )
            }
            NodeKind::FrameSetSplitter => {
                let (first, second) =
                    cut_and_join::split(inputs.frames("frames")?, inputs.count("overlap")?)?;
                out.with("first_half", first).with("second_half", second)
            }
            NodeKind::SplitBeginning => {
                let (beginning, remainder) =
                    cut_and_join::split_beginning(inputs.frames("frames")?, inputs.count("count")?);
                out.with("beginning", beginning)
                    .with("remainder", remainder)
            }
            NodeKind::SplitEnd => {
                let (remainder, end) =
                    cut_and_join::split_end(inputs.frames("frames")?, inputs.count("count")?);
                out.with("remainder", remainder).with("end", end)
            }
            NodeKind::Concatenate => out.with(
                "frames",
                cut_and_join::concat(inputs.frames("first")?, inputs.frames("second")?)?,
            ),
            NodeKind::Reverse => out.with("frames", cut_and_join::reverse(inputs.frames("frames")?)),
            NodeKind::Repeat => out.with(
                "frames",
                cut_and_join::repeat(inputs.frames("frames")?, inputs.count("times")?)?,
            ),
            NodeKind::Reindex => out.with(
                "frames",
                cut_and_join::reindex(
                    inputs.frames("frames")?,
                    inputs.int("first_frame_index")?,
                    inputs.int("step")?,
                )?,
            ),
            NodeKind::Offset => out.with(
                "frames",
                cut_and_join::offset(inputs.frames("frames")?, inputs.int("offset")?),
            ),
            NodeKind::FadeToBlack => out.with(
                "frames",
                transitions::fade_to_black(
                    inputs.frames("frames")?,
                    inputs.float("fade_seconds")?,
                    processor,
                )?,
            ),
            NodeKind::FadeFromBlack => out.with(
                "frames",
                transitions::fade_from_black(
                    inputs.frames("frames")?,
                    inputs.float("fade_seconds")?,
                    processor,
                )?,
            ),
            NodeKind::BlendedTransition => out.with(
                "frames",
                transitions::blended_transition(
                    inputs.frames("frames_first")?,
                    inputs.frames("frames_after")?,
                    inputs.float("fade_seconds")?,
                )?,
            ),
            NodeKind::LinearCameraZoom
            | NodeKind::LinearCameraPan
            | NodeKind::LinearCameraRoll
            | NodeKind::SineCameraZoom
            | NodeKind::SineCameraPan
            | NodeKind::SineCameraRoll => out.with("frames", self.camera(inputs, processor)?),
            NodeKind::CommonFrameDimensions => {
                let dims = dimensions::common_frame_dimensions(
                    parse_number(inputs, "size")?,
                    dimensions::parse_aspect(inputs.text("aspect_ratio")?)?,
                    pick(inputs, "orientation", &ORIENTATIONS)?,
                    parse_number(inputs, "divisor")?,
                    inputs.int("alignment")?,
                    pick(inputs, "alignment_type", &ALIGNMENT_TYPES)?,
                )?;
                out.with("width", dims.width)
                    .with("height", dims.height)
                    .with("final_width", dims.final_width)
                    .with("final_height", dims.final_height)
            }
            NodeKind::FrameSetDimensionsScaled => {
                let (width, height) = dimensions::scaled_dimensions(
                    inputs.frames("frames")?,
                    inputs.float("factor")?,
                )?;
                out.with("width", width).with("height", height)
            }
        };
        Ok(outputs)
    }

    fn camera(
        self,
        inputs: &NodeInputs,
        processor: BatchProcessor,
    ) -> VbatchResult<vbatch_frame_model::FrameSet> {
        let frames = inputs.frames("frames")?;
        let width = inputs.u32_at_least("output_width", 1)?;
        let height = inputs.u32_at_least("output_height", 1)?;
        let direction = || -> VbatchResult<Vector2d> {
            Ok(Vector2d::new(
                inputs.float("direction_x")?,
                inputs.float("direction_y")?,
            ))
        };

        let motion = match self {
            NodeKind::LinearCameraZoom => BatchCameraMotion::zoom(
                frames,
                width,
                height,
                pick(inputs, "direction", &ZOOM_DIRECTIONS)?,
            )?,
            NodeKind::LinearCameraPan => BatchCameraMotion::pan(
                frames,
                width,
                height,
                direction()?,
                pick(inputs, "pan_mode", &PAN_MODES)?,
            )?,
            NodeKind::LinearCameraRoll => {
                BatchCameraMotion::roll(frames, width, height, inputs.float("degrees")?)?
            }
            NodeKind::SineCameraZoom => BatchCameraMotion::zoom_sine(
                frames,
                width,
                height,
                inputs.float("period_seconds")?,
                inputs.float("phase_seconds")?,
            )?,
            NodeKind::SineCameraPan => BatchCameraMotion::pan_sine(
                frames,
                width,
                height,
                direction()?,
                inputs.float("period_seconds")?,
                inputs.float("phase_seconds")?,
                pick(inputs, "pan_mode", &SINE_PAN_MODES)?,
            )?,
            NodeKind::SineCameraRoll => BatchCameraMotion::roll_sine(
                frames,
                width,
                height,
                inputs.float("degrees")?,
                inputs.float("period_seconds")?,
                inputs.float("phase_seconds")?,
            )?,
            other => {
                return Err(VbatchError::processing(format!(
                    "{} is not a camera node",
                    other.base_name()
                )))
            }
        };
        motion.with_processor(processor).execute()
    }
}

fn choice<T>(options: &[(&str, T)]) -> ParamKind {
    ParamKind::Choice {
        options: options.iter().map(|(name, _)| name.to_string()).collect(),
    }
}

fn number_choice(values: &[u32]) -> ParamKind {
    ParamKind::Choice {
        options: values.iter().map(u32::to_string).collect(),
    }
}

fn aspect_choice() -> ParamKind {
    ParamKind::Choice {
        options: dimensions::COMMON_ASPECTS
            .iter()
            .map(|(w, h)| format!("{w}:{h}"))
            .collect(),
    }
}

fn pick<T: Copy>(inputs: &NodeInputs, name: &str, options: &[(&str, T)]) -> VbatchResult<T> {
    let text = inputs.text(name)?;
    options
        .iter()
        .find(|(option, _)| option.eq_ignore_ascii_case(text))
        .map(|(_, value)| *value)
        .ok_or_else(|| {
            let allowed: Vec<&str> = options.iter().map(|(option, _)| *option).collect();
            VbatchError::invalid_parameter(
                name,
                format!("'{text}' is not one of {}", allowed.join(", ")),
            )
        })
}

fn parse_number(inputs: &NodeInputs, name: &str) -> VbatchResult<u32> {
    let text = inputs.text(name)?;
    text.trim()
        .parse()
        .map_err(|_| VbatchError::invalid_parameter(name, format!("'{text}' is not a number")))
}
