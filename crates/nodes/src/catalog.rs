//! The node catalog a host registers.
//!
//! Names and categories are decorated from an injected [`UiConfig`]; the
//! processing crates below never see configuration.

use vbatch_common::{AppConfig, ProcessingDefaults, UiConfig, VbatchError, VbatchResult};
use vbatch_processing::BatchProcessor;

use crate::descriptor::NodeDescriptor;
use crate::kind::NodeKind;
use crate::value::{NodeInputs, NodeOutputs};

#[derive(Debug, Clone)]
pub struct NodeCatalog {
    kinds: Vec<NodeKind>,
    descriptors: Vec<NodeDescriptor>,
    processor: BatchProcessor,
    debug: bool,
}

impl NodeCatalog {
    /// Catalog decorated by `ui`, with built-in processing defaults.
    pub fn new(ui: &UiConfig) -> Self {
        Self::build(ui, &ProcessingDefaults::default())
    }

    /// Catalog decorated and defaulted from `config`. With `config.debug`
    /// set, every execution logs a summary of its outputs.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::build(&config.ui, &config.defaults).with_debug(config.debug)
    }

    fn build(ui: &UiConfig, defaults: &ProcessingDefaults) -> Self {
        let descriptors = NodeKind::ALL
            .iter()
            .map(|&kind| describe(kind, ui, defaults))
            .collect();
        Self {
            kinds: NodeKind::ALL.to_vec(),
            descriptors,
            processor: BatchProcessor::new(defaults.parallel),
            debug: false,
        }
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_processor(mut self, processor: BatchProcessor) -> Self {
        self.processor = processor;
        self
    }

    pub fn descriptors(&self) -> &[NodeDescriptor] {
        &self.descriptors
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Look a node up by registration key or undecorated name, ignoring case.
    pub fn find(&self, name: &str) -> Option<&NodeDescriptor> {
        self.position(name).map(|i| &self.descriptors[i])
    }

    fn position(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.kinds.iter().zip(&self.descriptors).position(|(kind, desc)| {
            desc.name.eq_ignore_ascii_case(name) || kind.base_name().eq_ignore_ascii_case(name)
        })
    }

    /// Run a node by name. Scalar inputs left out take their declared defaults.
    pub fn execute(&self, name: &str, mut inputs: NodeInputs) -> VbatchResult<NodeOutputs> {
        let i = self
            .position(name)
            .ok_or_else(|| VbatchError::unknown_node(name))?;
        let (kind, descriptor) = (self.kinds[i], &self.descriptors[i]);

        inputs.fill_defaults(&descriptor.inputs);
        tracing::info!(node = %descriptor.name, inputs = inputs.len(), "executing node");
        let outputs = kind.execute(&inputs, self.processor)?;
        tracing::debug!(node = %descriptor.name, outputs = outputs.len(), "node finished");
        if self.debug {
            for (name, value) in outputs.iter() {
                tracing::info!(node = %descriptor.name, output = name, "{}", value.summary());
            }
        }
        Ok(outputs)
    }

    /// All descriptors as pretty-printed JSON.
    pub fn to_json(&self) -> VbatchResult<String> {
        Ok(serde_json::to_string_pretty(&self.descriptors)?)
    }
}

fn describe(kind: NodeKind, ui: &UiConfig, defaults: &ProcessingDefaults) -> NodeDescriptor {
    NodeDescriptor {
        name: format!("{}{}", kind.base_name(), ui.node_name_suffix),
        display_name: decorate_name(ui, kind.base_name(), kind.icon()),
        icon: kind.icon().to_string(),
        category: decorate_category(ui, kind.category().key()),
        inputs: kind.inputs(defaults),
        outputs: kind.outputs(),
    }
}

/// Category path under the top category, with icons attached to every part
/// that has one.
fn decorate_category(ui: &UiConfig, key: &str) -> String {
    let top = ui.top_category.trim().trim_matches('/');
    let path = if top.is_empty() {
        key.to_string()
    } else {
        format!("{top}/{key}")
    };

    path
        .split('/')
        .map(|part| {
            let lookup = part.to_ascii_lowercase();
            let Some(icon) = ui.category_icon(&lookup).filter(|i| !i.trim().is_empty()) else {
                return part.to_string();
            };
            let mut label = part.to_string();
            if ui.prepend_icon_to_category {
                label = format!("{} {label}", icon.trim_start());
            }
            if ui.append_icon_to_category {
                label = format!("{label} {}", icon.trim_end());
            }
            label
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn decorate_name(ui: &UiConfig, name: &str, icon: &str) -> String {
    let mut label = name.to_string();
    if ui.prepend_icon_to_node {
        label = format!("{} {label}", icon.trim_start());
    }
    if ui.append_icon_to_node {
        label = format!("{label} {}", icon.trim_end());
    }
    label
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::ParamKind;
    use vbatch_frame_model::{Channels, FrameRate, FrameSet, Image, ImageBatch};

    fn plain_ui() -> UiConfig {
        UiConfig {
            top_category: String::new(),
            prepend_icon_to_category: false,
            append_icon_to_category: false,
            prepend_icon_to_node: false,
            append_icon_to_node: false,
            node_name_suffix: String::new(),
            category_icons: Default::default(),
        }
    }

    fn frames(count: usize) -> FrameSet {
        let batch = ImageBatch::new(vec![
            Image::solid(8, 8, Channels::Rgb, [0.5, 0.5, 0.5, 1.0]);
            count
        ])
        .unwrap();
        FrameSet::sequential(batch, FrameRate::from_fps(24))
    }

    #[test]
    fn test_default_decoration() {
        let catalog = NodeCatalog::new(&UiConfig::default());
        let zoom = catalog.find("Linear Camera Zoom").unwrap();
        assert_eq!(zoom.name, "Linear Camera Zoom [VB]");
        assert_eq!(zoom.display_name, "🔭 Linear Camera Zoom");
        assert_eq!(zoom.category, "🎭 VBatch/🎥 camera");
    }

    #[test]
    fn test_plain_decoration() {
        let catalog = NodeCatalog::new(&plain_ui());
        let fade = catalog.find("fade to black").unwrap();
        assert_eq!(fade.name, "Fade To Black");
        assert_eq!(fade.display_name, "Fade To Black");
        assert_eq!(fade.category, "transitions");
    }

    #[test]
    fn test_append_icons() {
        let mut ui = plain_ui();
        ui.top_category = "/Video/".to_string();
        ui.append_icon_to_category = true;
        ui.append_icon_to_node = true;
        ui.category_icons
            .insert("batch".to_string(), "🎞".to_string());
        let catalog = NodeCatalog::new(&ui);
        let merger = catalog.find("Frame Set Merger").unwrap();
        assert_eq!(merger.category, "Video/batch 🎞");
        assert_eq!(merger.display_name, "Frame Set Merger 🗍");
    }

    #[test]
    fn test_registration_keys_unique() {
        let catalog = NodeCatalog::new(&UiConfig::default());
        let mut names: Vec<_> = catalog.descriptors().iter().map(|d| d.name.clone()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), catalog.len());
    }

    #[test]
    fn test_unknown_node() {
        let catalog = NodeCatalog::new(&UiConfig::default());
        let err = catalog.execute("Teleport", NodeInputs::new()).unwrap_err();
        assert!(matches!(err, VbatchError::UnknownNode { .. }));
    }

    #[test]
    fn test_execute_fills_defaults() {
        let catalog =
            NodeCatalog::new(&UiConfig::default()).with_processor(BatchProcessor::sequential());
        let out = catalog
            .execute(
                "Linear Camera Roll [VB]",
                NodeInputs::new()
                    .with("frames", frames(3))
                    .with("output_width", 4i64)
                    .with("output_height", 4i64),
            )
            .unwrap();
        let rolled = out.frames("frames").unwrap();
        assert_eq!(rolled.len(), 3);
        assert_eq!(rolled.image_dimensions(), Some((4, 4)));
    }

    #[test]
    fn test_missing_frames_is_invalid_parameter() {
        let catalog = NodeCatalog::new(&UiConfig::default());
        let err = catalog
            .execute("Frame Set Reverse", NodeInputs::new())
            .unwrap_err();
        assert!(matches!(err, VbatchError::InvalidParameter { .. }));
    }

    #[test]
    fn test_config_defaults_reach_descriptors() {
        let mut config = AppConfig::default();
        config.defaults.framerate_base = 30;
        let catalog = NodeCatalog::from_config(&config);
        let create = catalog.find("Create Frame Set").unwrap();
        assert_eq!(
            create.input("framerate_base").unwrap().kind,
            ParamKind::int_range(30, Some(1), None)
        );
    }

    #[test]
    fn test_debug_catalog_executes() {
        let mut config = AppConfig::default();
        config.debug = true;
        let catalog = NodeCatalog::from_config(&config);
        assert!(catalog.debug);
        let out = catalog
            .execute(
                "Frame Set Offset",
                NodeInputs::new().with("frames", frames(2)).with("offset", 10i64),
            )
            .unwrap();
        assert_eq!(out.frames("frames").unwrap().indices(), &[10, 11]);
    }

    #[test]
    fn test_json_lists_every_node() {
        let catalog = NodeCatalog::new(&UiConfig::default());
        let json: serde_json::Value = serde_json::from_str(&catalog.to_json().unwrap()).unwrap();
        assert_eq!(json.as_array().unwrap().len(), NodeKind::ALL.len());
    }
}
