//! Values passed into and out of nodes.

use std::collections::BTreeMap;

use vbatch_common::{VbatchError, VbatchResult};
use vbatch_frame_model::{FrameSet, ImageBatch};

use crate::descriptor::{InputSpec, ParamKind, ValueType};

#[derive(Debug, Clone, PartialEq)]
pub enum NodeValue {
    Frames(FrameSet),
    Images(ImageBatch),
    Int(i64),
    Float(f64),
    Text(String),
}

impl NodeValue {
    pub fn value_type(&self) -> ValueType {
        match self {
            NodeValue::Frames(_) => ValueType::FrameSet,
            NodeValue::Images(_) => ValueType::Images,
            NodeValue::Int(_) => ValueType::Int,
            NodeValue::Float(_) => ValueType::Float,
            NodeValue::Text(_) => ValueType::Text,
        }
    }

    /// One-line description for diagnostics.
    pub fn summary(&self) -> String {
        match self {
            NodeValue::Frames(frames) => match frames.image_dimensions() {
                Some((w, h)) => format!(
                    "{} frames {w}x{h} [{}..={}] @ {}",
                    frames.len(),
                    frames.first_index(),
                    frames.last_index(),
                    frames.framerate()
                ),
                None => "empty frame set".to_string(),
            },
            NodeValue::Images(batch) => match batch.dimensions() {
                Some((w, h)) => format!("{} images {w}x{h}", batch.len()),
                None => "no images".to_string(),
            },
            NodeValue::Int(v) => v.to_string(),
            NodeValue::Float(v) => v.to_string(),
            NodeValue::Text(v) => format!("{v:?}"),
        }
    }
}

impl From<FrameSet> for NodeValue {
    fn from(value: FrameSet) -> Self {
        NodeValue::Frames(value)
    }
}

impl From<ImageBatch> for NodeValue {
    fn from(value: ImageBatch) -> Self {
        NodeValue::Images(value)
    }
}

impl From<i64> for NodeValue {
    fn from(value: i64) -> Self {
        NodeValue::Int(value)
    }
}

impl From<f64> for NodeValue {
    fn from(value: f64) -> Self {
        NodeValue::Float(value)
    }
}

impl From<&str> for NodeValue {
    fn from(value: &str) -> Self {
        NodeValue::Text(value.to_string())
    }
}

impl From<String> for NodeValue {
    fn from(value: String) -> Self {
        NodeValue::Text(value)
    }
}

/// Named inputs for one node execution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeInputs {
    values: BTreeMap<String, NodeValue>,
}

impl NodeInputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: impl Into<NodeValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: impl Into<NodeValue>) {
        self.values.insert(name.to_string(), value.into());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Fill every scalar input the caller left out with its declared default.
    pub fn fill_defaults(&mut self, specs: &[InputSpec]) {
        for spec in specs {
            if self.values.contains_key(&spec.name) {
                continue;
            }
            let default = match &spec.kind {
                ParamKind::Int { default, .. } => NodeValue::Int(*default),
                ParamKind::Float { default, .. } => NodeValue::Float(*default),
                ParamKind::Choice { options } => match options.first() {
                    Some(first) => NodeValue::Text(first.clone()),
                    None => continue,
                },
                ParamKind::FrameSet | ParamKind::Images => continue,
            };
            self.values.insert(spec.name.clone(), default);
        }
    }

    fn get(&self, name: &str) -> VbatchResult<&NodeValue> {
        self.values
            .get(name)
            .ok_or_else(|| VbatchError::invalid_parameter(name, "missing input"))
    }

    fn mistyped(name: &str, expected: ValueType, found: &NodeValue) -> VbatchError {
        VbatchError::invalid_parameter(
            name,
            format!("expected {expected:?}, got {:?}", found.value_type()),
        )
    }

    pub fn frames(&self, name: &str) -> VbatchResult<&FrameSet> {
        match self.get(name)? {
            NodeValue::Frames(frames) => Ok(frames),
            other => Err(Self::mistyped(name, ValueType::FrameSet, other)),
        }
    }

    pub fn images(&self, name: &str) -> VbatchResult<&ImageBatch> {
        match self.get(name)? {
            NodeValue::Images(images) => Ok(images),
            other => Err(Self::mistyped(name, ValueType::Images, other)),
        }
    }

    pub fn int(&self, name: &str) -> VbatchResult<i64> {
        match self.get(name)? {
            NodeValue::Int(v) => Ok(*v),
            other => Err(Self::mistyped(name, ValueType::Int, other)),
        }
    }

    /// A float input. Integers are accepted and widened.
    pub fn float(&self, name: &str) -> VbatchResult<f64> {
        match self.get(name)? {
            NodeValue::Float(v) => Ok(*v),
            NodeValue::Int(v) => Ok(*v as f64),
            other => Err(Self::mistyped(name, ValueType::Float, other)),
        }
    }

    pub fn text(&self, name: &str) -> VbatchResult<&str> {
        match self.get(name)? {
            NodeValue::Text(v) => Ok(v),
            other => Err(Self::mistyped(name, ValueType::Text, other)),
        }
    }

    /// An integer input that must fit `u32` and be at least `min`.
    pub fn u32_at_least(&self, name: &str, min: u32) -> VbatchResult<u32> {
        let v = self.int(name)?;
        u32::try_from(v)
            .ok()
            .filter(|v| *v >= min)
            .ok_or_else(|| {
                VbatchError::invalid_parameter(name, format!("must be at least {min}, got {v}"))
            })
    }

    /// A non-negative integer input.
    pub fn count(&self, name: &str) -> VbatchResult<usize> {
        let v = self.int(name)?;
        usize::try_from(v)
            .map_err(|_| VbatchError::invalid_parameter(name, format!("must be >= 0, got {v}")))
    }
}

/// Named outputs of one node execution, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeOutputs {
    values: Vec<(String, NodeValue)>,
}

impl NodeOutputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: impl Into<NodeValue>) -> Self {
        self.values.push((name.to_string(), value.into()));
        self
    }

    pub fn get(&self, name: &str) -> Option<&NodeValue> {
        self.values
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn frames(&self, name: &str) -> Option<&FrameSet> {
        match self.get(name) {
            Some(NodeValue::Frames(frames)) => Some(frames),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &NodeValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_values(self) -> Vec<(String, NodeValue)> {
        self.values
    }
}
