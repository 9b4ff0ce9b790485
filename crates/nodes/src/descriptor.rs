//! Node descriptors: what a host needs to draw and wire a node.

use serde::{Deserialize, Serialize};

/// Category a node is filed under, below the configured top category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeCategory {
    Base,
    Batch,
    Camera,
    Transitions,
    Utils,
}

impl NodeCategory {
    /// Key used for category paths and icon lookup.
    pub fn key(self) -> &'static str {
        match self {
            NodeCategory::Base => "base",
            NodeCategory::Batch => "batch",
            NodeCategory::Camera => "camera",
            NodeCategory::Transitions => "transitions",
            NodeCategory::Utils => "utils",
        }
    }
}

/// Type of a value flowing between nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    FrameSet,
    Images,
    Int,
    Float,
    Text,
}

/// Declared type of a node input, with host-side defaults and limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParamKind {
    Int {
        default: i64,
        #[serde(skip_serializing_if = "Option::is_none")]
        min: Option<i64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        max: Option<i64>,
    },
    Float {
        default: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        step: Option<f64>,
    },
    /// One of a fixed list of strings; the first option is the default.
    Choice { options: Vec<String> },
    FrameSet,
    Images,
}

impl ParamKind {
    pub fn int(default: i64) -> Self {
        ParamKind::Int {
            default,
            min: None,
            max: None,
        }
    }

    pub fn int_range(default: i64, min: Option<i64>, max: Option<i64>) -> Self {
        ParamKind::Int { default, min, max }
    }

    pub fn float(default: f64) -> Self {
        ParamKind::Float {
            default,
            min: None,
            step: None,
        }
    }

    pub fn seconds(default: f64) -> Self {
        ParamKind::Float {
            default,
            min: Some(0.1),
            step: Some(0.1),
        }
    }

    pub fn choice(options: &[&str]) -> Self {
        ParamKind::Choice {
            options: options.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            ParamKind::Int { .. } => ValueType::Int,
            ParamKind::Float { .. } => ValueType::Float,
            ParamKind::Choice { .. } => ValueType::Text,
            ParamKind::FrameSet => ValueType::FrameSet,
            ParamKind::Images => ValueType::Images,
        }
    }

    /// True for inputs that carry frames rather than scalars.
    pub fn is_frames(&self) -> bool {
        matches!(self, ParamKind::FrameSet | ParamKind::Images)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputSpec {
    pub name: String,
    #[serde(flatten)]
    pub kind: ParamKind,
}

impl InputSpec {
    pub fn new(name: &str, kind: ParamKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub value_type: ValueType,
}

impl OutputSpec {
    pub fn new(name: &str, value_type: ValueType) -> Self {
        Self {
            name: name.to_string(),
            value_type,
        }
    }
}

/// A node as presented to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDescriptor {
    /// Registration key, unique across the catalog.
    pub name: String,
    /// Label shown on the node, possibly decorated with its icon.
    pub display_name: String,
    pub icon: String,
    /// Slash-separated category path, possibly decorated with icons.
    pub category: String,
    pub inputs: Vec<InputSpec>,
    pub outputs: Vec<OutputSpec>,
}

impl NodeDescriptor {
    pub fn input(&self, name: &str) -> Option<&InputSpec> {
        self.inputs.iter().find(|spec| spec.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_kind_json_shape() {
        let spec = InputSpec::new("degrees", ParamKind::float(45.0));
        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json["name"], "degrees");
        assert_eq!(json["type"], "float");
        assert_eq!(json["default"], 45.0);
        assert!(json.get("min").is_none());

        let back: InputSpec = serde_json::from_value(json).unwrap();
        assert_eq!(back, spec);
    }

    #[test]
    fn test_choice_value_type() {
        let kind = ParamKind::choice(&["in", "out"]);
        assert_eq!(kind.value_type(), ValueType::Text);
        assert!(!kind.is_frames());
        assert!(ParamKind::FrameSet.is_frames());
    }
}
