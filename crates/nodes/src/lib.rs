//! VBatch Nodes
//!
//! The node surface a graph host registers:
//! - **Descriptors:** Name, icon, category, typed inputs and outputs per node
//! - **Catalog:** Display decoration from an injected [`UiConfig`]
//! - **Dispatch:** Named execution with typed input bags
//!
//! [`UiConfig`]: vbatch_common::UiConfig

pub mod catalog;
pub mod descriptor;
pub mod kind;
pub mod value;

pub use catalog::NodeCatalog;
pub use descriptor::{InputSpec, NodeCategory, NodeDescriptor, OutputSpec, ParamKind, ValueType};
pub use kind::NodeKind;
pub use value::{NodeInputs, NodeOutputs, NodeValue};
