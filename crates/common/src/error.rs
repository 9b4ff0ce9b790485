//! Error types shared across VBatch crates.

use std::path::PathBuf;

/// Top-level error type for VBatch operations.
#[derive(Debug, thiserror::Error)]
pub enum VbatchError {
    /// A frame set or image batch could not be built from the given parts.
    #[error("Construction error: {message}")]
    Construction { message: String },

    /// Two inputs cannot be combined (framerate, dimensions, gaps, lengths).
    #[error("Incompatible inputs for {operation}: {message}")]
    Incompatible { operation: String, message: String },

    #[error("Processing error: {message}")]
    Processing { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Unknown node: {name}")]
    UnknownNode { name: String },

    #[error("Invalid parameter '{name}': {message}")]
    InvalidParameter { name: String, message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using VbatchError.
pub type VbatchResult<T> = Result<T, VbatchError>;

impl VbatchError {
    pub fn construction(msg: impl Into<String>) -> Self {
        Self::Construction {
            message: msg.into(),
        }
    }

    pub fn incompatible(operation: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Incompatible {
            operation: operation.into(),
            message: msg.into(),
        }
    }

    pub fn processing(msg: impl Into<String>) -> Self {
        Self::Processing {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn unknown_node(name: impl Into<String>) -> Self {
        Self::UnknownNode { name: name.into() }
    }

    pub fn invalid_parameter(name: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            message: msg.into(),
        }
    }
}
