//! Error types for the cardgrid layout engine.

use thiserror::Error;

/// Primary error type for layout reconstruction.
///
/// Geometric oddities (empty pages, ragged columns, ties on a threshold) are
/// never errors; they are resolved locally and reported as warnings on the
/// result. Only malformed input and bad configuration end up here.
#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("invalid detection at index {index}: {reason}")]
    InvalidInput { index: usize, reason: String },

    #[error("invalid image size {width}x{height}")]
    InvalidImageSize { width: f64, height: f64 },

    #[error("malformed detection list: {0}")]
    MalformedDetections(String),

    #[error("invalid correction rule '{tag}': {source}")]
    InvalidRule {
        tag: String,
        #[source]
        source: regex::Error,
    },

    #[error("correction rule '{tag}' can never reach a fixed point")]
    NonConvergentRule { tag: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl LayoutError {
    pub(crate) fn invalid_input(index: usize, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            index,
            reason: reason.into(),
        }
    }
}

/// Convenience Result type alias for LayoutError.
pub type Result<T> = std::result::Result<T, LayoutError>;
