//! Error type shared by the array, calendar and grouping layers.

use thiserror::Error;

/// Failures raised synchronously at the point of misuse.
#[derive(Debug, Error)]
pub enum GroupError {
    /// Invalid grouper configuration (unknown period, bad window, bad dims).
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// Inputs that cannot be grouped or combined together.
    #[error("incompatible inputs: {0}")]
    IncompatibleInputs(String),

    #[error("dimension '{dim}' not found")]
    DimensionNotFound { dim: String },

    /// Unknown aggregation name or an argument it cannot accept.
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),
}

impl GroupError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub(crate) fn incompatible(msg: impl Into<String>) -> Self {
        Self::IncompatibleInputs(msg.into())
    }

    pub(crate) fn missing_dim(dim: impl Into<String>) -> Self {
        Self::DimensionNotFound { dim: dim.into() }
    }
}

pub type Result<T> = std::result::Result<T, GroupError>;
