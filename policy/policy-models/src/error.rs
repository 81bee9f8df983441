//! Error types for policy-models crate.

use thiserror::Error;

/// Errors that can occur in policy-models operations.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Failed to load checkpoint.
    #[error("failed to load checkpoint from {path}: {reason}")]
    LoadCheckpoint {
        /// Path to the checkpoint file.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// Failed to save checkpoint.
    #[error("failed to save checkpoint to {path}: {reason}")]
    SaveCheckpoint {
        /// Path to the checkpoint file.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// Checkpoint file not found.
    #[error("checkpoint not found: {0}")]
    CheckpointNotFound(String),

    /// Unsupported checkpoint format.
    #[error("unsupported checkpoint format: {0}")]
    UnsupportedFormat(String),

    /// Invalid network configuration.
    #[error("invalid model configuration: {0}")]
    InvalidConfig(String),

    /// Input tensor shape does not fit the network.
    #[error("shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch {
        /// Expected shape.
        expected: String,
        /// Actual shape.
        actual: String,
    },

    /// Tensor data could not be read back.
    #[error("tensor data error: {0}")]
    TensorData(String),
}

impl ModelError {
    /// Creates a load checkpoint error.
    #[must_use]
    pub fn load_checkpoint(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::LoadCheckpoint {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Creates a save checkpoint error.
    #[must_use]
    pub fn save_checkpoint(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SaveCheckpoint {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid config error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig(reason.into())
    }

    /// Creates a shape mismatch error from two dimension lists.
    #[must_use]
    pub fn shape_mismatch(expected: &[Option<usize>], actual: &[usize]) -> Self {
        let expected: Vec<String> = expected
            .iter()
            .map(|d| d.map_or_else(|| "?".to_string(), |d| d.to_string()))
            .collect();
        Self::ShapeMismatch {
            expected: format!("[{}]", expected.join(", ")),
            actual: format!("{actual:?}"),
        }
    }
}

/// Result type for policy-models operations.
pub type Result<T> = std::result::Result<T, ModelError>;
