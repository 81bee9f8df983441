//! Error types for policy-types crate.

use thiserror::Error;

/// Errors raised while building or validating core policy types.
#[derive(Debug, Error)]
pub enum TypesError {
    /// An observation token outside the closed vocabulary.
    #[error("unknown observation name: {0}")]
    UnknownObservation(String),

    /// Per-joint array length does not match the joint count.
    #[error("{field} has {actual} entries, expected {expected}")]
    LengthMismatch {
        /// Name of the offending field.
        field: &'static str,
        /// Joint count.
        expected: usize,
        /// Length found.
        actual: usize,
    },

    /// Joint names must be unique.
    #[error("duplicate joint name: {0}")]
    DuplicateJoint(String),

    /// Invalid configuration value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration (de)serialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl TypesError {
    /// Creates an unknown observation error.
    #[must_use]
    pub fn unknown_observation(token: impl Into<String>) -> Self {
        Self::UnknownObservation(token.into())
    }

    /// Creates a length mismatch error.
    #[must_use]
    pub const fn length_mismatch(field: &'static str, expected: usize, actual: usize) -> Self {
        Self::LengthMismatch {
            field,
            expected,
            actual,
        }
    }

    /// Creates an invalid config error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig(reason.into())
    }
}

impl From<serde_json::Error> for TypesError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Errors reported by an inference runtime.
///
/// The runtime is a black box; these only describe how a call failed.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The runtime rejected or failed the call.
    #[error("inference failed: {0}")]
    Run(String),

    /// A required input tensor was not supplied.
    #[error("missing input tensor: {0}")]
    MissingInput(String),

    /// An input tensor had the wrong shape.
    #[error("input {name} expects {expected} values, got {actual}")]
    InputShape {
        /// Input name.
        name: String,
        /// Expected element count.
        expected: usize,
        /// Element count supplied.
        actual: usize,
    },
}

impl SessionError {
    /// Creates a run error.
    #[must_use]
    pub fn run(reason: impl Into<String>) -> Self {
        Self::Run(reason.into())
    }
}

/// Result type for policy-types operations.
pub type Result<T> = std::result::Result<T, TypesError>;
