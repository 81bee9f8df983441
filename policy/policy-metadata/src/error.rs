//! Error types for policy-metadata crate.

use policy_types::TypesError;
use thiserror::Error;

/// Errors that abort metadata resolution.
///
/// All of these are fatal: a policy whose configuration cannot be read is
/// never started with guessed defaults.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// A required key is absent or empty.
    #[error("policy metadata missing {0}")]
    MissingKey(&'static str),

    /// The observation schema names a token outside the vocabulary.
    #[error("unknown observation name: {0}")]
    UnknownObservation(String),

    /// The serialized artifact could not be walked.
    #[error("malformed metadata encoding at byte {offset}: {reason}")]
    MalformedWire {
        /// Byte offset where decoding failed.
        offset: usize,
        /// What went wrong.
        reason: String,
    },

    /// The resolved values do not form valid metadata.
    #[error(transparent)]
    Invalid(TypesError),
}

impl MetadataError {
    /// Creates a malformed wire error.
    #[must_use]
    pub fn malformed(offset: usize, reason: impl Into<String>) -> Self {
        Self::MalformedWire {
            offset,
            reason: reason.into(),
        }
    }
}

impl From<TypesError> for MetadataError {
    fn from(err: TypesError) -> Self {
        match err {
            TypesError::UnknownObservation(token) => Self::UnknownObservation(token),
            other => Self::Invalid(other),
        }
    }
}

/// Result type for policy-metadata operations.
pub type Result<T> = std::result::Result<T, MetadataError>;
