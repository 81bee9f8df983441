//! Error types for policy-control crate.

use policy_metadata::MetadataError;
use policy_types::{SessionError, TypesError};
use thiserror::Error;

/// Errors from the control bridge.
///
/// Initialization errors ([`Metadata`](Self::Metadata),
/// [`Config`](Self::Config), [`NoPolicyInput`](Self::NoPolicyInput),
/// [`NoActionOutput`](Self::NoActionOutput)) abort setup. The remaining
/// variants abort a single inference call and leave the control target as it
/// was.
#[derive(Debug, Error)]
pub enum ControlError {
    /// Policy metadata could not be resolved.
    #[error(transparent)]
    Metadata(#[from] MetadataError),

    /// Configuration is invalid.
    #[error(transparent)]
    Config(#[from] TypesError),

    /// The policy declares no input.
    #[error("policy declares no input")]
    NoPolicyInput,

    /// The policy declares no output.
    #[error("policy declares no output")]
    NoActionOutput,

    /// The policy call failed.
    #[error("policy inference failed: {0}")]
    Session(#[from] SessionError),

    /// The action output was absent from the result.
    #[error("policy output missing action tensor {0}")]
    MissingAction(String),

    /// The action does not have one entry per joint.
    #[error("action length {actual} does not match joint count {expected}")]
    ActionLength {
        /// Joint count.
        expected: usize,
        /// Length returned.
        actual: usize,
    },
}

impl ControlError {
    /// Creates an action length error.
    #[must_use]
    pub const fn action_length(expected: usize, actual: usize) -> Self {
        Self::ActionLength { expected, actual }
    }

    /// Returns `true` for errors that only affect one inference call.
    #[must_use]
    pub const fn is_per_call(&self) -> bool {
        matches!(
            self,
            Self::Session(_) | Self::MissingAction(_) | Self::ActionLength { .. }
        )
    }
}

/// Result type for policy-control operations.
pub type Result<T> = std::result::Result<T, ControlError>;
