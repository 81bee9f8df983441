//! Error types for policy-depth crate.

use policy_types::SessionError;
use thiserror::Error;

/// Errors from the depth path.
///
/// None of these stop the control loop: the extractor logs them and enqueues
/// a "no feature" marker instead.
#[derive(Debug, Error)]
pub enum DepthError {
    /// No frame has been supplied yet.
    #[error("no depth frame available")]
    NoFrame,

    /// The frame buffer does not match its declared size.
    #[error("depth buffer has {actual} samples, expected {expected}")]
    BufferSize {
        /// `width * height`.
        expected: usize,
        /// Samples present.
        actual: usize,
    },

    /// The clip range is not finite and increasing.
    #[error("depth clip range [{min}, {max}] is invalid")]
    InvalidClip {
        /// Near limit.
        min: f32,
        /// Far limit.
        max: f32,
    },

    /// Cropping left nothing to resize.
    #[error("crop leaves an empty {width}x{height} image")]
    EmptyCrop {
        /// Width after cropping.
        width: usize,
        /// Height after cropping.
        height: usize,
    },

    /// No perception network is loaded.
    #[error("depth backbone not loaded")]
    BackboneUnavailable,

    /// The network declares no input.
    #[error("depth backbone declares no input")]
    NoInput,

    /// The perception network failed.
    #[error("depth backbone inference failed: {0}")]
    Backbone(#[from] SessionError),

    /// The network did not return the expected output.
    #[error("depth backbone output '{0}' missing")]
    MissingOutput(String),

    /// The feature has the wrong length.
    #[error("depth backbone output length {actual}, expected {expected}")]
    FeatureLength {
        /// Configured feature dimension.
        expected: usize,
        /// Length returned.
        actual: usize,
    },
}

/// Result type for policy-depth operations.
pub type Result<T> = std::result::Result<T, DepthError>;
