//! Core types for bridging a physics simulation to a neural locomotion policy.
//!
//! This crate is the common language of the `policy-*` crates:
//!
//! - [`PolicyMetadata`] - joint list, observation schema, per-joint gains
//! - [`ObservationTerm`] / [`ObservationLayout`] - closed observation vocabulary
//!   and the buffer offsets it implies
//! - [`CommandVector`] - one-hot locomotion command
//! - [`Tensor`] / [`InferenceSession`] - the seam to any neural runtime
//! - [`SimModel`] / [`SimData`] - the seam to any physics engine
//! - [`BridgeConfig`] - control rate, depth pipeline, and command settings
//!
//! # Layer 0 Crate
//!
//! This is a Layer 0 crate with **zero Bevy dependencies** and no runtime
//! assumptions. Neural runtimes and physics engines plug in through traits.
//!
//! # Example
//!
//! ```
//! use policy_types::{ObservationTerm, PolicyMetadata};
//!
//! let meta = PolicyMetadata::new(
//!     vec!["hip".into(), "knee".into()],
//!     vec![ObservationTerm::ProjectedGravity, ObservationTerm::JointPos],
//!     vec![0.25; 2],
//!     vec![0.0, -0.3],
//!     vec![60.0; 2],
//!     vec![2.0; 2],
//! )?;
//! assert_eq!(meta.layout().len(), 5);
//! # Ok::<(), policy_types::TypesError>(())
//! ```
//!
//! # Quality Standards
//!
//! - Zero clippy/doc warnings
//! - Zero `unwrap`/`expect` in library code

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod command;
mod config;
mod error;
mod metadata;
mod observation;
mod sim;
mod tensor;

pub use command::{BaseDirection, COMMAND_DIM, CommandVector, SpeedTier};
pub use config::{AutoForwardConfig, BridgeConfig, ClipRange, CropMargins, DepthConfig, Resolution};
pub use error::{Result, SessionError, TypesError};
pub use metadata::PolicyMetadata;
pub use observation::{COMMAND_PLACEHOLDER_DIM, ObservationLayout, ObservationTerm};
pub use sim::{ArrayData, ArrayModel, JointKind, SimData, SimModel, Transmission};
pub use tensor::{InferenceSession, MetadataMap, TIME_STEP_INPUT, Tensor, TensorMap};

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{
        BaseDirection, BridgeConfig, CommandVector, DepthConfig, InferenceSession,
        ObservationLayout, ObservationTerm, PolicyMetadata, SimData, SimModel, SpeedTier, Tensor,
        TensorMap,
    };
}
