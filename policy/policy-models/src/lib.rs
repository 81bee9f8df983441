//! Burn reference networks for the policy control bridge.
//!
//! Exported policies are normally served by an external runtime. This crate
//! provides native networks with the same tensor contract so the bridge can
//! run, and be tested, without one:
//!
//! - [`ActorMlp`] - `[1, obs + 32]` to `[1, joints]`
//! - [`DepthBackbone`] - `[1, H, W]` depth image to a `[1, 32]` feature
//! - [`BurnSession`] - either network as a [`policy_types::InferenceSession`]
//! - [`policy_card`] - metadata entries the session exposes
//!
//! Weights persist through Burn's recorders ([`save_checkpoint`],
//! [`load_checkpoint`]).
//!
//! # Layer 0 Crate
//!
//! This is a Layer 0 crate with **zero Bevy dependencies**. Networks are
//! generic over Burn backends; tests use `burn-ndarray`.
//!
//! # Quality Standards
//!
//! - Zero clippy/doc warnings
//! - Zero `unwrap`/`expect` in library code

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod actor;
mod backbone;
mod card;
mod checkpoint;
mod error;
mod network;
mod session;

pub use actor::{ActorMlp, ActorMlpConfig};
pub use backbone::{DepthBackbone, DepthBackboneConfig};
pub use card::{policy_card, policy_card_bytes};
pub use checkpoint::{CheckpointFormat, load_checkpoint, save_checkpoint};
pub use error::{ModelError, Result};
pub use network::PolicyNetwork;
pub use session::BurnSession;

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{
        ActorMlp, ActorMlpConfig, BurnSession, CheckpointFormat, DepthBackbone,
        DepthBackboneConfig, ModelError, PolicyNetwork,
    };
}
