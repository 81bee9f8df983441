//! Real-time control loop between a physics simulation and a locomotion policy.
//!
//! Each control tick reads simulation state, assembles the policy input,
//! runs the network, and turns the action into joint torques:
//!
//! ```text
//! SimData --> ObservationAssembler --+
//!                  ^                 +--> InferenceScheduler --> ControlTarget
//!             CommandInput           |                                 |
//! DepthFrame --> DepthFeatureExtractor (delayed)    ctrl <-- ControlLawApplier
//! ```
//!
//! - [`JointBinder`] - policy joint names to `qpos`/`qvel`/`ctrl` indices
//! - [`CommandInput`] - keys to the one-hot command
//! - [`ObservationAssembler`] - schema-ordered input buffer
//! - [`InferenceScheduler`] / [`InFlightGuard`] - one policy call at a time
//! - [`ControlLawApplier`] - position-hold PD, clamped to actuator limits
//! - [`PolicyController`] - the session tying these together
//! - [`ControlLoop`] - decimation driver
//!
//! # Layer 0 Crate
//!
//! No physics engine or neural runtime is linked. Both plug in through the
//! [`policy_types::SimModel`] / [`policy_types::SimData`] and
//! [`policy_types::InferenceSession`] traits.
//!
//! # Quality Standards
//!
//! - Zero clippy/doc warnings
//! - Zero `unwrap`/`expect` in library code

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod binder;
mod command;
mod control_law;
mod control_loop;
mod controller;
mod error;
mod observation;
mod scheduler;
mod target;

pub use binder::{BindingTable, JointBinder, JointBinding, RootBinding};
pub use command::{
    AutoForwardZones, CommandInput, DirectionKey, SPEED_TOGGLE_KEY, resolve_direction,
};
pub use control_law::{ControlLawApplier, clamp_to_range, pd_torque};
pub use control_loop::ControlLoop;
pub use controller::{PolicyController, RequestOutcome};
pub use error::{ControlError, Result};
pub use observation::{BaseState, ObservationAssembler};
pub use scheduler::{InFlightGuard, InFlightTicket, InferenceScheduler};
pub use target::ControlTarget;

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{
        CommandInput, ControlError, ControlLoop, JointBinder, ObservationAssembler,
        PolicyController, RequestOutcome,
    };
}
