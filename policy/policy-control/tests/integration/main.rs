//! Integration tests for the policy control bridge.
//!
//! These tests drive a [`policy_control::PolicyController`] against an
//! array-backed simulation model:
//! - Metadata from artifact bytes -> observation layout
//! - Request scheduling, in-flight guard, per-call failures
//! - PD control written into actuator controls
//! - Depth feature delay through the full request path
//! - Burn reference networks as policy and depth backbone

pub mod common;
pub mod control_pipeline;
pub mod depth_pipeline;
pub mod observation_layout;
pub mod reference_networks;
pub mod scheduling;
