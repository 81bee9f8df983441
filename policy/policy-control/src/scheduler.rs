//! Policy invocation with a single in-flight slot.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use policy_types::{InferenceSession, TIME_STEP_INPUT, Tensor, TensorMap};
use tracing::{debug, info, warn};

use crate::error::{ControlError, Result};

/// Single-slot guard marking an outstanding policy call.
///
/// A request that finds the slot taken is dropped, not queued. The slot is
/// released when the [`InFlightTicket`] is dropped, on every exit path.
///
/// # Example
///
/// ```
/// use policy_control::InFlightGuard;
///
/// let guard = InFlightGuard::new();
/// let ticket = guard.try_acquire();
/// assert!(ticket.is_some());
/// assert!(guard.try_acquire().is_none());
/// drop(ticket);
/// assert!(!guard.is_in_flight());
/// ```
#[derive(Debug, Clone, Default)]
pub struct InFlightGuard {
    in_flight: Arc<AtomicBool>,
}

impl InFlightGuard {
    /// An idle guard.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the slot, or returns `None` if a call is already outstanding.
    #[must_use]
    pub fn try_acquire(&self) -> Option<InFlightTicket> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightTicket {
                in_flight: Arc::clone(&self.in_flight),
            })
    }

    /// Returns `true` while a ticket is alive.
    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }
}

/// Proof of holding the in-flight slot.
#[derive(Debug)]
#[must_use = "the slot is released as soon as the ticket is dropped"]
pub struct InFlightTicket {
    in_flight: Arc<AtomicBool>,
}

impl Drop for InFlightTicket {
    fn drop(&mut self) {
        self.in_flight.store(false, Ordering::Release);
    }
}

/// Runs the primary policy network.
///
/// The input is `[1, obs_len + feature_dim]`: the observation followed by the
/// delayed depth feature. A `[1, 1]` zero `time_step` is added when the
/// network declares one. The action output must hold one value per joint.
pub struct InferenceScheduler {
    session: Box<dyn InferenceSession>,
    input_name: String,
    output_name: String,
    wants_time_step: bool,
    guard: InFlightGuard,
    joint_count: usize,
    feature_dim: usize,
}

impl std::fmt::Debug for InferenceScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceScheduler")
            .field("input_name", &self.input_name)
            .field("output_name", &self.output_name)
            .field("wants_time_step", &self.wants_time_step)
            .field("guard", &self.guard)
            .field("joint_count", &self.joint_count)
            .field("feature_dim", &self.feature_dim)
            .finish_non_exhaustive()
    }
}

impl InferenceScheduler {
    /// Wraps a policy session.
    ///
    /// # Errors
    ///
    /// [`ControlError::NoPolicyInput`] / [`ControlError::NoActionOutput`]
    /// when the session declares no input or no output.
    pub fn new(
        session: Box<dyn InferenceSession>,
        obs_len: usize,
        joint_count: usize,
        feature_dim: usize,
    ) -> Result<Self> {
        let input_name = session
            .primary_input()
            .ok_or(ControlError::NoPolicyInput)?
            .to_string();
        let output_name = session
            .action_output()
            .ok_or(ControlError::NoActionOutput)?
            .to_string();
        let wants_time_step = session.wants_time_step();

        info!(
            inputs = ?session.input_names(),
            outputs = ?session.output_names(),
            input = %input_name,
            output = %output_name,
            "policy session ready"
        );

        let expected = obs_len + feature_dim;
        let declared = session
            .input_dims(&input_name)
            .and_then(|dims| dims.last().copied());
        if let Some(Some(declared)) = declared {
            if declared != expected {
                warn!(
                    input = %input_name,
                    declared,
                    expected,
                    "policy input width differs from observation layout"
                );
            }
        }

        Ok(Self {
            session,
            input_name,
            output_name,
            wants_time_step,
            guard: InFlightGuard::new(),
            joint_count,
            feature_dim,
        })
    }

    /// The in-flight guard.
    #[must_use]
    pub const fn guard(&self) -> &InFlightGuard {
        &self.guard
    }

    /// Name of the fed input.
    #[must_use]
    pub fn input_name(&self) -> &str {
        &self.input_name
    }

    /// Name of the action output.
    #[must_use]
    pub fn output_name(&self) -> &str {
        &self.output_name
    }

    /// Total input width for an observation of `obs_len`.
    #[must_use]
    pub const fn input_width(&self, obs_len: usize) -> usize {
        obs_len + self.feature_dim
    }

    /// Builds the feeds for one call.
    ///
    /// `feature` is truncated or zero-padded to the configured width.
    #[must_use]
    pub fn feeds(&self, observation: &[f32], feature: &[f32]) -> TensorMap {
        let mut input = Vec::with_capacity(self.input_width(observation.len()));
        input.extend_from_slice(observation);
        input.extend(
            feature
                .iter()
                .copied()
                .chain(std::iter::repeat(0.0))
                .take(self.feature_dim),
        );

        let mut feeds = TensorMap::new();
        feeds.insert(self.input_name.clone(), Tensor::row(input));
        if self.wants_time_step {
            feeds.insert(TIME_STEP_INPUT.to_string(), Tensor::row(vec![0.0]));
        }
        feeds
    }

    /// Runs the policy and returns the raw action.
    ///
    /// # Errors
    ///
    /// - [`ControlError::Session`] when the network fails
    /// - [`ControlError::MissingAction`] when the action output is absent
    /// - [`ControlError::ActionLength`] when the action is not one value per joint
    pub fn infer(&mut self, observation: &[f32], feature: &[f32]) -> Result<Vec<f32>> {
        let feeds = self.feeds(observation, feature);
        let mut outputs = self.session.run(feeds)?;
        let action = outputs
            .remove(&self.output_name)
            .ok_or_else(|| ControlError::MissingAction(self.output_name.clone()))?
            .into_data();
        if action.len() != self.joint_count {
            return Err(ControlError::action_length(self.joint_count, action.len()));
        }
        debug!(joints = action.len(), "policy action decoded");
        Ok(action)
    }
}
