//! Decimated stepping driver.

use policy_types::{BridgeConfig, SimData, SimModel};
use tracing::warn;

use crate::controller::{PolicyController, RequestOutcome};

/// Counts substeps and requests a policy action every `decimation` of them.
///
/// The host calls [`substep`](Self::substep) before each physics step. Most
/// substeps only re-apply the last target.
///
/// # Example
///
/// ```
/// use policy_control::ControlLoop;
/// use policy_types::BridgeConfig;
///
/// let control = ControlLoop::from_config(&BridgeConfig::default(), 0.005);
/// assert_eq!(control.decimation(), 4);
/// assert!(control.is_policy_tick());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlLoop {
    decimation: usize,
    counter: usize,
}

impl ControlLoop {
    /// Loop with an explicit decimation (at least 1).
    #[must_use]
    pub fn new(decimation: usize) -> Self {
        Self {
            decimation: decimation.max(1),
            counter: 0,
        }
    }

    /// Loop for `config.control_dt` over a simulation `timestep`.
    #[must_use]
    pub fn from_config(config: &BridgeConfig, timestep: f64) -> Self {
        Self::new(config.decimation(timestep))
    }

    /// Substeps per policy call.
    #[must_use]
    pub const fn decimation(&self) -> usize {
        self.decimation
    }

    /// Substeps taken since the last reset.
    #[must_use]
    pub const fn counter(&self) -> usize {
        self.counter
    }

    /// Returns `true` if the next substep requests an action.
    #[must_use]
    pub const fn is_policy_tick(&self) -> bool {
        self.counter % self.decimation == 0
    }

    /// Restarts counting; the next substep requests an action.
    pub fn reset(&mut self) {
        self.counter = 0;
    }

    /// Runs one substep: request on decimation boundaries, then apply control.
    ///
    /// Request errors are logged and the previous target stays in effect.
    /// Returns the request outcome on boundaries where the call succeeded.
    pub fn substep<M, D>(
        &mut self,
        controller: &mut PolicyController,
        model: &M,
        data: &mut D,
    ) -> Option<RequestOutcome>
    where
        M: SimModel + ?Sized,
        D: SimData + ?Sized,
    {
        let outcome = if self.is_policy_tick() {
            match controller.request_action(data) {
                Ok(outcome) => Some(outcome),
                Err(err) => {
                    warn!(error = %err, substep = self.counter, "policy inference error");
                    None
                }
            }
        } else {
            None
        };
        controller.apply_control(model, data);
        self.counter += 1;
        outcome
    }
}
