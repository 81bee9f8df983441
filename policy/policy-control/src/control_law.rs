//! Position-hold PD law.

use policy_types::{PolicyMetadata, SimData, SimModel};

use crate::binder::BindingTable;

/// PD torque toward `target` with zero desired velocity.
#[must_use]
pub fn pd_torque(kp: f64, kd: f64, target: f64, position: f64, velocity: f64) -> f64 {
    kp * (target - position) + kd * (0.0 - velocity)
}

/// Clamps to a control range that is finite and ordered; otherwise passes through.
#[must_use]
pub fn clamp_to_range(value: f64, range: Option<(f64, f64)>) -> f64 {
    match range {
        Some((min, max)) if min.is_finite() && max.is_finite() && min < max => {
            value.clamp(min, max)
        }
        _ => value,
    }
}

/// Writes actuator controls from joint targets.
///
/// Joints without an actuator are skipped. An unbound position or velocity
/// reads as zero.
///
/// # Example
///
/// ```
/// use policy_control::{ControlLawApplier, JointBinder};
/// use policy_types::{ArrayModel, JointKind};
///
/// let mut model = ArrayModel::new(0.002);
/// let body = model.add_body("thigh");
/// let knee = model.add_joint("knee", JointKind::Hinge, body);
/// model.add_joint_actuator(knee, Some((-5.0, 5.0)));
/// let mut data = model.make_data();
///
/// let binder = JointBinder::new(&model, vec!["knee".into()], "torso_link");
/// let law = ControlLawApplier::from_gains(vec![100.0], vec![1.0]);
/// law.apply(&model, &mut data, binder.bindings(), &[1.0]);
/// assert_eq!(data.ctrl[0], 5.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ControlLawApplier {
    kp: Vec<f64>,
    kd: Vec<f64>,
}

impl ControlLawApplier {
    /// Gains from policy metadata.
    #[must_use]
    pub fn new(meta: &PolicyMetadata) -> Self {
        Self::from_gains(
            meta.stiffness().iter().map(|&v| f64::from(v)).collect(),
            meta.damping().iter().map(|&v| f64::from(v)).collect(),
        )
    }

    /// Explicit gains in policy joint order.
    #[must_use]
    pub const fn from_gains(kp: Vec<f64>, kd: Vec<f64>) -> Self {
        Self { kp, kd }
    }

    /// Proportional gains.
    #[must_use]
    pub fn kp(&self) -> &[f64] {
        &self.kp
    }

    /// Derivative gains.
    #[must_use]
    pub fn kd(&self) -> &[f64] {
        &self.kd
    }

    /// Writes one control value per actuated joint; returns how many were written.
    pub fn apply<M, D>(
        &self,
        model: &M,
        data: &mut D,
        bindings: &BindingTable,
        targets: &[f32],
    ) -> usize
    where
        M: SimModel + ?Sized,
        D: SimData + ?Sized,
    {
        let mut written = 0;
        for (i, binding) in bindings.joints().iter().enumerate() {
            let Some(ctrl) = binding.ctrl_index else {
                continue;
            };
            let position = binding
                .qpos_adr
                .and_then(|adr| data.qpos().get(adr).copied())
                .unwrap_or(0.0);
            let velocity = binding
                .qvel_adr
                .and_then(|adr| data.qvel().get(adr).copied())
                .unwrap_or(0.0);
            let target = targets.get(i).copied().map_or(0.0, f64::from);
            let kp = self.kp.get(i).copied().unwrap_or(0.0);
            let kd = self.kd.get(i).copied().unwrap_or(0.0);

            let torque = pd_torque(kp, kd, target, position, velocity);
            let value = clamp_to_range(torque, model.actuator_ctrl_range(ctrl));
            if let Some(slot) = data.ctrl_mut().get_mut(ctrl) {
                *slot = value;
                written += 1;
            }
        }
        written
    }
}
