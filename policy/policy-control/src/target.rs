//! Joint position targets derived from policy actions.

use policy_types::PolicyMetadata;

use crate::error::{ControlError, Result};

/// Desired joint positions, `default + scale * action` per joint.
///
/// Holds the last raw action as well, which the next observation feeds back.
/// A rejected action leaves every field untouched.
///
/// # Example
///
/// ```
/// use policy_control::ControlTarget;
///
/// let mut target = ControlTarget::from_parts(vec![0.1, -0.2], vec![0.5, 0.5]);
/// target.update(&[1.0, -1.0])?;
/// assert!((target.values()[0] - 0.6).abs() < 1e-6);
/// assert!((target.values()[1] + 0.7).abs() < 1e-6);
/// assert!(target.update(&[1.0]).is_err());
/// assert_eq!(target.latest_action(), &[1.0, -1.0]);
/// # Ok::<(), policy_control::ControlError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ControlTarget {
    default_pose: Vec<f32>,
    scale: Vec<f32>,
    values: Vec<f32>,
    latest_action: Vec<f32>,
}

impl ControlTarget {
    /// Target at the default pose of `meta`.
    #[must_use]
    pub fn new(meta: &PolicyMetadata) -> Self {
        Self::from_parts(meta.default_joint_pos().to_vec(), meta.action_scale().to_vec())
    }

    /// Target from an explicit default pose and action scale.
    ///
    /// The scale is padded with `1.0` or truncated to the pose length.
    #[must_use]
    pub fn from_parts(default_pose: Vec<f32>, mut scale: Vec<f32>) -> Self {
        let n = default_pose.len();
        scale.resize(n, 1.0);
        Self {
            values: default_pose.clone(),
            latest_action: vec![0.0; n],
            default_pose,
            scale,
        }
    }

    /// Joint count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.default_pose.len()
    }

    /// Returns `true` for a target without joints.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.default_pose.is_empty()
    }

    /// Desired positions in policy joint order.
    #[must_use]
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Last accepted raw action.
    #[must_use]
    pub fn latest_action(&self) -> &[f32] {
        &self.latest_action
    }

    /// Default pose.
    #[must_use]
    pub fn default_pose(&self) -> &[f32] {
        &self.default_pose
    }

    /// Zero action, target at the default pose.
    pub fn reset(&mut self) {
        self.values.copy_from_slice(&self.default_pose);
        self.latest_action.fill(0.0);
    }

    /// Accepts a raw action.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::ActionLength`] when `action` is not one value
    /// per joint.
    pub fn update(&mut self, action: &[f32]) -> Result<()> {
        if action.len() != self.len() {
            return Err(ControlError::action_length(self.len(), action.len()));
        }
        self.latest_action.copy_from_slice(action);
        for (((value, default), scale), a) in self
            .values
            .iter_mut()
            .zip(&self.default_pose)
            .zip(&self.scale)
            .zip(action)
        {
            *value = default + scale * a;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use policy_types::ObservationTerm;

    #[test]
    fn starts_at_default_pose() {
        let meta = PolicyMetadata::new(
            vec!["a".into(), "b".into()],
            vec![ObservationTerm::Actions],
            vec![0.25, 0.5],
            vec![0.3, -0.6],
            vec![0.0; 2],
            vec![0.0; 2],
        )
        .unwrap_or_else(|e| panic!("{e}"));
        let mut target = ControlTarget::new(&meta);
        assert_eq!(target.values(), &[0.3, -0.6]);
        assert_eq!(target.latest_action(), &[0.0, 0.0]);

        target.update(&[2.0, 2.0]).unwrap_or_else(|e| panic!("{e}"));
        assert_relative_eq!(target.values()[0], 0.8);
        assert_relative_eq!(target.values()[1], 0.4);

        target.reset();
        assert_eq!(target.values(), &[0.3, -0.6]);
        assert_eq!(target.latest_action(), &[0.0, 0.0]);
    }

    #[test]
    fn rejected_action_changes_nothing() {
        let mut target = ControlTarget::from_parts(vec![0.0; 3], vec![1.0]);
        target.update(&[0.1, 0.2, 0.3]).unwrap_or_else(|e| panic!("{e}"));
        let before = target.clone();
        assert!(matches!(
            target.update(&[5.0; 4]),
            Err(ControlError::ActionLength { expected: 3, actual: 4 })
        ));
        assert_eq!(target, before);
    }

    #[test]
    fn short_scale_padded_with_one() {
        let mut target = ControlTarget::from_parts(vec![0.0; 2], vec![0.5]);
        target.update(&[1.0, 1.0]).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(target.values(), &[0.5, 1.0]);
    }
}
