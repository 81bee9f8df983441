//! Policy metadata embedded in the policy artifact.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TypesError};
use crate::observation::{ObservationLayout, ObservationTerm};

/// Joint list, observation schema, and per-joint control parameters of a policy.
///
/// Every per-joint vector has exactly one entry per joint name; the
/// constructor refuses anything else. Deserialization goes through the same
/// checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MetadataFields")]
pub struct PolicyMetadata {
    joint_names: Vec<String>,
    observation_terms: Vec<ObservationTerm>,
    action_scale: Vec<f32>,
    default_joint_pos: Vec<f32>,
    stiffness: Vec<f32>,
    damping: Vec<f32>,
}

/// Unchecked serialized form of [`PolicyMetadata`].
#[derive(Deserialize)]
struct MetadataFields {
    joint_names: Vec<String>,
    observation_terms: Vec<ObservationTerm>,
    action_scale: Vec<f32>,
    default_joint_pos: Vec<f32>,
    stiffness: Vec<f32>,
    damping: Vec<f32>,
}

impl TryFrom<MetadataFields> for PolicyMetadata {
    type Error = TypesError;

    fn try_from(fields: MetadataFields) -> Result<Self> {
        Self::new(
            fields.joint_names,
            fields.observation_terms,
            fields.action_scale,
            fields.default_joint_pos,
            fields.stiffness,
            fields.damping,
        )
    }
}

impl PolicyMetadata {
    /// Builds validated metadata.
    ///
    /// # Errors
    ///
    /// Returns [`TypesError::DuplicateJoint`] when joint names repeat and
    /// [`TypesError::LengthMismatch`] when a per-joint vector has the wrong length.
    pub fn new(
        joint_names: Vec<String>,
        observation_terms: Vec<ObservationTerm>,
        action_scale: Vec<f32>,
        default_joint_pos: Vec<f32>,
        stiffness: Vec<f32>,
        damping: Vec<f32>,
    ) -> Result<Self> {
        let mut seen = HashSet::with_capacity(joint_names.len());
        for name in &joint_names {
            if !seen.insert(name.as_str()) {
                return Err(TypesError::DuplicateJoint(name.clone()));
            }
        }

        let n = joint_names.len();
        for (field, len) in [
            ("action_scale", action_scale.len()),
            ("default_joint_pos", default_joint_pos.len()),
            ("joint_stiffness", stiffness.len()),
            ("joint_damping", damping.len()),
        ] {
            if len != n {
                return Err(TypesError::length_mismatch(field, n, len));
            }
        }

        Ok(Self {
            joint_names,
            observation_terms,
            action_scale,
            default_joint_pos,
            stiffness,
            damping,
        })
    }

    /// Number of controlled joints.
    #[must_use]
    pub fn joint_count(&self) -> usize {
        self.joint_names.len()
    }

    /// Joint names in action order.
    #[must_use]
    pub fn joint_names(&self) -> &[String] {
        &self.joint_names
    }

    /// Observation terms in declared order.
    #[must_use]
    pub fn observation_terms(&self) -> &[ObservationTerm] {
        &self.observation_terms
    }

    /// Per-joint action scale.
    #[must_use]
    pub fn action_scale(&self) -> &[f32] {
        &self.action_scale
    }

    /// Per-joint default pose (radians or meters).
    #[must_use]
    pub fn default_joint_pos(&self) -> &[f32] {
        &self.default_joint_pos
    }

    /// Per-joint proportional gain.
    #[must_use]
    pub fn stiffness(&self) -> &[f32] {
        &self.stiffness
    }

    /// Per-joint derivative gain.
    #[must_use]
    pub fn damping(&self) -> &[f32] {
        &self.damping
    }

    /// Observation buffer layout for this policy.
    #[must_use]
    pub fn layout(&self) -> ObservationLayout {
        ObservationLayout::new(&self.observation_terms, self.joint_count())
    }
}
