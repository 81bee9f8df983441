//! Observation vocabulary and buffer layout.
//!
//! A policy declares its observation as an ordered list of tokens. Each token
//! names one block of the input vector. The vocabulary is closed: a token that
//! is not listed in [`ObservationTerm`] is rejected when the metadata is read,
//! never skipped at assembly time.

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::command::COMMAND_DIM;
use crate::error::TypesError;

/// Width of the reserved command block (always zero-filled).
pub const COMMAND_PLACEHOLDER_DIM: usize = 3;

/// One block of the observation vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservationTerm {
    /// Root linear velocity (3).
    BaseLinVel,
    /// Root angular velocity (3).
    BaseAngVel,
    /// Gravity direction in the root frame (3).
    ProjectedGravity,
    /// Gravity direction in the anchor body frame, root frame when unbound (3).
    #[serde(rename = "robot_anchor_projected_gravity")]
    AnchorProjectedGravity,
    /// Reserved command block, emitted as zeros (3).
    Command,
    /// One-hot locomotion command (15).
    Placeholder,
    /// Joint position relative to the default pose (joint count).
    JointPos,
    /// Joint velocity (joint count).
    JointVel,
    /// Previous raw action (joint count).
    Actions,
}

impl ObservationTerm {
    /// Every recognized term.
    pub const ALL: [Self; 9] = [
        Self::BaseLinVel,
        Self::BaseAngVel,
        Self::ProjectedGravity,
        Self::AnchorProjectedGravity,
        Self::Command,
        Self::Placeholder,
        Self::JointPos,
        Self::JointVel,
        Self::Actions,
    ];

    /// Token as it appears in policy metadata.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::BaseLinVel => "base_lin_vel",
            Self::BaseAngVel => "base_ang_vel",
            Self::ProjectedGravity => "projected_gravity",
            Self::AnchorProjectedGravity => "robot_anchor_projected_gravity",
            Self::Command => "command",
            Self::Placeholder => "placeholder",
            Self::JointPos => "joint_pos",
            Self::JointVel => "joint_vel",
            Self::Actions => "actions",
        }
    }

    /// Number of values this term contributes for `joint_count` joints.
    #[must_use]
    pub const fn width(&self, joint_count: usize) -> usize {
        match self {
            Self::BaseLinVel
            | Self::BaseAngVel
            | Self::ProjectedGravity
            | Self::AnchorProjectedGravity => 3,
            Self::Command => COMMAND_PLACEHOLDER_DIM,
            Self::Placeholder => COMMAND_DIM,
            Self::JointPos | Self::JointVel | Self::Actions => joint_count,
        }
    }

    /// Returns `true` if the width scales with the joint count.
    #[must_use]
    pub const fn is_per_joint(&self) -> bool {
        matches!(self, Self::JointPos | Self::JointVel | Self::Actions)
    }
}

impl FromStr for ObservationTerm {
    type Err = TypesError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|term| term.as_str() == token)
            .ok_or_else(|| TypesError::unknown_observation(token))
    }
}

impl fmt::Display for ObservationTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Offsets of every term inside the observation buffer.
///
/// Offsets are a pure function of the term order and the joint count:
/// each term starts where the previous one ended.
///
/// # Example
///
/// ```
/// use policy_types::{ObservationLayout, ObservationTerm};
///
/// let terms = [
///     ObservationTerm::ProjectedGravity,
///     ObservationTerm::JointPos,
///     ObservationTerm::JointVel,
///     ObservationTerm::Actions,
///     ObservationTerm::Placeholder,
/// ];
/// let layout = ObservationLayout::new(&terms, 29);
/// assert_eq!(layout.len(), 105);
/// assert_eq!(layout.range(1), Some(3..32));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservationLayout {
    slots: Vec<(ObservationTerm, Range<usize>)>,
    len: usize,
}

impl ObservationLayout {
    /// Computes the layout for `terms` in declared order.
    #[must_use]
    pub fn new(terms: &[ObservationTerm], joint_count: usize) -> Self {
        let mut offset = 0;
        let slots = terms
            .iter()
            .map(|&term| {
                let start = offset;
                offset += term.width(joint_count);
                (term, start..offset)
            })
            .collect();
        Self { slots, len: offset }
    }

    /// Total buffer length.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the layout has no values.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Range of the `index`-th declared term.
    #[must_use]
    pub fn range(&self, index: usize) -> Option<Range<usize>> {
        self.slots.get(index).map(|(_, range)| range.clone())
    }

    /// Iterates `(term, range)` in declared order.
    pub fn iter(&self) -> impl Iterator<Item = (ObservationTerm, Range<usize>)> + '_ {
        self.slots.iter().map(|(term, range)| (*term, range.clone()))
    }

    /// Number of declared terms.
    #[must_use]
    pub fn term_count(&self) -> usize {
        self.slots.len()
    }
}
