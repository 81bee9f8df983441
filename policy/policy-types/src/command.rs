//! Locomotion command encoding.

use serde::{Deserialize, Serialize};

/// Length of the one-hot command vector.
pub const COMMAND_DIM: usize = 15;

/// First slot of the high-speed range.
const HIGH_SPEED_OFFSET: usize = 5;

/// Direction requested by the operator, before the speed tier is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BaseDirection {
    /// Stand still.
    #[default]
    Idle,
    /// Walk straight ahead.
    Forward,
    /// Forward while veering or turning left.
    ForwardLeft,
    /// Step left.
    Left,
    /// Forward while veering or turning right.
    ForwardRight,
    /// Step right.
    Right,
}

impl BaseDirection {
    /// Slot index at normal speed (0 = idle, 1..=5 directional).
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Idle => 0,
            Self::Forward => 1,
            Self::ForwardLeft => 2,
            Self::Left => 3,
            Self::ForwardRight => 4,
            Self::Right => 5,
        }
    }
}

/// Speed tier toggled by the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SpeedTier {
    /// Directional slots 1..=5.
    Normal,
    /// Directional slots 6..=10.
    #[default]
    High,
}

impl SpeedTier {
    /// Returns the other tier.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Normal => Self::High,
            Self::High => Self::Normal,
        }
    }
}

/// One-hot command vector fed to the policy.
///
/// Exactly one slot is set. Idle always maps to slot 0 regardless of tier.
///
/// # Example
///
/// ```
/// use policy_types::{BaseDirection, CommandVector, SpeedTier};
///
/// let cmd = CommandVector::from_direction(BaseDirection::Forward, SpeedTier::High);
/// assert_eq!(cmd.active_slot(), 6);
/// assert_eq!(CommandVector::idle().active_slot(), 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CommandVector {
    values: [f32; COMMAND_DIM],
}

impl Default for CommandVector {
    fn default() -> Self {
        Self::idle()
    }
}

impl CommandVector {
    /// The idle command (slot 0).
    #[must_use]
    pub const fn idle() -> Self {
        Self::one_hot(0)
    }

    /// A vector with `slot` set; out-of-range slots fall back to idle.
    #[must_use]
    pub const fn one_hot(slot: usize) -> Self {
        let mut values = [0.0; COMMAND_DIM];
        if slot < COMMAND_DIM {
            values[slot] = 1.0;
        } else {
            values[0] = 1.0;
        }
        Self { values }
    }

    /// Encodes a direction at a speed tier.
    #[must_use]
    pub const fn from_direction(direction: BaseDirection, tier: SpeedTier) -> Self {
        let base = direction.index();
        let slot = match (base, tier) {
            (0, _) | (_, SpeedTier::Normal) => base,
            (_, SpeedTier::High) => base + HIGH_SPEED_OFFSET,
        };
        Self::one_hot(slot)
    }

    /// Index of the set slot.
    #[must_use]
    pub fn active_slot(&self) -> usize {
        self.values.iter().position(|&v| v > 0.5).unwrap_or(0)
    }

    /// Raw values.
    #[must_use]
    pub const fn as_slice(&self) -> &[f32] {
        &self.values
    }
}
