//! Operator input to locomotion command.

use policy_types::{AutoForwardConfig, BaseDirection, CommandVector, SpeedTier};

/// Key that toggles the speed tier.
pub const SPEED_TOGGLE_KEY: char = 'y';

/// Direction keys the command recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectionKey {
    /// `w`
    Forward,
    /// `a`
    Left,
    /// `d`
    Right,
    /// `q`
    TurnLeft,
    /// `e`
    TurnRight,
}

impl DirectionKey {
    /// Maps a key, case-insensitive.
    #[must_use]
    pub fn from_char(key: char) -> Option<Self> {
        match key.to_ascii_lowercase() {
            'w' => Some(Self::Forward),
            'a' => Some(Self::Left),
            'd' => Some(Self::Right),
            'q' => Some(Self::TurnLeft),
            'e' => Some(Self::TurnRight),
            _ => None,
        }
    }

    const fn bit(self) -> u8 {
        match self {
            Self::Forward => 1,
            Self::Left => 1 << 1,
            Self::Right => 1 << 2,
            Self::TurnLeft => 1 << 3,
            Self::TurnRight => 1 << 4,
        }
    }
}

/// Resolves active inputs to a base direction.
///
/// Precedence: forward-left (or turn-left), then forward-right (or
/// turn-right), then forward, left, right.
#[must_use]
#[allow(clippy::fn_params_excessive_bools)]
pub const fn resolve_direction(
    forward: bool,
    left: bool,
    right: bool,
    turn_left: bool,
    turn_right: bool,
) -> BaseDirection {
    if (forward && left) || turn_left {
        BaseDirection::ForwardLeft
    } else if (forward && right) || turn_right {
        BaseDirection::ForwardRight
    } else if forward {
        BaseDirection::Forward
    } else if left {
        BaseDirection::Left
    } else if right {
        BaseDirection::Right
    } else {
        BaseDirection::Idle
    }
}

/// Pressed keys, auto-forward override, and speed tier.
///
/// The command vector is recomputed on every event.
///
/// # Example
///
/// ```
/// use policy_control::CommandInput;
/// use policy_types::SpeedTier;
///
/// let mut input = CommandInput::new(SpeedTier::Normal);
/// input.key_down('w', false);
/// input.key_down('a', false);
/// assert_eq!(input.command().active_slot(), 2);
/// input.key_down('y', false);
/// assert_eq!(input.command().active_slot(), 7);
/// input.blur();
/// assert_eq!(input.command().active_slot(), 0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CommandInput {
    pressed: u8,
    auto_forward: bool,
    tier: SpeedTier,
    command: CommandVector,
}

impl Default for CommandInput {
    fn default() -> Self {
        Self::new(SpeedTier::default())
    }
}

impl CommandInput {
    /// No keys pressed, idle command.
    #[must_use]
    pub const fn new(tier: SpeedTier) -> Self {
        Self {
            pressed: 0,
            auto_forward: false,
            tier,
            command: CommandVector::idle(),
        }
    }

    /// Handles a key press. Held-key repeats do not toggle the speed tier.
    pub fn key_down(&mut self, key: char, repeat: bool) {
        if key.eq_ignore_ascii_case(&SPEED_TOGGLE_KEY) && !repeat {
            self.tier = self.tier.toggled();
        }
        if let Some(key) = DirectionKey::from_char(key) {
            self.pressed |= key.bit();
        }
        self.update();
    }

    /// Handles a key release.
    pub fn key_up(&mut self, key: char) {
        if let Some(key) = DirectionKey::from_char(key) {
            self.pressed &= !key.bit();
        }
        self.update();
    }

    /// Focus lost: releases every key.
    pub fn blur(&mut self) {
        self.pressed = 0;
        self.update();
    }

    /// Sets the auto-forward override, which acts as a held `w`.
    pub fn set_auto_forward(&mut self, enabled: bool) {
        self.auto_forward = enabled;
        self.update();
    }

    /// Flips between normal and high speed.
    pub fn toggle_speed_tier(&mut self) {
        self.tier = self.tier.toggled();
        self.update();
    }

    /// Releases every key and the override; the tier is kept.
    pub fn reset(&mut self) {
        self.pressed = 0;
        self.auto_forward = false;
        self.update();
    }

    /// Returns `true` if `key` is held.
    #[must_use]
    pub const fn is_pressed(&self, key: DirectionKey) -> bool {
        self.pressed & key.bit() != 0
    }

    /// Current auto-forward override.
    #[must_use]
    pub const fn auto_forward(&self) -> bool {
        self.auto_forward
    }

    /// Current speed tier.
    #[must_use]
    pub const fn tier(&self) -> SpeedTier {
        self.tier
    }

    /// Resolved direction.
    #[must_use]
    pub const fn direction(&self) -> BaseDirection {
        resolve_direction(
            self.is_pressed(DirectionKey::Forward) || self.auto_forward,
            self.is_pressed(DirectionKey::Left),
            self.is_pressed(DirectionKey::Right),
            self.is_pressed(DirectionKey::TurnLeft),
            self.is_pressed(DirectionKey::TurnRight),
        )
    }

    /// Current one-hot command.
    #[must_use]
    pub const fn command(&self) -> &CommandVector {
        &self.command
    }

    fn update(&mut self) {
        self.command = CommandVector::from_direction(self.direction(), self.tier);
    }
}

/// Stretches of the x axis where forward motion is requested automatically.
#[derive(Debug, Clone, PartialEq)]
pub struct AutoForwardZones {
    config: AutoForwardConfig,
}

impl AutoForwardZones {
    /// Creates zones from configuration.
    #[must_use]
    pub const fn new(config: AutoForwardConfig) -> Self {
        Self { config }
    }

    /// Returns `true` if `x` lies in `[center - before, center + after]` of any zone.
    #[must_use]
    pub fn contains(&self, x: f64) -> bool {
        self.config.enabled
            && self
                .config
                .centers
                .iter()
                .any(|&c| x >= c - self.config.before && x <= c + self.config.after)
    }
}
