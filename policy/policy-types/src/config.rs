//! Configuration for a policy control session.
//!
//! Defaults match the depth camera and control rate the shipped humanoid
//! policies were trained with.

use serde::{Deserialize, Serialize};

use crate::command::SpeedTier;
use crate::error::{Result, TypesError};

/// Suffix of a student policy artifact.
const STUDENT_SUFFIX: &str = "_student.onnx";

/// Suffix of the matching depth backbone artifact.
const DEPTH_BACKBONE_SUFFIX: &str = "_depth_backbone.onnx";

/// Top-level bridge configuration.
///
/// # Example
///
/// ```
/// use policy_types::BridgeConfig;
///
/// let config = BridgeConfig::default().with_control_dt(0.01);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.decimation(0.002), 5);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Policy artifact path.
    pub policy_path: String,
    /// Depth backbone artifact path; derived from `policy_path` when `None`.
    pub depth_model_path: Option<String>,
    /// Control period in seconds.
    pub control_dt: f64,
    /// Body whose frame the anchor gravity term uses.
    pub anchor_body: String,
    /// Initial speed tier.
    pub speed_tier: SpeedTier,
    /// Depth pipeline settings.
    pub depth: DepthConfig,
    /// Auto-forward zones along the x axis.
    pub auto_forward: AutoForwardConfig,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            policy_path: "policy.onnx".to_string(),
            depth_model_path: None,
            control_dt: 0.02,
            anchor_body: "torso_link".to_string(),
            speed_tier: SpeedTier::High,
            depth: DepthConfig::default(),
            auto_forward: AutoForwardConfig::default(),
        }
    }
}

impl BridgeConfig {
    /// Sets the policy path.
    #[must_use]
    pub fn with_policy_path(mut self, path: impl Into<String>) -> Self {
        self.policy_path = path.into();
        self
    }

    /// Sets the control period.
    #[must_use]
    pub const fn with_control_dt(mut self, control_dt: f64) -> Self {
        self.control_dt = control_dt;
        self
    }

    /// Sets the anchor body name.
    #[must_use]
    pub fn with_anchor_body(mut self, name: impl Into<String>) -> Self {
        self.anchor_body = name.into();
        self
    }

    /// Sets the depth settings.
    #[must_use]
    pub const fn with_depth(mut self, depth: DepthConfig) -> Self {
        self.depth = depth;
        self
    }

    /// Depth backbone path, explicit or derived from the policy path.
    ///
    /// `run_student.onnx` becomes `run_depth_backbone.onnx`; other names are
    /// returned unchanged.
    #[must_use]
    pub fn depth_model_path(&self) -> String {
        self.depth_model_path.clone().unwrap_or_else(|| {
            self.policy_path
                .strip_suffix(STUDENT_SUFFIX)
                .map_or_else(
                    || self.policy_path.clone(),
                    |stem| format!("{stem}{DEPTH_BACKBONE_SUFFIX}"),
                )
        })
    }

    /// Substeps per policy invocation: `max(1, round(control_dt / timestep))`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn decimation(&self, timestep: f64) -> usize {
        if !(timestep.is_finite() && timestep > 0.0) {
            return 1;
        }
        let ratio = (self.control_dt / timestep).round();
        if ratio.is_finite() && ratio >= 1.0 {
            ratio as usize
        } else {
            1
        }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TypesError::InvalidConfig`] describing the first bad value.
    pub fn validate(&self) -> Result<()> {
        if !self.control_dt.is_finite() || self.control_dt <= 0.0 {
            return Err(TypesError::invalid_config(format!(
                "control_dt must be positive, got {}",
                self.control_dt
            )));
        }
        self.depth.validate()?;
        self.auto_forward.validate()
    }

    /// Parses a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TypesError::Serialization`] on malformed JSON and
    /// [`TypesError::InvalidConfig`] when validation fails.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes to pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns [`TypesError::Serialization`] if serialization fails.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Pixels removed from each edge before resizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CropMargins {
    /// Rows removed at the top.
    pub top: usize,
    /// Columns removed at the left.
    pub left: usize,
    /// Columns removed at the right.
    pub right: usize,
    /// Rows removed at the bottom.
    pub bottom: usize,
}

/// Image size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// Width.
    pub width: usize,
    /// Height.
    pub height: usize,
}

impl Resolution {
    /// Creates a resolution.
    #[must_use]
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Pixel count.
    #[must_use]
    pub const fn pixels(&self) -> usize {
        self.width * self.height
    }
}

/// Valid depth range in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClipRange {
    /// Near limit.
    pub min: f32,
    /// Far limit.
    pub max: f32,
}

impl ClipRange {
    /// Creates a range.
    #[must_use]
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Returns `true` if both bounds are finite and `min < max`.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min < self.max
    }
}

/// Depth preprocessing and delay settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepthConfig {
    /// Crop margins applied to the raw frame.
    pub crop: CropMargins,
    /// Network input resolution.
    pub resize: Resolution,
    /// Clipping range used to normalize depth for the backbone.
    pub clip: ClipRange,
    /// Delay, in control ticks, of the depth feature.
    pub latency_steps: usize,
    /// Feature vector length produced by the depth backbone.
    pub feature_dim: usize,
}

impl Default for DepthConfig {
    fn default() -> Self {
        Self {
            crop: CropMargins {
                top: 2,
                left: 4,
                right: 4,
                bottom: 0,
            },
            resize: Resolution::new(87, 58),
            clip: ClipRange::new(0.3, 3.0),
            latency_steps: 7,
            feature_dim: 32,
        }
    }
}

impl DepthConfig {
    /// Sets the latency.
    #[must_use]
    pub const fn with_latency_steps(mut self, steps: usize) -> Self {
        self.latency_steps = steps;
        self
    }

    /// Sets the target resolution.
    #[must_use]
    pub const fn with_resize(mut self, resize: Resolution) -> Self {
        self.resize = resize;
        self
    }

    /// Sets the clipping range.
    #[must_use]
    pub const fn with_clip(mut self, clip: ClipRange) -> Self {
        self.clip = clip;
        self
    }

    /// Sets the crop margins.
    #[must_use]
    pub const fn with_crop(mut self, crop: CropMargins) -> Self {
        self.crop = crop;
        self
    }

    /// Validates the settings.
    ///
    /// # Errors
    ///
    /// Returns [`TypesError::InvalidConfig`] for an empty resolution,
    /// an invalid clip range, or a zero feature size.
    pub fn validate(&self) -> Result<()> {
        if self.resize.pixels() == 0 {
            return Err(TypesError::invalid_config("depth resize must be non-empty"));
        }
        if !self.clip.is_valid() {
            return Err(TypesError::invalid_config(format!(
                "depth clip range [{}, {}] is invalid",
                self.clip.min, self.clip.max
            )));
        }
        if self.feature_dim == 0 {
            return Err(TypesError::invalid_config("depth feature_dim must be > 0"));
        }
        Ok(())
    }
}

/// Regions along x where forward motion is requested automatically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoForwardConfig {
    /// Whether zones are evaluated at all.
    pub enabled: bool,
    /// Zone centers along x.
    pub centers: Vec<f64>,
    /// Distance covered before each center.
    pub before: f64,
    /// Distance covered after each center.
    pub after: f64,
}

impl Default for AutoForwardConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            centers: (1..=12).map(|i| f64::from(i) * 5.0).collect(),
            before: 1.5,
            after: 1.0,
        }
    }
}

impl AutoForwardConfig {
    /// Disabled zones.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Validates the window sizes.
    ///
    /// # Errors
    ///
    /// Returns [`TypesError::InvalidConfig`] for negative or non-finite windows.
    pub fn validate(&self) -> Result<()> {
        let ok = |v: f64| v.is_finite() && v >= 0.0;
        if ok(self.before) && ok(self.after) {
            Ok(())
        } else {
            Err(TypesError::invalid_config(
                "auto-forward window must be finite and non-negative",
            ))
        }
    }
}
