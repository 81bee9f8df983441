//! Feedforward actor mapping observation and depth feature to joint actions.

use burn::module::Module;
use burn::nn;
use burn::prelude::Backend;
use burn::tensor::Tensor;
use burn::tensor::activation::relu;
use policy_types::Tensor as HostTensor;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::network::{PolicyNetwork, check_dims, to_device, to_host};

/// Configuration for [`ActorMlp`].
///
/// # Example
///
/// ```
/// use policy_models::ActorMlpConfig;
///
/// let config = ActorMlpConfig::new(105, 32, 29);
/// assert_eq!(config.input_dim(), 137);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorMlpConfig {
    /// Observation buffer length.
    pub observation_dim: usize,
    /// Depth feature length appended to the observation.
    pub depth_feature_dim: usize,
    /// Joints driven (output length).
    pub action_dim: usize,
    /// Hidden width.
    pub hidden: usize,
    /// Hidden layers after the first.
    pub depth: usize,
}

impl ActorMlpConfig {
    /// Creates a configuration with a 256-wide, 3-layer body.
    #[must_use]
    pub const fn new(observation_dim: usize, depth_feature_dim: usize, action_dim: usize) -> Self {
        Self {
            observation_dim,
            depth_feature_dim,
            action_dim,
            hidden: 256,
            depth: 2,
        }
    }

    /// Sets the hidden width.
    #[must_use]
    pub const fn with_hidden(mut self, hidden: usize) -> Self {
        self.hidden = hidden;
        self
    }

    /// Sets the number of extra hidden layers.
    #[must_use]
    pub const fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    /// Total input length.
    #[must_use]
    pub const fn input_dim(&self) -> usize {
        self.observation_dim + self.depth_feature_dim
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidConfig`] if any width is zero.
    pub fn validate(&self) -> Result<()> {
        if self.input_dim() == 0 || self.action_dim == 0 || self.hidden == 0 {
            return Err(ModelError::invalid_config(format!(
                "actor dimensions must be positive: input {}, hidden {}, actions {}",
                self.input_dim(),
                self.hidden,
                self.action_dim
            )));
        }
        Ok(())
    }
}

/// Locomotion actor.
///
/// Architecture: Input -> Linear -> `ReLU` -> (Linear -> `ReLU`) x depth -> Linear
///
/// # Type Parameters
///
/// - `B`: The Burn backend (e.g., `NdArray`, `Wgpu`)
#[derive(Debug, Module)]
pub struct ActorMlp<B: Backend> {
    stem: nn::Linear<B>,
    blocks: Vec<nn::Linear<B>>,
    head: nn::Linear<B>,
    #[module(skip)]
    input_dim: usize,
}

impl<B: Backend> ActorMlp<B> {
    /// Creates an actor with freshly initialized weights.
    #[must_use]
    pub fn new(config: ActorMlpConfig, device: &B::Device) -> Self {
        let stem = nn::LinearConfig::new(config.input_dim(), config.hidden).init(device);
        let blocks = (0..config.depth)
            .map(|_| nn::LinearConfig::new(config.hidden, config.hidden).init(device))
            .collect();
        let head = nn::LinearConfig::new(config.hidden, config.action_dim).init(device);
        Self {
            stem,
            blocks,
            head,
            input_dim: config.input_dim(),
        }
    }

    /// Runs the forward pass.
    ///
    /// - `input`: `[batch, observation_dim + depth_feature_dim]`
    ///
    /// Returns raw actions `[batch, action_dim]`.
    pub fn forward(&self, input: Tensor<B, 2>) -> Tensor<B, 2> {
        let mut x = relu(self.stem.forward(input));
        for block in &self.blocks {
            x = relu(block.forward(x));
        }
        self.head.forward(x)
    }
}

impl<B: Backend> PolicyNetwork<B> for ActorMlp<B> {
    const INPUT_NAME: &'static str = "obs";
    const OUTPUT_NAME: &'static str = "actions";

    fn input_dims(&self) -> Vec<Option<usize>> {
        vec![Some(1), Some(self.input_dim)]
    }

    fn infer(&self, input: &HostTensor, device: &B::Device) -> Result<HostTensor> {
        check_dims(&self.input_dims(), input.dims())?;
        let x = to_device::<B, 2>(input, [1, self.input_dim], device);
        to_host(self.forward(x))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn_ndarray::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn config_builder() {
        let config = ActorMlpConfig::new(10, 32, 4).with_hidden(16).with_depth(0);
        assert_eq!(config.hidden, 16);
        assert_eq!(config.depth, 0);
        assert_eq!(config.input_dim(), 42);
    }

    #[test]
    fn config_validation() {
        assert!(ActorMlpConfig::new(10, 0, 4).validate().is_ok());
        assert!(ActorMlpConfig::new(0, 0, 4).validate().is_err());
        assert!(ActorMlpConfig::new(10, 32, 0).validate().is_err());
    }

    #[test]
    fn config_serialization() {
        let config = ActorMlpConfig::new(105, 32, 29);
        let json = serde_json::to_string(&config).unwrap_or_default();
        let parsed: Option<ActorMlpConfig> = serde_json::from_str(&json).ok();
        assert_eq!(parsed, Some(config));
    }

    #[test]
    fn forward_shape() {
        let device = <TestBackend as Backend>::Device::default();
        let config = ActorMlpConfig::new(6, 2, 3).with_hidden(8);
        let actor = ActorMlp::<TestBackend>::new(config, &device);
        let output = actor.forward(Tensor::zeros([2, 8], &device));
        assert_eq!(output.dims(), [2, 3]);
    }

    #[test]
    fn infer_host_tensor() {
        let device = <TestBackend as Backend>::Device::default();
        let config = ActorMlpConfig::new(6, 2, 3).with_hidden(8);
        let actor = ActorMlp::<TestBackend>::new(config, &device);

        let output = actor.infer(&HostTensor::row(vec![0.1; 8]), &device);
        let output = output.unwrap_or_default();
        assert_eq!(output.dims(), &[1, 3]);
        assert!(output.data().iter().all(|v| v.is_finite()));

        assert!(matches!(
            actor.infer(&HostTensor::row(vec![0.1; 7]), &device),
            Err(ModelError::ShapeMismatch { .. })
        ));
    }
}
