//! Convolutional depth backbone producing a fixed-size perception feature.

use burn::module::Module;
use burn::nn;
use burn::nn::conv::{Conv2d, Conv2dConfig};
use burn::nn::pool::{AdaptiveAvgPool2d, AdaptiveAvgPool2dConfig};
use burn::prelude::Backend;
use burn::tensor::Tensor;
use burn::tensor::activation::relu;
use policy_types::Tensor as HostTensor;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::network::{PolicyNetwork, check_dims, to_device, to_host};

/// Configuration for [`DepthBackbone`].
///
/// # Example
///
/// ```
/// use policy_models::DepthBackboneConfig;
///
/// let config = DepthBackboneConfig::default();
/// assert_eq!(config.feature_dim, 32);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthBackboneConfig {
    /// Channels of the first convolution; the second doubles it.
    pub channels: usize,
    /// Output feature length.
    pub feature_dim: usize,
}

impl Default for DepthBackboneConfig {
    fn default() -> Self {
        Self {
            channels: 16,
            feature_dim: 32,
        }
    }
}

impl DepthBackboneConfig {
    /// Sets the channel count.
    #[must_use]
    pub const fn with_channels(mut self, channels: usize) -> Self {
        self.channels = channels;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidConfig`] for zero channels or features.
    pub fn validate(&self) -> Result<()> {
        if self.channels == 0 || self.feature_dim == 0 {
            return Err(ModelError::invalid_config(
                "backbone channels and feature_dim must be positive",
            ));
        }
        Ok(())
    }
}

/// Depth image encoder.
///
/// Architecture: `[B, H, W]` -> Conv 3x3/2 -> `ReLU` -> Conv 3x3/2 -> `ReLU`
/// -> global average pool -> Linear -> `[B, feature_dim]`
///
/// Any image size works; pooling removes the spatial dimensions.
#[derive(Debug, Module)]
pub struct DepthBackbone<B: Backend> {
    conv1: Conv2d<B>,
    conv2: Conv2d<B>,
    pool: AdaptiveAvgPool2d,
    head: nn::Linear<B>,
    #[module(skip)]
    channels: usize,
}

impl<B: Backend> DepthBackbone<B> {
    /// Creates a backbone with freshly initialized weights.
    #[must_use]
    pub fn new(config: DepthBackboneConfig, device: &B::Device) -> Self {
        let channels = config.channels * 2;
        let conv1 = Conv2dConfig::new([1, config.channels], [3, 3])
            .with_stride([2, 2])
            .with_padding(nn::PaddingConfig2d::Explicit(1, 1))
            .init(device);
        let conv2 = Conv2dConfig::new([config.channels, channels], [3, 3])
            .with_stride([2, 2])
            .with_padding(nn::PaddingConfig2d::Explicit(1, 1))
            .init(device);
        let pool = AdaptiveAvgPool2dConfig::new([1, 1]).init();
        let head = nn::LinearConfig::new(channels, config.feature_dim).init(device);
        Self {
            conv1,
            conv2,
            pool,
            head,
            channels,
        }
    }

    /// Runs the forward pass.
    ///
    /// - `input`: normalized depth `[batch, height, width]`
    pub fn forward(&self, input: Tensor<B, 3>) -> Tensor<B, 2> {
        let batch = input.dims()[0];
        let x = input.unsqueeze_dim::<4>(1);
        let x = relu(self.conv1.forward(x));
        let x = relu(self.conv2.forward(x));
        let x = self.pool.forward(x).reshape([batch, self.channels]);
        self.head.forward(x)
    }
}

impl<B: Backend> PolicyNetwork<B> for DepthBackbone<B> {
    const INPUT_NAME: &'static str = "depth";
    const OUTPUT_NAME: &'static str = "depth_latent";

    fn input_dims(&self) -> Vec<Option<usize>> {
        vec![Some(1), None, None]
    }

    fn infer(&self, input: &HostTensor, device: &B::Device) -> Result<HostTensor> {
        check_dims(&self.input_dims(), input.dims())?;
        let dims = input.dims();
        let x = to_device::<B, 3>(input, [1, dims[1], dims[2]], device);
        to_host(self.forward(x))
    }
}
