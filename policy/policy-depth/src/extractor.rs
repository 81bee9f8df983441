//! Depth feature extraction with latency emulation.

use policy_types::{DepthConfig, InferenceSession, Tensor, TensorMap};
use tracing::{debug, warn};

use crate::error::{DepthError, Result};
use crate::frame::DepthFrame;
use crate::preprocess::{DepthPreprocessor, DepthPreview};
use crate::queue::DepthLatentQueue;

/// Runs the depth backbone on the latest frame and delays its output.
///
/// Failures never propagate out of [`tick`](Self::tick): they are logged and
/// recorded as a missing feature, which the consumer sees as zeros.
pub struct DepthFeatureExtractor {
    session: Option<Box<dyn InferenceSession>>,
    feature_dim: usize,
    preprocessor: DepthPreprocessor,
    queue: DepthLatentQueue,
    frame: Option<DepthFrame>,
}

impl std::fmt::Debug for DepthFeatureExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DepthFeatureExtractor")
            .field("backbone", &self.session.is_some())
            .field("feature_dim", &self.feature_dim)
            .field("queue_len", &self.queue.len())
            .field("has_frame", &self.frame.is_some())
            .finish_non_exhaustive()
    }
}

impl DepthFeatureExtractor {
    /// Creates an extractor; `session` is the depth backbone, if one was loaded.
    #[must_use]
    pub fn new(config: &DepthConfig, session: Option<Box<dyn InferenceSession>>) -> Self {
        Self {
            session,
            feature_dim: config.feature_dim,
            preprocessor: DepthPreprocessor::new(config),
            queue: DepthLatentQueue::new(config.latency_steps),
            frame: None,
        }
    }

    /// Returns `true` if a backbone is loaded.
    #[must_use]
    pub fn has_backbone(&self) -> bool {
        self.session.is_some()
    }

    /// Feature length handed to the policy.
    #[must_use]
    pub const fn feature_dim(&self) -> usize {
        self.feature_dim
    }

    /// Replaces the current frame; `None` clears it.
    pub fn set_frame(&mut self, frame: Option<DepthFrame>) {
        self.frame = frame;
    }

    /// The frame the next extraction will use.
    #[must_use]
    pub const fn frame(&self) -> Option<&DepthFrame> {
        self.frame.as_ref()
    }

    /// Last preprocessed buffer.
    #[must_use]
    pub const fn preview(&self) -> Option<&DepthPreview> {
        self.preprocessor.preview()
    }

    /// Latency queue state.
    #[must_use]
    pub const fn queue(&self) -> &DepthLatentQueue {
        &self.queue
    }

    /// Runs the backbone on the current frame.
    ///
    /// The preprocessed image is flipped vertically and fed as `[1, H, W]`.
    ///
    /// # Errors
    ///
    /// - [`DepthError::BackboneUnavailable`] without a backbone
    /// - [`DepthError::NoFrame`] before the first frame
    /// - [`DepthError::NoInput`] / [`DepthError::MissingOutput`] when the
    ///   network declares no usable input or output
    /// - [`DepthError::Backbone`] when the network fails
    /// - [`DepthError::FeatureLength`] for an output of the wrong size
    pub fn extract(&mut self) -> Result<Vec<f32>> {
        let session = self.session.as_mut().ok_or(DepthError::BackboneUnavailable)?;
        let frame = self.frame.as_ref().ok_or(DepthError::NoFrame)?;
        let input = self.preprocessor.process(frame)?;
        let res = self.preprocessor.resolution();

        let input_name = session
            .primary_input()
            .ok_or(DepthError::NoInput)?
            .to_string();
        let output_name = session
            .output_names()
            .first()
            .cloned()
            .ok_or_else(|| DepthError::MissingOutput(String::new()))?;

        let flipped = flip_rows(&input, res.width, res.height);
        let len = flipped.len();
        let image =
            Tensor::new(vec![1, res.height, res.width], flipped).ok_or(DepthError::BufferSize {
                expected: res.pixels(),
                actual: len,
            })?;
        let mut feeds = TensorMap::new();
        feeds.insert(input_name, image);

        let mut outputs = session.run(feeds)?;
        let feature = outputs
            .remove(&output_name)
            .ok_or(DepthError::MissingOutput(output_name))?
            .into_data();
        if feature.len() != self.feature_dim {
            return Err(DepthError::FeatureLength {
                expected: self.feature_dim,
                actual: feature.len(),
            });
        }
        Ok(feature)
    }

    /// Advances one control tick.
    ///
    /// Extracts a feature (or records its absence), pushes exactly one queue
    /// entry, and returns the delayed feature padded with zeros to
    /// [`feature_dim`](Self::feature_dim).
    pub fn tick(&mut self) -> Vec<f32> {
        let produced = if self.session.is_some() {
            match self.extract() {
                Ok(feature) => Some(feature),
                Err(DepthError::NoFrame) => {
                    debug!("depth backbone skipped, no frame yet");
                    None
                }
                Err(err) => {
                    warn!(error = %err, "depth feature unavailable");
                    None
                }
            }
        } else {
            None
        };

        let mut delayed = self.queue.advance(produced).unwrap_or_default();
        delayed.resize(self.feature_dim, 0.0);
        delayed
    }

    /// Clears the latency queue.
    pub fn reset(&mut self) {
        self.queue.clear();
    }
}

/// Reverses row order of a row-major `width x height` image.
#[must_use]
pub fn flip_rows(image: &[f32], width: usize, height: usize) -> Vec<f32> {
    let mut out = Vec::with_capacity(image.len());
    for y in (0..height).rev() {
        out.extend_from_slice(&image[y * width..(y + 1) * width]);
    }
    out
}
