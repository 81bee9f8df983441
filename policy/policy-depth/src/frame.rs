//! Raw depth frames.

use policy_types::ClipRange;
use serde::{Deserialize, Serialize};

use crate::error::{DepthError, Result};

/// A depth image from the simulated camera.
///
/// # Depth Values
///
/// - Stored in meters as `f32`, row-major (`depths[y * width + x]`)
/// - Row 0 is the top of the image
/// - Samples outside [`clip`](Self::clip) or non-finite are out of range
///
/// # Example
///
/// ```
/// use policy_depth::DepthFrame;
/// use policy_types::ClipRange;
///
/// let frame = DepthFrame::new(4, 2, vec![1.0; 8], ClipRange::new(0.3, 3.0))?;
/// assert_eq!(frame.get(3, 1), Some(1.0));
/// # Ok::<(), policy_depth::DepthError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FrameFields")]
pub struct DepthFrame {
    width: usize,
    height: usize,
    depths: Vec<f32>,
    clip: ClipRange,
}

#[derive(Deserialize)]
struct FrameFields {
    width: usize,
    height: usize,
    depths: Vec<f32>,
    clip: ClipRange,
}

impl TryFrom<FrameFields> for DepthFrame {
    type Error = DepthError;

    fn try_from(fields: FrameFields) -> Result<Self> {
        Self::new(fields.width, fields.height, fields.depths, fields.clip)
    }
}

impl DepthFrame {
    /// Creates a frame, checking the buffer size and clip range.
    ///
    /// # Errors
    ///
    /// - [`DepthError::BufferSize`] when `depths.len() != width * height`
    /// - [`DepthError::InvalidClip`] unless the clip range is finite with `min < max`
    pub fn new(width: usize, height: usize, depths: Vec<f32>, clip: ClipRange) -> Result<Self> {
        check_clip(clip)?;
        let expected = width * height;
        if depths.len() != expected {
            return Err(DepthError::BufferSize {
                expected,
                actual: depths.len(),
            });
        }
        Ok(Self {
            width,
            height,
            depths,
            clip,
        })
    }

    /// A frame with every sample at the same depth.
    ///
    /// # Errors
    ///
    /// Returns [`DepthError::InvalidClip`] for an unusable clip range.
    pub fn uniform(width: usize, height: usize, depth: f32, clip: ClipRange) -> Result<Self> {
        Self::new(width, height, vec![depth; width * height], clip)
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Row-major samples.
    #[must_use]
    pub fn depths(&self) -> &[f32] {
        &self.depths
    }

    /// Valid range the frame was captured with.
    #[must_use]
    pub const fn clip(&self) -> ClipRange {
        self.clip
    }

    /// Depth at a pixel, `None` out of bounds.
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.depths.get(y * self.width + x).copied()
    }

    /// Checks if a depth value is finite and within the clip range.
    #[must_use]
    pub fn is_valid_depth(&self, depth: f32) -> bool {
        depth.is_finite() && depth >= self.clip.min && depth <= self.clip.max
    }

    /// Fraction of samples in range (0.0 to 1.0).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn valid_fraction(&self) -> f32 {
        if self.depths.is_empty() {
            return 0.0;
        }
        let valid = self.depths.iter().filter(|&&d| self.is_valid_depth(d)).count();
        valid as f32 / self.depths.len() as f32
    }

    /// Renders the raw frame as 8-bit grayscale RGBA, near is bright.
    ///
    /// Each sample is clamped to the clip range before mapping, non-finite
    /// samples render as the far plane.
    #[must_use]
    pub fn to_grayscale_rgba(&self) -> Vec<u8> {
        let span = self.clip.max - self.clip.min;
        let mut rgba = Vec::with_capacity(self.depths.len() * 4);
        for &d in &self.depths {
            let d = if d.is_finite() { d } else { self.clip.max };
            let clamped = d.clamp(self.clip.min, self.clip.max);
            let t = ((clamped - self.clip.min) / span).clamp(0.0, 1.0);
            let v = gray_level(1.0 - t);
            rgba.extend_from_slice(&[v, v, v, 255]);
        }
        rgba
    }
}

pub(crate) fn check_clip(clip: ClipRange) -> Result<()> {
    if clip.is_valid() {
        Ok(())
    } else {
        Err(DepthError::InvalidClip {
            min: clip.min,
            max: clip.max,
        })
    }
}

/// Maps `[0, 1]` to `[0, 255]`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn gray_level(t: f32) -> u8 {
    (t.clamp(0.0, 1.0) * 255.0).round() as u8
}
