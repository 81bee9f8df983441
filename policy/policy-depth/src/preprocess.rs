//! Depth preprocessing: crop, bilinear resize, clip and normalize.

use policy_types::{ClipRange, CropMargins, DepthConfig, Resolution};

use crate::error::{DepthError, Result};
use crate::frame::{DepthFrame, check_clip, gray_level};

/// The last model-ready buffer, kept for inspection.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthPreview {
    /// Width in pixels.
    pub width: usize,
    /// Height in pixels.
    pub height: usize,
    /// Row-major values in `[-0.5, 0.5]`.
    pub data: Vec<f32>,
}

impl DepthPreview {
    /// Renders as 8-bit grayscale RGBA: `round(clamp(v + 0.5, 0, 1) * 255)`.
    ///
    /// Non-finite values render black.
    #[must_use]
    pub fn to_grayscale_rgba(&self) -> Vec<u8> {
        let mut rgba = Vec::with_capacity(self.data.len() * 4);
        for &v in &self.data {
            let level = if v.is_finite() { gray_level(v + 0.5) } else { 0 };
            rgba.extend_from_slice(&[level, level, level, 255]);
        }
        rgba
    }
}

/// Turns raw [`DepthFrame`]s into perception network input.
///
/// # Example
///
/// ```
/// use policy_depth::{DepthFrame, DepthPreprocessor};
/// use policy_types::{ClipRange, DepthConfig};
///
/// let mut pre = DepthPreprocessor::new(&DepthConfig::default());
/// let frame = DepthFrame::uniform(95, 60, 3.0, ClipRange::new(0.3, 3.0))?;
/// let input = pre.process(&frame)?;
/// assert_eq!(input.len(), 87 * 58);
/// assert!(input.iter().all(|&v| (v - 0.5).abs() < 1e-6));
/// # Ok::<(), policy_depth::DepthError>(())
/// ```
#[derive(Debug, Clone)]
pub struct DepthPreprocessor {
    crop: CropMargins,
    resize: Resolution,
    clip: ClipRange,
    last: Option<DepthPreview>,
}

impl DepthPreprocessor {
    /// Creates a preprocessor from depth settings.
    #[must_use]
    pub const fn new(config: &DepthConfig) -> Self {
        Self {
            crop: config.crop,
            resize: config.resize,
            clip: config.clip,
            last: None,
        }
    }

    /// Output resolution.
    #[must_use]
    pub const fn resolution(&self) -> Resolution {
        self.resize
    }

    /// Clipping range used for normalization.
    #[must_use]
    pub const fn clip(&self) -> ClipRange {
        self.clip
    }

    /// Crops, resizes, and normalizes a frame to `[-0.5, 0.5]`.
    ///
    /// Samples are clamped to the configured clip range after resizing, and
    /// non-finite samples are read as the far limit. The result is also kept
    /// as the [`preview`](Self::preview).
    ///
    /// # Errors
    ///
    /// - [`DepthError::InvalidClip`] when the configured range is unusable
    /// - [`DepthError::EmptyCrop`] when the margins consume the frame
    pub fn process(&mut self, frame: &DepthFrame) -> Result<Vec<f32>> {
        let clip = self.clip;
        check_clip(clip)?;
        let (cropped, width, height) = crop(frame, self.crop, clip.max)?;
        let resized =
            resize_bilinear(&cropped, width, height, self.resize.width, self.resize.height);
        let normalized: Vec<f32> = resized.into_iter().map(|d| normalize(d, clip)).collect();
        self.last = Some(DepthPreview {
            width: self.resize.width,
            height: self.resize.height,
            data: normalized.clone(),
        });
        Ok(normalized)
    }

    /// Last processed buffer, if any.
    #[must_use]
    pub const fn preview(&self) -> Option<&DepthPreview> {
        self.last.as_ref()
    }

    /// Drops the cached preview.
    pub fn clear_preview(&mut self) {
        self.last = None;
    }
}

fn crop(frame: &DepthFrame, margins: CropMargins, far: f32) -> Result<(Vec<f32>, usize, usize)> {
    let width = frame
        .width()
        .saturating_sub(margins.left)
        .saturating_sub(margins.right);
    let height = frame
        .height()
        .saturating_sub(margins.top)
        .saturating_sub(margins.bottom);
    if width == 0 || height == 0 {
        return Err(DepthError::EmptyCrop { width, height });
    }

    let src = frame.depths();
    let mut out = Vec::with_capacity(width * height);
    for y in 0..height {
        let row = (y + margins.top) * frame.width() + margins.left;
        out.extend(
            src[row..row + width]
                .iter()
                .map(|&d| if d.is_finite() { d } else { far }),
        );
    }
    Ok((out, width, height))
}

/// Bilinear resize with half-pixel centers and edge-clamped sampling.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn resize_bilinear(
    input: &[f32],
    in_w: usize,
    in_h: usize,
    out_w: usize,
    out_h: usize,
) -> Vec<f32> {
    if in_w == out_w && in_h == out_h {
        return input.to_vec();
    }
    let scale_x = in_w as f32 / out_w as f32;
    let scale_y = in_h as f32 / out_h as f32;
    let max_x = (in_w - 1) as f32;
    let max_y = (in_h - 1) as f32;

    let mut output = Vec::with_capacity(out_w * out_h);
    for y in 0..out_h {
        let src_y = ((y as f32 + 0.5) * scale_y - 0.5).clamp(0.0, max_y);
        let y0 = src_y.floor() as usize;
        let y1 = (y0 + 1).min(in_h - 1);
        let wy = src_y - y0 as f32;
        for x in 0..out_w {
            let src_x = ((x as f32 + 0.5) * scale_x - 0.5).clamp(0.0, max_x);
            let x0 = src_x.floor() as usize;
            let x1 = (x0 + 1).min(in_w - 1);
            let wx = src_x - x0 as f32;

            let v00 = input[y0 * in_w + x0];
            let v10 = input[y0 * in_w + x1];
            let v01 = input[y1 * in_w + x0];
            let v11 = input[y1 * in_w + x1];
            let top = v00 * (1.0 - wx) + v10 * wx;
            let bottom = v01 * (1.0 - wx) + v11 * wx;
            output.push(top * (1.0 - wy) + bottom * wy);
        }
    }
    output
}

fn normalize(depth: f32, clip: ClipRange) -> f32 {
    (depth.clamp(clip.min, clip.max) - clip.min) / (clip.max - clip.min) - 0.5
}
