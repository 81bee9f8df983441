//! Depth perception path for locomotion policies.
//!
//! Raw frames from a simulated depth camera become a fixed-size feature that
//! reaches the policy a fixed number of control ticks late:
//!
//! ```text
//! DepthFrame -> DepthPreprocessor -> depth backbone -> DepthLatentQueue -> policy
//! ```
//!
//! - [`DepthFrame`] - raw per-pixel distances with their clip range
//! - [`DepthPreprocessor`] - crop, bilinear resize, normalize to `[-0.5, 0.5]`
//! - [`DepthFeatureExtractor`] - runs the backbone, never fails the tick
//! - [`DepthLatentQueue`] - tick-counted delay
//!
//! # Layer 0 Crate
//!
//! No rendering or runtime dependencies. The backbone is any
//! [`policy_types::InferenceSession`].
//!
//! # Quality Standards
//!
//! - Zero clippy/doc warnings
//! - Zero `unwrap`/`expect` in library code

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod error;
mod extractor;
mod frame;
mod preprocess;
mod queue;

pub use error::{DepthError, Result};
pub use extractor::{DepthFeatureExtractor, flip_rows};
pub use frame::DepthFrame;
pub use preprocess::{DepthPreprocessor, DepthPreview, resize_bilinear};
pub use queue::DepthLatentQueue;
