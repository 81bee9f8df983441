//! Policy metadata resolution for CortenForge policy bridges.
//!
//! Exported locomotion policies carry their configuration as key/value text
//! inside the model artifact: joint names, the observation schema, action
//! scale, default pose, and PD gains. This crate reads that configuration.
//!
//! # Strategies
//!
//! - **Structured**: the inference runtime exposes the key/value map directly.
//! - **Raw scan**: the artifact bytes are walked field by field
//!   ([`scan_model_metadata`]) when the runtime cannot expose the map.
//!
//! [`MetadataResolver::probe`] picks the strategy; both produce the same
//! [`PolicyMetadata`](policy_types::PolicyMetadata).
//!
//! # Failure Policy
//!
//! Missing `joint_names` / `observation_names`, an unknown observation token,
//! or an artifact that cannot be walked are fatal. Optional numeric keys fall
//! back to defaults with a warning.

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod error;
mod parse;
mod resolver;
mod wire;

pub use error::{MetadataError, Result};
pub use parse::{fit_per_joint, parse_csv, parse_number_csv};
pub use resolver::{
    KEY_ACTION_SCALE, KEY_DEFAULT_JOINT_POS, KEY_JOINT_DAMPING, KEY_JOINT_NAMES,
    KEY_JOINT_STIFFNESS, KEY_OBSERVATION_NAMES, MetadataResolver, MetadataStrategy,
    metadata_from_entries,
};
pub use wire::{
    FieldReader, FieldValue, MODEL_METADATA_FIELD, WireType, decode_entry, encode_bytes_field,
    encode_entry, encode_model_metadata, encode_tag, encode_varint, read_varint,
    scan_model_metadata,
};
