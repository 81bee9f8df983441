//! Metadata resolution.
//!
//! Two strategies feed the same [`PolicyMetadata`]: the runtime's own
//! key/value access when it exposes one, and a raw scan of the artifact bytes
//! when it does not. The strategy is chosen by probing the session.

use policy_types::{InferenceSession, MetadataMap, ObservationTerm, PolicyMetadata};
use tracing::{info, warn};

use crate::error::{MetadataError, Result};
use crate::parse::{fit_per_joint, parse_csv, parse_number_csv};
use crate::wire::scan_model_metadata;

/// Required: joint names in action order.
pub const KEY_JOINT_NAMES: &str = "joint_names";
/// Required: observation tokens in buffer order.
pub const KEY_OBSERVATION_NAMES: &str = "observation_names";
/// Optional: per-joint or scalar action scale (default 1.0).
pub const KEY_ACTION_SCALE: &str = "action_scale";
/// Optional: default joint positions (default 0.0).
pub const KEY_DEFAULT_JOINT_POS: &str = "default_joint_pos";
/// Optional: proportional gains (default 0.0).
pub const KEY_JOINT_STIFFNESS: &str = "joint_stiffness";
/// Optional: derivative gains (default 0.0).
pub const KEY_JOINT_DAMPING: &str = "joint_damping";

/// Where metadata comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataStrategy<'a> {
    /// The runtime exposed a non-empty key/value map.
    Structured(MetadataMap),
    /// The artifact bytes will be scanned.
    RawScan(&'a [u8]),
    /// Neither source is available.
    Unavailable,
}

impl MetadataStrategy<'_> {
    /// Short name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Structured(_) => "structured",
            Self::RawScan(_) => "raw-scan",
            Self::Unavailable => "unavailable",
        }
    }

    /// Produces the key/value map.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError::MalformedWire`] when the raw scan fails.
    pub fn entries(self) -> Result<MetadataMap> {
        match self {
            Self::Structured(map) => Ok(map),
            Self::RawScan(bytes) => Ok(scan_model_metadata(bytes)?.into_iter().collect()),
            Self::Unavailable => Ok(MetadataMap::new()),
        }
    }
}

/// Resolves [`PolicyMetadata`] for a loaded policy.
///
/// # Example
///
/// ```
/// use policy_metadata::{MetadataResolver, encode_model_metadata};
///
/// let artifact = encode_model_metadata(&[
///     ("joint_names", "hip,knee"),
///     ("observation_names", "projected_gravity,joint_pos,actions"),
///     ("action_scale", "0.25"),
/// ]);
/// let meta = MetadataResolver::from_artifact(&artifact).resolve()?;
/// assert_eq!(meta.joint_count(), 2);
/// assert_eq!(meta.action_scale(), &[0.25, 0.25]);
/// # Ok::<(), policy_metadata::MetadataError>(())
/// ```
#[derive(Clone, Copy)]
pub struct MetadataResolver<'a> {
    session: Option<&'a dyn InferenceSession>,
    artifact: Option<&'a [u8]>,
}

impl std::fmt::Debug for MetadataResolver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataResolver")
            .field("session", &self.session.is_some())
            .field("artifact_len", &self.artifact.map(<[u8]>::len))
            .finish()
    }
}

impl<'a> MetadataResolver<'a> {
    /// Resolver over a session and, optionally, the bytes it was loaded from.
    #[must_use]
    pub const fn new(session: &'a dyn InferenceSession, artifact: Option<&'a [u8]>) -> Self {
        Self {
            session: Some(session),
            artifact,
        }
    }

    /// Resolver over artifact bytes alone.
    #[must_use]
    pub const fn from_artifact(artifact: &'a [u8]) -> Self {
        Self {
            session: None,
            artifact: Some(artifact),
        }
    }

    /// Picks the strategy: structured access when the runtime offers a
    /// non-empty map, otherwise a raw scan of the artifact.
    #[must_use]
    pub fn probe(&self) -> MetadataStrategy<'a> {
        if let Some(map) = self
            .session
            .and_then(|session| session.custom_metadata())
            .filter(|map| !map.is_empty())
        {
            return MetadataStrategy::Structured(map);
        }
        match self.artifact {
            Some(bytes) => {
                warn!("structured policy metadata unavailable, using artifact fallback parser");
                MetadataStrategy::RawScan(bytes)
            }
            None => MetadataStrategy::Unavailable,
        }
    }

    /// Resolves and validates the metadata.
    ///
    /// # Errors
    ///
    /// - [`MetadataError::MalformedWire`] if the artifact cannot be scanned
    /// - [`MetadataError::MissingKey`] if a required key is absent or empty
    /// - [`MetadataError::UnknownObservation`] for a token outside the vocabulary
    pub fn resolve(&self) -> Result<PolicyMetadata> {
        let strategy = self.probe();
        let name = strategy.name();
        let entries = strategy.entries()?;
        if entries.is_empty() {
            warn!(strategy = name, "policy metadata could not be read");
        } else {
            let mut keys: Vec<&str> = entries.keys().map(String::as_str).collect();
            keys.sort_unstable();
            info!(strategy = name, ?keys, "policy metadata keys");
        }
        metadata_from_entries(&entries)
    }
}

/// Builds [`PolicyMetadata`] from raw key/value entries.
///
/// # Errors
///
/// See [`MetadataResolver::resolve`].
pub fn metadata_from_entries(entries: &MetadataMap) -> Result<PolicyMetadata> {
    let text = |key: &str| entries.get(key).map_or("", String::as_str);

    let joint_names = parse_csv(text(KEY_JOINT_NAMES));
    if joint_names.is_empty() {
        return Err(MetadataError::MissingKey(KEY_JOINT_NAMES));
    }

    let observation_names = parse_csv(text(KEY_OBSERVATION_NAMES));
    if observation_names.is_empty() {
        return Err(MetadataError::MissingKey(KEY_OBSERVATION_NAMES));
    }
    let observation_terms = observation_names
        .iter()
        .map(|token| token.parse::<ObservationTerm>())
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let n = joint_names.len();
    let numeric = |key: &str, fill: f32, broadcast: bool| {
        fit_per_joint(key, &parse_number_csv(text(key)), n, fill, broadcast)
    };
    let action_scale = numeric(KEY_ACTION_SCALE, 1.0, true);
    let default_joint_pos = numeric(KEY_DEFAULT_JOINT_POS, 0.0, false);
    let stiffness = numeric(KEY_JOINT_STIFFNESS, 0.0, false);
    let damping = numeric(KEY_JOINT_DAMPING, 0.0, false);

    info!(joints = ?joint_names, "policy joint names");

    Ok(PolicyMetadata::new(
        joint_names,
        observation_terms,
        action_scale,
        default_joint_pos,
        stiffness,
        damping,
    )?)
}
