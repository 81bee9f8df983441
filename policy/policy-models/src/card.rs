//! Policy metadata as artifact key/value entries.

use policy_metadata::{
    KEY_ACTION_SCALE, KEY_DEFAULT_JOINT_POS, KEY_JOINT_DAMPING, KEY_JOINT_NAMES,
    KEY_JOINT_STIFFNESS, KEY_OBSERVATION_NAMES, encode_model_metadata,
};
use policy_types::{MetadataMap, ObservationTerm, PolicyMetadata};

/// Encodes metadata as the comma-separated entries a policy artifact carries.
///
/// The result resolves back to the same [`PolicyMetadata`].
#[must_use]
pub fn policy_card(meta: &PolicyMetadata) -> MetadataMap {
    let numbers = |values: &[f32]| {
        values
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",")
    };
    let terms: Vec<&str> = meta
        .observation_terms()
        .iter()
        .map(ObservationTerm::as_str)
        .collect();

    [
        (KEY_JOINT_NAMES, meta.joint_names().join(",")),
        (KEY_OBSERVATION_NAMES, terms.join(",")),
        (KEY_ACTION_SCALE, numbers(meta.action_scale())),
        (KEY_DEFAULT_JOINT_POS, numbers(meta.default_joint_pos())),
        (KEY_JOINT_STIFFNESS, numbers(meta.stiffness())),
        (KEY_JOINT_DAMPING, numbers(meta.damping())),
    ]
    .into_iter()
    .map(|(key, value)| (key.to_string(), value))
    .collect()
}

/// Encodes metadata in the artifact's metadata field layout, keys sorted.
#[must_use]
pub fn policy_card_bytes(meta: &PolicyMetadata) -> Vec<u8> {
    let card = policy_card(meta);
    let mut entries: Vec<(&str, &str)> =
        card.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
    entries.sort_unstable();
    encode_model_metadata(&entries)
}
