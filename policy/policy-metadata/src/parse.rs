//! Text encoding of metadata values.
//!
//! Lists are comma-separated. Entries are trimmed and empty entries dropped,
//! so `"a, b,,c "` reads as `["a", "b", "c"]`.

use tracing::warn;

/// Splits a comma-separated list.
#[must_use]
pub fn parse_csv(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

/// Splits a comma-separated numeric list; unparsable entries become `NaN`.
#[must_use]
pub fn parse_number_csv(value: &str) -> Vec<f32> {
    parse_csv(value)
        .iter()
        .map(|entry| entry.parse::<f32>().unwrap_or(f32::NAN))
        .collect()
}

/// Fits a raw numeric list to `len` entries.
///
/// A single value is broadcast when `broadcast` is set and more than one
/// entry is needed. Otherwise entries are taken positionally; missing or
/// non-finite entries take `fill` and extra entries are dropped. Any
/// adjustment is logged under `key`.
#[must_use]
pub fn fit_per_joint(key: &str, raw: &[f32], len: usize, fill: f32, broadcast: bool) -> Vec<f32> {
    if broadcast && raw.len() == 1 && len > 1 {
        let value = if raw[0].is_finite() { raw[0] } else { fill };
        return vec![value; len];
    }

    if raw.is_empty() {
        if len > 0 {
            warn!(key, fill, "policy metadata value absent, using default");
        }
    } else if raw.len() != len {
        warn!(
            key,
            expected = len,
            actual = raw.len(),
            "policy metadata length mismatch, padding with default"
        );
    }

    let out: Vec<f32> = (0..len)
        .map(|i| raw.get(i).copied().filter(|v| v.is_finite()).unwrap_or(fill))
        .collect();

    let non_finite = raw.iter().take(len).filter(|v| !v.is_finite()).count();
    if non_finite > 0 {
        warn!(key, count = non_finite, "non-numeric policy metadata entries replaced");
    }
    out
}
