//! Candidate extraction from rich SDK-native objects
//!
//! Newer SDK versions wrap the actual ciphertext in a result object carrying
//! handles, proofs, and bookkeeping fields alongside it. Extraction pulls
//! out the most decryptable representation before normalization runs,
//! preferring a hash/handle (what handle-addressed decryption endpoints
//! expect) over raw bytes when both are present.

use serde_json::Value;

/// Pull the best-effort ciphertext candidate out of a rich result object.
///
/// Unwraps an `encrypted` wrapper first, then prefers `hash`, `handle`,
/// `data`, and the first entry of `handles`, in that order. Values that are
/// not rich objects pass through unchanged; the normalizer's own envelope
/// field list handles plain `{ ciphertext: ... }` shapes.
pub fn extract_candidate(value: &Value) -> Value {
    let Value::Object(map) = value else {
        return value.clone();
    };

    if let Some(encrypted) = map.get("encrypted") {
        if !encrypted.is_null() {
            return extract_candidate(encrypted);
        }
    }

    for field in ["hash", "handle"] {
        if let Some(Value::String(s)) = map.get(field) {
            if !s.is_empty() {
                return Value::String(s.clone());
            }
        }
    }

    if let Some(data) = map.get("data") {
        if !data.is_null() {
            return data.clone();
        }
    }

    if let Some(Value::Array(handles)) = map.get("handles") {
        if let Some(first) = handles.first() {
            return first.clone();
        }
    }

    value.clone()
}

/// Interpret a value as the legacy plain byte-array format.
///
/// Returns the bytes when the value is a non-empty array of byte-valued
/// numbers — the oldest storage shape, already canonical and exempt from
/// normalization. Anything else returns `None` and goes through the full
/// pipeline.
pub fn byte_array(value: &Value) -> Option<Vec<u8>> {
    let Value::Array(items) = value else {
        return None;
    };
    if items.is_empty() {
        return None;
    }
    let mut bytes = Vec::with_capacity(items.len());
    for item in items {
        let n = item.as_f64()?;
        if n.fract() != 0.0 || !(0.0..=255.0).contains(&n) {
            return None;
        }
        bytes.push(n as u8);
    }
    Some(bytes)
}
