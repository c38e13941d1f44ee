//! Shape classification for ciphertext-like values
//!
//! The external SDK returns encrypted amounts in half a dozen shapes
//! depending on its version and code path: raw byte arrays, hex/base64
//! strings, nested envelope objects, numeric-keyed maps standing in for
//! arrays, or (for pre-encryption records) bare numbers. Classification is
//! the single boundary where those shapes are inspected; everything
//! downstream pattern-matches on [`CipherShape`] instead of re-probing JSON.

use serde_json::Value;

use super::preview::preview;

/// Envelope field names recognized when unwrapping a keyed object, in
/// priority order. The single-letter `c` is checked last.
pub const ENVELOPE_FIELDS: [&str; 7] =
    ["ciphertext", "ct", "data", "bytes", "cipherText", "value", "c"];

/// Classified form of a ciphertext-like value.
#[derive(Debug, Clone, PartialEq)]
pub enum CipherShape {
    /// Null, or an empty string/array/object: no ciphertext present
    Absent,
    /// A bare number — pre-encryption legacy data, never a ciphertext
    Legacy(f64),
    /// An array whose elements are all plain numbers
    Numbers(Vec<f64>),
    /// An array of mixed or structured elements
    List(Vec<CipherShape>),
    /// A non-empty string (hex handle, base64, or otherwise encoded)
    Text(String),
    /// A keyed object unwrapped through a recognized envelope field
    Wrapped {
        field: &'static str,
        inner: Box<CipherShape>,
    },
    /// A numeric-string-keyed object reassembled in ascending key order
    Indexed(Vec<CipherShape>),
    /// A keyed object matching neither the field list nor the index pattern
    Opaque { preview: String },
}

impl CipherShape {
    /// Classify an arbitrary JSON value into a [`CipherShape`].
    ///
    /// Classification is total: every value maps to exactly one variant.
    /// Whether a shape is *usable* is decided later by the normalizer.
    pub fn classify(value: &Value) -> Self {
        match value {
            Value::Null => Self::Absent,
            Value::Number(n) => Self::Legacy(n.as_f64().unwrap_or(f64::NAN)),
            Value::String(s) => {
                if s.is_empty() {
                    Self::Absent
                } else {
                    Self::Text(s.clone())
                }
            }
            Value::Array(items) => {
                if items.is_empty() {
                    return Self::Absent;
                }
                if items.iter().all(Value::is_number) {
                    let numbers = items
                        .iter()
                        .filter_map(Value::as_f64)
                        .collect();
                    return Self::Numbers(numbers);
                }
                Self::List(items.iter().map(Self::classify).collect())
            }
            Value::Object(map) => {
                if map.is_empty() {
                    return Self::Absent;
                }
                for field in ENVELOPE_FIELDS {
                    if let Some(inner) = map.get(field) {
                        if !inner.is_null() {
                            return Self::Wrapped {
                                field,
                                inner: Box::new(Self::classify(inner)),
                            };
                        }
                    }
                }
                if let Some(ordered) = indexed_values(map) {
                    return Self::Indexed(ordered.iter().map(|v| Self::classify(v)).collect());
                }
                Self::Opaque {
                    preview: preview(value),
                }
            }
            Value::Bool(_) => Self::Opaque {
                preview: preview(value),
            },
        }
    }

    /// Short description of the variant, used in log lines and errors
    pub fn describe(&self) -> String {
        match self {
            Self::Absent => "absent".to_string(),
            Self::Legacy(n) => format!("bare number {}", n),
            Self::Numbers(ns) => format!("numeric array(len={})", ns.len()),
            Self::List(items) => format!("mixed array(len={})", items.len()),
            Self::Text(s) => format!("string(len={})", s.len()),
            Self::Wrapped { field, .. } => format!("envelope field '{}'", field),
            Self::Indexed(vals) => format!("indexed map(len={})", vals.len()),
            Self::Opaque { preview } => preview.clone(),
        }
    }
}

/// If every key of `map` is a non-negative integer string, return the values
/// sorted by ascending numeric key. Insertion order is irrelevant.
fn indexed_values(map: &serde_json::Map<String, Value>) -> Option<Vec<&Value>> {
    let mut entries: Vec<(usize, &Value)> = Vec::with_capacity(map.len());
    for (key, value) in map {
        let index: usize = key.parse().ok()?;
        entries.push((index, value));
    }
    entries.sort_by_key(|(index, _)| *index);
    Some(entries.into_iter().map(|(_, value)| value).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classify_null_and_empties() {
        assert_eq!(CipherShape::classify(&Value::Null), CipherShape::Absent);
        assert_eq!(CipherShape::classify(&json!([])), CipherShape::Absent);
        assert_eq!(CipherShape::classify(&json!({})), CipherShape::Absent);
        assert_eq!(CipherShape::classify(&json!("")), CipherShape::Absent);
    }

    #[test]
    fn test_classify_bare_number() {
        assert_eq!(CipherShape::classify(&json!(42.5)), CipherShape::Legacy(42.5));
    }

    #[test]
    fn test_classify_numeric_array() {
        let shape = CipherShape::classify(&json!([1, 2, 3]));
        assert_eq!(shape, CipherShape::Numbers(vec![1.0, 2.0, 3.0]));
    }

    #[test]
    fn test_classify_string() {
        let shape = CipherShape::classify(&json!("0xdeadbeef"));
        assert_eq!(shape, CipherShape::Text("0xdeadbeef".to_string()));
    }

    #[test]
    fn test_classify_envelope_field_priority() {
        // "ciphertext" outranks "data" regardless of key order
        let shape = CipherShape::classify(&json!({ "data": [1], "ciphertext": "0xab" }));
        match shape {
            CipherShape::Wrapped { field, inner } => {
                assert_eq!(field, "ciphertext");
                assert_eq!(*inner, CipherShape::Text("0xab".to_string()));
            }
            other => panic!("expected Wrapped, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_null_field_skipped() {
        // A null "ciphertext" must not shadow a usable "data" field
        let shape = CipherShape::classify(&json!({ "ciphertext": null, "data": "0xab" }));
        match shape {
            CipherShape::Wrapped { field, .. } => assert_eq!(field, "data"),
            other => panic!("expected Wrapped, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_indexed_map_sorted() {
        let shape = CipherShape::classify(&json!({ "2": 30, "0": 10, "1": 20 }));
        assert_eq!(
            shape,
            CipherShape::Indexed(vec![
                CipherShape::Legacy(10.0),
                CipherShape::Legacy(20.0),
                CipherShape::Legacy(30.0),
            ])
        );
    }

    #[test]
    fn test_classify_opaque_object() {
        let shape = CipherShape::classify(&json!({ "inputProof": "0x", "handles": [] }));
        assert!(matches!(shape, CipherShape::Opaque { .. }));
    }

    #[test]
    fn test_classify_bool_is_opaque() {
        assert!(matches!(
            CipherShape::classify(&json!(true)),
            CipherShape::Opaque { .. }
        ));
    }

    #[test]
    fn test_classify_mixed_list() {
        let shape = CipherShape::classify(&json!([{ "ct": "0xab" }, 5]));
        match shape {
            CipherShape::List(items) => {
                assert_eq!(items.len(), 2);
                assert!(matches!(items[0], CipherShape::Wrapped { .. }));
                assert_eq!(items[1], CipherShape::Legacy(5.0));
            }
            other => panic!("expected List, got {:?}", other),
        }
    }
}
