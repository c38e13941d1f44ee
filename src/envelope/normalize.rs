//! Ciphertext normalization
//!
//! Reduces a classified [`CipherShape`] to one of the canonical forms a
//! decryption call accepts: a byte buffer, an opaque encoded string, or
//! nothing at all. Normalization is total — every input yields a canonical
//! form, an explicit absence, or a classified [`LedgerError::UnsupportedShape`]
//! failure. Absence is an expected outcome (the record predates encryption,
//! or the SDK stored nothing), not an error; callers fall back to inline
//! metadata when they see it.

use serde_json::Value;
use tracing::warn;

use crate::error::{LedgerError, LedgerResult};

use super::preview::preview;
use super::shape::CipherShape;

/// Default minimum length for a numeric array to count as ciphertext bytes.
///
/// Real ciphertexts in this domain are always hundreds of bytes long, while
/// pre-encryption records stored small arrays of plain numbers. The cutoff
/// is a heuristic calibrated on observed data, not a protocol guarantee,
/// and is configurable via [`Normalizer::new`].
pub const DEFAULT_MIN_CIPHER_BYTES: usize = 100;

/// A ciphertext reduced to a form a decryption strategy accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CanonicalCipher {
    /// Raw ciphertext bytes
    Bytes(Vec<u8>),
    /// An opaque encoded handle or ciphertext string, passed through unmodified
    Encoded(String),
}

impl CanonicalCipher {
    /// Render the cipher as a handle string.
    ///
    /// Byte ciphers are hex-encoded with a `0x` prefix; encoded strings are
    /// already handles and pass through. Decryption endpoints that address
    /// ciphertexts by handle consume this form.
    pub fn handle(&self) -> String {
        match self {
            Self::Bytes(bytes) => format!("0x{}", hex::encode(bytes)),
            Self::Encoded(s) => s.clone(),
        }
    }

    /// Length of the underlying representation
    pub fn len(&self) -> usize {
        match self {
            Self::Bytes(bytes) => bytes.len(),
            Self::Encoded(s) => s.len(),
        }
    }

    /// True when the underlying representation is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Result of normalizing a value that may hold several ciphertext candidates.
#[derive(Debug, Clone, PartialEq)]
pub enum CipherSet {
    /// No usable ciphertext present
    None,
    /// Exactly one candidate survived; it is unwrapped, never a one-element list
    One(CanonicalCipher),
    /// Several candidates survived, in input order
    Many(Vec<CanonicalCipher>),
}

impl CipherSet {
    /// True when no candidate survived
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Consume the set, yielding candidates in priority order
    pub fn into_candidates(self) -> Vec<CanonicalCipher> {
        match self {
            Self::None => Vec::new(),
            Self::One(cipher) => vec![cipher],
            Self::Many(ciphers) => ciphers,
        }
    }
}

/// Reduces arbitrarily-shaped ciphertext values to canonical form.
#[derive(Debug, Clone)]
pub struct Normalizer {
    min_cipher_bytes: usize,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_CIPHER_BYTES)
    }
}

impl Normalizer {
    /// Create a normalizer with a custom legacy-array cutoff
    pub fn new(min_cipher_bytes: usize) -> Self {
        Self { min_cipher_bytes }
    }

    /// The configured legacy-array cutoff
    pub fn min_cipher_bytes(&self) -> usize {
        self.min_cipher_bytes
    }

    /// Normalize a single ciphertext-like value.
    ///
    /// Returns `Ok(None)` when the value holds no ciphertext (null, empty,
    /// or legacy plain numbers) and `Err(UnsupportedShape)` when a keyed
    /// structure matches neither the envelope field list nor the numeric
    /// index pattern.
    pub fn normalize(&self, value: &Value) -> LedgerResult<Option<CanonicalCipher>> {
        self.normalize_shape(CipherShape::classify(value))
    }

    /// Normalize a classified shape. See [`Normalizer::normalize`].
    pub fn normalize_shape(&self, shape: CipherShape) -> LedgerResult<Option<CanonicalCipher>> {
        match shape {
            CipherShape::Absent => Ok(None),
            CipherShape::Legacy(value) => {
                warn!(value, "bare number in place of ciphertext, treating as legacy data");
                Ok(None)
            }
            CipherShape::Numbers(numbers) => Ok(self.bytes_from_numbers(&numbers)),
            CipherShape::List(items) => self.normalize_list_head(items),
            CipherShape::Text(s) => Ok(Some(CanonicalCipher::Encoded(s))),
            CipherShape::Wrapped { inner, .. } => self.normalize_shape(*inner),
            CipherShape::Indexed(values) => self.normalize_indexed(values),
            CipherShape::Opaque { preview } => {
                Err(LedgerError::unsupported_shape("object", preview))
            }
        }
    }

    /// Normalize a value that may carry several ciphertext candidates.
    ///
    /// Elements that fail to normalize are dropped with a logged preview
    /// rather than aborting the whole operation; a lone survivor is
    /// unwrapped directly.
    pub fn normalize_many(&self, value: &Value) -> LedgerResult<CipherSet> {
        let items = match value {
            Value::Array(items) => items,
            _ => {
                return Ok(match self.normalize(value)? {
                    Some(cipher) => CipherSet::One(cipher),
                    None => CipherSet::None,
                })
            }
        };

        if items.is_empty() {
            return Ok(CipherSet::None);
        }

        // An all-numeric array is a single ciphertext (or legacy data),
        // never a list of candidates.
        if items.iter().all(Value::is_number) {
            return Ok(match self.normalize(value)? {
                Some(cipher) => CipherSet::One(cipher),
                None => CipherSet::None,
            });
        }

        let mut kept = Vec::new();
        for item in items {
            match self.normalize(item) {
                Ok(Some(cipher)) => kept.push(cipher),
                Ok(None) => {}
                Err(err) => {
                    warn!(
                        candidate = %preview(item),
                        error = %err,
                        "dropping unnormalizable cipher candidate"
                    );
                }
            }
        }

        Ok(match kept.len() {
            0 => CipherSet::None,
            1 => CipherSet::One(kept.swap_remove(0)),
            _ => CipherSet::Many(kept),
        })
    }

    /// Apply the legacy-array heuristic to a plain numeric array.
    fn bytes_from_numbers(&self, numbers: &[f64]) -> Option<CanonicalCipher> {
        if numbers.len() < self.min_cipher_bytes {
            warn!(
                len = numbers.len(),
                cutoff = self.min_cipher_bytes,
                "numeric array below ciphertext cutoff, treating as legacy data"
            );
            return None;
        }
        match as_bytes(numbers) {
            Some(bytes) => Some(CanonicalCipher::Bytes(bytes)),
            None => {
                warn!(
                    len = numbers.len(),
                    "numeric array contains non-byte values, treating as legacy data"
                );
                None
            }
        }
    }

    /// A mixed list holds at most one usable ciphertext: the first element,
    /// when it is itself byte material or an envelope.
    fn normalize_list_head(
        &self,
        mut items: Vec<CipherShape>,
    ) -> LedgerResult<Option<CanonicalCipher>> {
        if items.is_empty() {
            return Ok(None);
        }
        let first = items.swap_remove(0);
        match first {
            CipherShape::Numbers(_)
            | CipherShape::Wrapped { .. }
            | CipherShape::Indexed(_)
            | CipherShape::List(_) => self.normalize_shape(first),
            other => Err(LedgerError::unsupported_shape("array", other.describe())),
        }
    }

    /// Reassemble a numeric-string-keyed map.
    ///
    /// A map whose values are all numbers is a serialized byte buffer (the
    /// shape the SDK produces when a `Uint8Array` crosses a JSON boundary)
    /// and converts directly — the legacy-array cutoff does not apply, since
    /// legacy plain-number records were never stored as indexed maps.
    fn normalize_indexed(
        &self,
        values: Vec<CipherShape>,
    ) -> LedgerResult<Option<CanonicalCipher>> {
        if values.iter().all(|v| matches!(v, CipherShape::Legacy(_))) {
            let numbers: Vec<f64> = values
                .iter()
                .filter_map(|v| match v {
                    CipherShape::Legacy(n) => Some(*n),
                    _ => None,
                })
                .collect();
            return match as_bytes(&numbers) {
                Some(bytes) => Ok(Some(CanonicalCipher::Bytes(bytes))),
                None => {
                    warn!(
                        len = numbers.len(),
                        "indexed map contains non-byte values, treating as legacy data"
                    );
                    Ok(None)
                }
            };
        }
        self.normalize_list_head(values)
    }
}

/// Convert numbers to bytes, failing on any fractional or out-of-range value
fn as_bytes(numbers: &[f64]) -> Option<Vec<u8>> {
    let mut bytes = Vec::with_capacity(numbers.len());
    for &n in numbers {
        if n.fract() != 0.0 || !(0.0..=255.0).contains(&n) {
            return None;
        }
        bytes.push(n as u8);
    }
    Some(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn normalizer() -> Normalizer {
        Normalizer::default()
    }

    #[test]
    fn test_null_and_empty_are_absent() {
        let n = normalizer();
        assert_eq!(n.normalize(&Value::Null).unwrap(), None);
        assert_eq!(n.normalize(&json!([])).unwrap(), None);
        assert_eq!(n.normalize(&json!({})).unwrap(), None);
        assert_eq!(n.normalize(&json!("")).unwrap(), None);
    }

    #[test]
    fn test_bare_number_is_absent() {
        assert_eq!(normalizer().normalize(&json!(42)).unwrap(), None);
    }

    #[test]
    fn test_small_numeric_array_is_legacy() {
        let small: Vec<u64> = (0..50).collect();
        assert_eq!(normalizer().normalize(&json!(small)).unwrap(), None);
    }

    #[test]
    fn test_large_numeric_array_is_bytes() {
        let large: Vec<u64> = (0..150).map(|i| i % 256).collect();
        let result = normalizer().normalize(&json!(large.clone())).unwrap();
        let expected: Vec<u8> = large.iter().map(|&b| b as u8).collect();
        assert_eq!(result, Some(CanonicalCipher::Bytes(expected)));
    }

    #[test]
    fn test_large_array_with_non_byte_values_is_legacy() {
        let mut values: Vec<f64> = (0..150).map(|i| (i % 256) as f64).collect();
        values[7] = 300.5;
        assert_eq!(normalizer().normalize(&json!(values)).unwrap(), None);
    }

    #[test]
    fn test_cutoff_is_configurable() {
        let n = Normalizer::new(4);
        let result = n.normalize(&json!([1, 2, 3, 4])).unwrap();
        assert_eq!(result, Some(CanonicalCipher::Bytes(vec![1, 2, 3, 4])));
        assert_eq!(n.normalize(&json!([1, 2, 3])).unwrap(), None);
    }

    #[test]
    fn test_non_empty_string_is_encoded() {
        let result = normalizer().normalize(&json!("0xdeadbeef")).unwrap();
        assert_eq!(result, Some(CanonicalCipher::Encoded("0xdeadbeef".into())));
    }

    #[test]
    fn test_envelope_field_unwrapped() {
        let n = Normalizer::new(4);
        let result = n
            .normalize(&json!({ "ciphertext": [9, 8, 7, 6] }))
            .unwrap();
        assert_eq!(result, Some(CanonicalCipher::Bytes(vec![9, 8, 7, 6])));
    }

    #[test]
    fn test_nested_envelope_unwrapped_recursively() {
        let result = normalizer()
            .normalize(&json!({ "data": { "ct": "0xabcdef" } }))
            .unwrap();
        assert_eq!(result, Some(CanonicalCipher::Encoded("0xabcdef".into())));
    }

    #[test]
    fn test_sparse_indexed_map_restores_key_order() {
        let result = normalizer()
            .normalize(&json!({ "2": 30, "0": 10, "1": 20 }))
            .unwrap();
        assert_eq!(result, Some(CanonicalCipher::Bytes(vec![10, 20, 30])));
    }

    #[test]
    fn test_unrecognized_object_fails_classified() {
        let err = normalizer()
            .normalize(&json!({ "inputProof": "0x", "attestation": [] }))
            .unwrap_err();
        assert!(err.is_unsupported_shape());
    }

    #[test]
    fn test_normalize_is_total_over_representative_inputs() {
        let n = normalizer();
        let inputs = vec![
            Value::Null,
            json!(7),
            json!([]),
            json!((0..50).collect::<Vec<u64>>()),
            json!((0..150).map(|i| i % 256).collect::<Vec<u64>>()),
            json!({ "ciphertext": "0xab" }),
            json!({ "0": 1, "1": 2 }),
            json!({ "mystery": true }),
            json!("deadbeef"),
        ];
        for input in inputs {
            match n.normalize(&input) {
                Ok(_) => {}
                Err(err) => assert!(err.is_unsupported_shape(), "unclassified error for {input}"),
            }
        }
    }

    #[test]
    fn test_idempotent_on_canonical_bytes() {
        let n = Normalizer::new(4);
        let first = n.normalize(&json!([5, 6, 7, 8])).unwrap();
        let Some(CanonicalCipher::Bytes(bytes)) = first else {
            panic!("expected bytes");
        };
        let again = n.normalize(&json!(bytes.clone())).unwrap();
        assert_eq!(again, Some(CanonicalCipher::Bytes(bytes)));
    }

    #[test]
    fn test_list_head_numbers_normalized() {
        let n = Normalizer::new(4);
        // first element is byte material, trailing envelope is ignored
        let result = n
            .normalize(&json!([[1, 2, 3, 4], { "ct": "0xff" }]))
            .unwrap();
        assert_eq!(result, Some(CanonicalCipher::Bytes(vec![1, 2, 3, 4])));
    }

    #[test]
    fn test_handle_rendering() {
        assert_eq!(
            CanonicalCipher::Bytes(vec![0xde, 0xad]).handle(),
            "0xdead"
        );
        assert_eq!(
            CanonicalCipher::Encoded("0xbeef".into()).handle(),
            "0xbeef"
        );
    }

    mod many {
        use super::*;

        #[test]
        fn test_empty_list_is_none() {
            assert_eq!(
                normalizer().normalize_many(&json!([])).unwrap(),
                CipherSet::None
            );
        }

        #[test]
        fn test_numeric_list_uses_array_heuristic() {
            let n = normalizer();
            let small: Vec<u64> = (0..10).collect();
            assert_eq!(n.normalize_many(&json!(small)).unwrap(), CipherSet::None);

            let large: Vec<u64> = (0..200).map(|i| i % 256).collect();
            match n.normalize_many(&json!(large)).unwrap() {
                CipherSet::One(CanonicalCipher::Bytes(bytes)) => assert_eq!(bytes.len(), 200),
                other => panic!("expected single byte cipher, got {:?}", other),
            }
        }

        #[test]
        fn test_single_survivor_unwrapped() {
            // one element fails classification, one normalizes to an encoded
            // string: the survivor is returned directly, not as a list
            let value = json!([{ "mystery": true }, "0xcafe"]);
            let result = normalizer().normalize_many(&value).unwrap();
            assert_eq!(
                result,
                CipherSet::One(CanonicalCipher::Encoded("0xcafe".into()))
            );
        }

        #[test]
        fn test_absent_elements_dropped() {
            let value = json!([null, "", "0xcafe"]);
            let result = normalizer().normalize_many(&value).unwrap();
            assert_eq!(
                result,
                CipherSet::One(CanonicalCipher::Encoded("0xcafe".into()))
            );
        }

        #[test]
        fn test_multiple_survivors_kept_in_order() {
            let n = Normalizer::new(2);
            let value = json!(["0xaa", { "ct": [1, 2, 3] }]);
            let result = n.normalize_many(&value).unwrap();
            assert_eq!(
                result,
                CipherSet::Many(vec![
                    CanonicalCipher::Encoded("0xaa".into()),
                    CanonicalCipher::Bytes(vec![1, 2, 3]),
                ])
            );
        }

        #[test]
        fn test_all_dropped_is_none() {
            let value = json!([{ "mystery": 1 }, null]);
            assert_eq!(
                normalizer().normalize_many(&value).unwrap(),
                CipherSet::None
            );
        }

        #[test]
        fn test_single_value_delegates() {
            let result = normalizer().normalize_many(&json!("0xbeef")).unwrap();
            assert_eq!(
                result,
                CipherSet::One(CanonicalCipher::Encoded("0xbeef".into()))
            );
        }
    }
}
