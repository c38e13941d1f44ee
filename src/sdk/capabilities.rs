//! SDK capability model
//!
//! The relayer SDK's surface is unstable: which decryption methods exist
//! depends on the SDK version actually loaded. Rather than probing for
//! methods at each call site, an instance is described once as a set of
//! optional strategies, and callers iterate the ones that exist in a fixed
//! order.

use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::Value;

use crate::envelope::CanonicalCipher;
use crate::error::{LedgerError, LedgerResult};

/// Addresses scoping an encrypt or decrypt call.
///
/// Both are opaque configuration strings supplied by the attestation layer;
/// this crate never interprets them.
#[derive(Debug, Clone)]
pub struct ContractContext {
    /// Address of the contract the ciphertexts are bound to
    pub contract_address: String,
    /// Address of the user performing the operation, when known
    pub user_address: Option<String>,
}

impl ContractContext {
    /// Create a context scoped to a contract
    pub fn new(contract_address: impl Into<String>) -> Self {
        Self {
            contract_address: contract_address.into(),
            user_address: None,
        }
    }

    /// Attach the user address
    pub fn with_user(mut self, user_address: impl Into<String>) -> Self {
        self.user_address = Some(user_address.into());
        self
    }
}

/// A numeric value as returned by an SDK decryption method.
///
/// Different SDK versions return plain integers, big integers, floats,
/// numeric strings, or a single-element list; all are coerced through
/// [`SdkNumeric::as_amount`].
#[derive(Debug, Clone, PartialEq)]
pub enum SdkNumeric {
    Uint(u64),
    Big(u128),
    Float(f64),
    Text(String),
    Many(Vec<SdkNumeric>),
}

impl SdkNumeric {
    /// Coerce to an expense amount.
    ///
    /// Fails on non-numeric strings, non-finite floats, and empty lists;
    /// a list is coerced through its first element.
    pub fn as_amount(&self) -> LedgerResult<f64> {
        match self {
            Self::Uint(n) => Ok(*n as f64),
            Self::Big(n) => Ok(*n as f64),
            Self::Float(f) => {
                if f.is_finite() {
                    Ok(*f)
                } else {
                    Err(LedgerError::DecryptionFailed(format!(
                        "non-finite decrypted value: {}",
                        f
                    )))
                }
            }
            Self::Text(s) => s.trim().parse::<f64>().map_err(|_| {
                LedgerError::DecryptionFailed(format!(
                    "decrypted value is not numeric: {:?}",
                    s
                ))
            }),
            Self::Many(values) => match values.first() {
                Some(first) => first.as_amount(),
                None => Err(LedgerError::DecryptionFailed(
                    "decryption returned an empty result list".into(),
                )),
            },
        }
    }
}

/// Future type returned by strategy calls
pub type SdkFuture<'a, T> = BoxFuture<'a, LedgerResult<T>>;

/// One decryption method exposed by the SDK instance
pub trait DecryptStrategy: Send + Sync {
    /// Strategy name, used in structured log events
    fn name(&self) -> &'static str;

    /// Decrypt a canonical cipher in the given contract scope
    fn decrypt<'a>(
        &'a self,
        cipher: &'a CanonicalCipher,
        ctx: &'a ContractContext,
    ) -> SdkFuture<'a, SdkNumeric>;
}

/// The encryption method exposed by the SDK instance
pub trait EncryptStrategy: Send + Sync {
    /// Strategy name, used in structured log events
    fn name(&self) -> &'static str;

    /// Encrypt an amount, returning the SDK's result object as-is.
    ///
    /// The result shape is version-dependent; callers normalize it through
    /// the envelope module.
    fn encrypt<'a>(&'a self, amount: u64, ctx: &'a ContractContext) -> SdkFuture<'a, Value>;
}

/// The set of methods feature-detected on an SDK instance.
///
/// Absent methods stay `None` and are skipped; availability is never
/// assumed.
#[derive(Clone, Default)]
pub struct SdkCapabilities {
    /// User-scoped decryption, which may carry attestation data
    pub user_decrypt: Option<Arc<dyn DecryptStrategy>>,
    /// Public decryption of publicly-decryptable handles
    pub public_decrypt: Option<Arc<dyn DecryptStrategy>>,
    /// Amount encryption
    pub encrypt: Option<Arc<dyn EncryptStrategy>>,
}

impl SdkCapabilities {
    /// Decryption strategies in attempt order: user-scoped first, then public
    pub fn decrypt_strategies(&self) -> impl Iterator<Item = &dyn DecryptStrategy> {
        self.user_decrypt
            .as_deref()
            .into_iter()
            .chain(self.public_decrypt.as_deref())
    }

    /// Whether any decryption method exists
    pub fn can_decrypt(&self) -> bool {
        self.user_decrypt.is_some() || self.public_decrypt.is_some()
    }
}

impl std::fmt::Debug for SdkCapabilities {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SdkCapabilities")
            .field("user_decrypt", &self.user_decrypt.is_some())
            .field("public_decrypt", &self.public_decrypt.is_some())
            .field("encrypt", &self.encrypt.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uint_coercion() {
        assert_eq!(SdkNumeric::Uint(99).as_amount().unwrap(), 99.0);
    }

    #[test]
    fn test_big_coercion() {
        assert_eq!(SdkNumeric::Big(1_000_000).as_amount().unwrap(), 1_000_000.0);
    }

    #[test]
    fn test_text_coercion() {
        assert_eq!(SdkNumeric::Text(" 42.5 ".into()).as_amount().unwrap(), 42.5);
        assert!(SdkNumeric::Text("not-a-number".into()).as_amount().is_err());
    }

    #[test]
    fn test_list_coerces_first_element() {
        let many = SdkNumeric::Many(vec![SdkNumeric::Uint(7), SdkNumeric::Uint(8)]);
        assert_eq!(many.as_amount().unwrap(), 7.0);
        assert!(SdkNumeric::Many(vec![]).as_amount().is_err());
    }

    #[test]
    fn test_non_finite_float_rejected() {
        assert!(SdkNumeric::Float(f64::NAN).as_amount().is_err());
        assert_eq!(SdkNumeric::Float(3.5).as_amount().unwrap(), 3.5);
    }

    #[test]
    fn test_empty_capabilities() {
        let caps = SdkCapabilities::default();
        assert!(!caps.can_decrypt());
        assert_eq!(caps.decrypt_strategies().count(), 0);
    }
}
