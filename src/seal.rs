//! Expense sealing
//!
//! The encryption-side counterpart of the decrypt orchestrator: runs the
//! SDK's encrypt capability, tames its version-dependent result shape
//! through the envelope module, and emits the storage record the store and
//! the decrypt pipeline agree on. When no encrypt capability is available
//! the expense is stored in the plaintext legacy format instead — degraded
//! but recoverable, exactly the records the decrypt ladder's lower tiers
//! exist for.

use std::sync::Arc;

use serde_json::{json, Value};
use sha3::{Digest, Keccak256};
use tracing::{debug, warn};

use crate::envelope::{CanonicalCipher, Normalizer};
use crate::error::{LedgerError, LedgerResult};
use crate::models::ExpensePayload;
use crate::sdk::{ContractContext, SdkRegistry};

/// A sealed expense ready for storage
#[derive(Debug, Clone)]
pub struct SealedExpense {
    /// The storage blob (JSON record, UTF-8)
    pub blob: Vec<u8>,
    /// Keccak-256 hash of the blob, 0x-prefixed hex
    pub preview_hash: String,
    /// Whether the amount was actually encrypted, as opposed to the
    /// plaintext legacy fallback
    pub encrypted: bool,
}

/// Seals expenses into storage blobs.
pub struct Sealer {
    normalizer: Normalizer,
    sdk: Arc<SdkRegistry>,
}

impl Sealer {
    /// Create a sealer with the default normalizer
    pub fn new(sdk: Arc<SdkRegistry>) -> Self {
        Self::with_normalizer(sdk, Normalizer::default())
    }

    /// Create a sealer with a custom-configured normalizer
    pub fn with_normalizer(sdk: Arc<SdkRegistry>, normalizer: Normalizer) -> Self {
        Self { normalizer, sdk }
    }

    /// Seal an expense into a storage blob.
    ///
    /// The amount is floored to whole currency units for the SDK's integer
    /// encryption; the fractional part survives only in plaintext records.
    pub async fn seal(
        &self,
        payload: &ExpensePayload,
        ctx: &ContractContext,
    ) -> LedgerResult<SealedExpense> {
        if !payload.amount.is_finite() || payload.amount < 0.0 {
            return Err(LedgerError::Encryption(format!(
                "amount not encryptable: {}",
                payload.amount
            )));
        }
        let amount = payload.amount.floor() as u64;

        let raw = match self.encrypt_amount(amount, ctx).await {
            Some(raw) => raw,
            None => return Ok(plaintext_record(payload)),
        };

        let canonical = match self.normalizer.normalize(&crate::envelope::extract_candidate(&raw))
        {
            Ok(Some(canonical)) => canonical,
            Ok(None) => {
                warn!("encrypt result held no ciphertext, storing plaintext legacy record");
                return Ok(plaintext_record(payload));
            }
            Err(err) => {
                warn!(error = %err, "encrypt result unrecognizable, storing plaintext legacy record");
                return Ok(plaintext_record(payload));
            }
        };

        let mut envelope = serde_json::Map::new();
        envelope.insert("encrypted".to_string(), raw);
        match &canonical {
            CanonicalCipher::Bytes(bytes) => {
                envelope.insert("ciphertext".to_string(), json!(bytes));
                envelope.insert("data".to_string(), json!(bytes));
            }
            CanonicalCipher::Encoded(handle) => {
                envelope.insert("ciphertext".to_string(), json!(handle));
            }
        }

        // Plaintext metadata travels beside the ciphertext; the amount
        // itself never does.
        let record = json!({
            "encryptedAmount": Value::Object(envelope),
            "metadata": {
                "currency": payload.currency,
                "category": payload.category,
                "note": payload.note,
                "timestamp": payload.timestamp,
            }
        });

        let blob = serde_json::to_vec(&record)?;
        let preview_hash = preview_hash(&blob);
        debug!(
            cipher_len = canonical.len(),
            blob_len = blob.len(),
            "expense sealed"
        );
        Ok(SealedExpense {
            blob,
            preview_hash,
            encrypted: true,
        })
    }

    /// Run the encrypt capability, returning `None` on any failure so the
    /// caller can fall back to the plaintext legacy format.
    async fn encrypt_amount(&self, amount: u64, ctx: &ContractContext) -> Option<Value> {
        let capabilities = match self.sdk.instance().await {
            Ok(capabilities) => capabilities,
            Err(err) => {
                warn!(error = %err, "sdk unavailable, storing plaintext legacy record");
                return None;
            }
        };
        let Some(strategy) = capabilities.encrypt.as_ref() else {
            warn!("sdk instance exposes no encrypt method, storing plaintext legacy record");
            return None;
        };
        match strategy.encrypt(amount, ctx).await {
            Ok(raw) => Some(raw),
            Err(err) => {
                warn!(error = %err, "encryption failed, storing plaintext legacy record");
                None
            }
        }
    }
}

/// Build the plaintext legacy record blob
fn plaintext_record(payload: &ExpensePayload) -> SealedExpense {
    let blob = serde_json::to_vec(payload).unwrap_or_default();
    let preview_hash = preview_hash(&blob);
    SealedExpense {
        blob,
        preview_hash,
        encrypted: false,
    }
}

/// Keccak-256 hash of a blob, 0x-prefixed hex
pub fn preview_hash(blob: &[u8]) -> String {
    let digest = Keccak256::digest(blob);
    format!("0x{}", hex::encode(digest))
}
