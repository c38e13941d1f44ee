//! Decrypt orchestration
//!
//! Turns a stored ciphertext blob back into a fully-populated expense. The
//! SDK's output shape is unstable across versions and records from before
//! encryption still exist, so decryption is a ladder: true decryption is
//! preferred, but each rung that fails hands off to the next recovery
//! source instead of aborting.
//!
//! Tier order: parse the blob, locate and normalize the encrypted amount,
//! try the SDK's decryption strategies, then fall back through inline
//! metadata, the caller-supplied hint, and finally the oldest plaintext
//! record format. Only when every tier is exhausted does the caller see a
//! [`LedgerError::DecryptionFailed`] — never a fabricated or zero amount.

use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use tracing::{debug, warn};

use crate::envelope::{byte_array, extract_candidate, CanonicalCipher, Normalizer};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{ExpenseAggregate, ExpenseMetadata, ExpensePayload};
use crate::sdk::{ContractContext, SdkRegistry};

/// Runs the decryption ladder over stored ciphertext blobs.
pub struct DecryptOrchestrator {
    normalizer: Normalizer,
    sdk: Arc<SdkRegistry>,
}

impl DecryptOrchestrator {
    /// Create an orchestrator with the default normalizer
    pub fn new(sdk: Arc<SdkRegistry>) -> Self {
        Self::with_normalizer(sdk, Normalizer::default())
    }

    /// Create an orchestrator with a custom-configured normalizer
    pub fn with_normalizer(sdk: Arc<SdkRegistry>, normalizer: Normalizer) -> Self {
        Self { normalizer, sdk }
    }

    /// Decrypt a stored blob into an expense payload.
    ///
    /// `fallback` is an optional caller-supplied hint (typically the
    /// on-chain event data for the record) consulted after inline metadata
    /// when decryption proper is impossible.
    pub async fn decrypt(
        &self,
        blob: &[u8],
        ctx: &ContractContext,
        fallback: Option<&ExpenseMetadata>,
    ) -> LedgerResult<ExpensePayload> {
        let started = Instant::now();
        let record = match parse_record(blob) {
            Ok(record) => {
                trace_state("parse_blob", "ok", started);
                record
            }
            Err(message) => {
                trace_state("parse_blob", "error", started);
                // A blob this pipeline cannot parse can only be the oldest
                // plaintext format, or recovered from the caller's hint.
                if let Some(payload) = legacy_from_blob(blob) {
                    warn!("recovered unparseable record via legacy plaintext format");
                    trace_state("legacy_json_fallback", "ok", started);
                    return Ok(payload);
                }
                trace_state("legacy_json_fallback", "error", started);
                if let Some(payload) = hint_payload(fallback) {
                    warn!("recovered unparseable record via caller hint");
                    trace_state("caller_hint_fallback", "ok", started);
                    return Ok(payload);
                }
                return Err(LedgerError::DecryptionFailed(message));
            }
        };

        let mut last_error = String::from("no ciphertext present in record");

        let candidates = self.locate_candidates(&record, &mut last_error);

        if !candidates.is_empty() {
            match self.try_strategies(&candidates, ctx, &record).await {
                Ok(payload) => return Ok(payload),
                Err(message) => last_error = message,
            }
        }

        let tier_start = Instant::now();
        if let Some(payload) = record.metadata.as_ref().and_then(ExpenseMetadata::to_payload) {
            warn!("amount recovered from inline metadata, record was never decrypted");
            trace_state("metadata_fallback", "ok", tier_start);
            return Ok(payload);
        }
        trace_state("metadata_fallback", "unavailable", tier_start);

        let tier_start = Instant::now();
        if let Some(payload) = hint_payload(fallback) {
            warn!("amount recovered from caller hint");
            trace_state("caller_hint_fallback", "ok", tier_start);
            return Ok(payload);
        }
        trace_state("caller_hint_fallback", "unavailable", tier_start);

        let tier_start = Instant::now();
        if let Some(payload) = ExpensePayload::from_legacy_record(&record.extra) {
            warn!("record recovered via legacy plaintext format");
            trace_state("legacy_json_fallback", "ok", tier_start);
            return Ok(payload);
        }
        trace_state("legacy_json_fallback", "unavailable", tier_start);

        Err(LedgerError::DecryptionFailed(last_error))
    }

    /// Locate and normalize the encrypted-amount field into canonical
    /// decryption candidates. Failures are recorded, never propagated:
    /// normalization problems always defer to the fallback tiers.
    fn locate_candidates(
        &self,
        record: &ExpenseAggregate,
        last_error: &mut String,
    ) -> Vec<CanonicalCipher> {
        let tier_start = Instant::now();
        let Some(envelope) = record.encrypted_amount.as_ref() else {
            trace_state("locate_envelope", "absent", tier_start);
            return Vec::new();
        };

        // The oldest encrypted format stored the raw byte array directly;
        // it is already canonical.
        if let Some(bytes) = byte_array(envelope) {
            trace_state("locate_envelope", "byte_array", tier_start);
            return vec![CanonicalCipher::Bytes(bytes)];
        }

        let candidate = extract_candidate(envelope);
        trace_state("locate_envelope", "candidate", tier_start);

        let tier_start = Instant::now();
        match self.normalizer.normalize_many(&candidate) {
            Ok(set) => {
                let candidates = set.into_candidates();
                trace_state(
                    "normalize",
                    if candidates.is_empty() { "absent" } else { "ok" },
                    tier_start,
                );
                candidates
            }
            Err(err) => {
                warn!(error = %err, "normalization failed, deferring to fallback tiers");
                trace_state("normalize", "error", tier_start);
                *last_error = err.to_string();
                Vec::new()
            }
        }
    }

    /// Try each decryption strategy against each candidate, in order.
    ///
    /// Strategy errors are logged and skipped; the error message of the
    /// last failure is returned for the terminal diagnostic.
    async fn try_strategies(
        &self,
        candidates: &[CanonicalCipher],
        ctx: &ContractContext,
        record: &ExpenseAggregate,
    ) -> Result<ExpensePayload, String> {
        let tier_start = Instant::now();
        let capabilities = match self.sdk.instance().await {
            Ok(capabilities) => capabilities,
            Err(err) => {
                warn!(error = %err, "sdk instance unavailable, deferring to fallback tiers");
                trace_state("try_strategies", "sdk_unavailable", tier_start);
                return Err(err.to_string());
            }
        };

        if !capabilities.can_decrypt() {
            warn!("sdk instance exposes no decryption methods");
            trace_state("try_strategies", "no_methods", tier_start);
            return Err("no decryption methods available on sdk instance".to_string());
        }

        let mut last_error = String::from("all decryption strategies failed");
        for cipher in candidates {
            for strategy in capabilities.decrypt_strategies() {
                match strategy.decrypt(cipher, ctx).await {
                    Ok(value) => match value.as_amount() {
                        Ok(amount) => {
                            debug!(strategy = strategy.name(), amount, "decryption succeeded");
                            trace_state("try_strategies", "ok", tier_start);
                            return Ok(assemble(amount, record.metadata.as_ref()));
                        }
                        Err(err) => {
                            warn!(
                                strategy = strategy.name(),
                                error = %err,
                                "decrypted value could not be coerced to an amount"
                            );
                            last_error = err.to_string();
                        }
                    },
                    Err(err) => {
                        warn!(
                            strategy = strategy.name(),
                            error = %err,
                            "decryption strategy failed, trying next"
                        );
                        last_error = err.to_string();
                    }
                }
            }
        }
        trace_state("try_strategies", "exhausted", tier_start);
        Err(last_error)
    }
}

/// Assemble the final payload from a decrypted amount and the record's
/// plaintext metadata sibling.
fn assemble(amount: f64, metadata: Option<&ExpenseMetadata>) -> ExpensePayload {
    match metadata {
        Some(meta) => ExpensePayload::assemble(
            amount,
            meta.currency.clone(),
            meta.category.clone(),
            meta.note.clone(),
            meta.timestamp,
        ),
        None => ExpensePayload::assemble(amount, None, None, None, None),
    }
}

/// Decode and parse a blob into the stored record shape
fn parse_record(blob: &[u8]) -> Result<ExpenseAggregate, String> {
    let text = std::str::from_utf8(blob)
        .map_err(|err| format!("ciphertext blob is not UTF-8: {}", err))?;
    let value: Value = serde_json::from_str(text)
        .map_err(|err| format!("ciphertext blob is not valid JSON: {}", err))?;
    if !value.is_object() {
        return Err(format!(
            "ciphertext blob is not a record object: {}",
            crate::envelope::preview(&value)
        ));
    }
    serde_json::from_value(value).map_err(|err| format!("malformed record: {}", err))
}

/// Reinterpret a raw blob as the oldest plaintext record format
fn legacy_from_blob(blob: &[u8]) -> Option<ExpensePayload> {
    let text = std::str::from_utf8(blob).ok()?;
    let value: Value = serde_json::from_str(text).ok()?;
    match value {
        Value::Object(map) => ExpensePayload::from_legacy_record(&map),
        _ => None,
    }
}

/// Synthesize a payload from the caller hint, which must carry a positive
/// amount to be trusted
fn hint_payload(hint: Option<&ExpenseMetadata>) -> Option<ExpensePayload> {
    let hint = hint?;
    if !hint.has_positive_amount() {
        return None;
    }
    hint.to_payload()
}

/// One structured event per state transition
fn trace_state(state: &'static str, outcome: &str, started: Instant) {
    debug!(
        state,
        outcome,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "decrypt state transition"
    );
}
