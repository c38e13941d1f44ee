//! Expense payload and record shapes
//!
//! The canonical decrypted expense, the inline plaintext metadata legacy and
//! degraded-encryption records carry, and the stored aggregate record a
//! ciphertext blob deserializes into.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Currency used when a record does not state one
pub const DEFAULT_CURRENCY: &str = "USD";

/// Category used when a record does not state one
pub const DEFAULT_CATEGORY: &str = "misc";

/// A fully-populated expense as returned to callers.
///
/// Every field is always present; values missing from the source record are
/// filled with [`DEFAULT_CURRENCY`], [`DEFAULT_CATEGORY`], or the current
/// time (milliseconds since the epoch).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpensePayload {
    /// Expense amount in currency units
    pub amount: f64,
    /// ISO currency code
    pub currency: String,
    /// Spending category
    pub category: String,
    /// Free-form note
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
}

impl ExpensePayload {
    /// Build a payload from an amount plus whatever fields the source carried
    pub fn assemble(
        amount: f64,
        currency: Option<String>,
        category: Option<String>,
        note: Option<String>,
        timestamp: Option<i64>,
    ) -> Self {
        Self {
            amount,
            currency: currency.unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            category: category.unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            note,
            timestamp: timestamp.unwrap_or_else(now_millis),
        }
    }

    /// Reinterpret a parsed record as the oldest plaintext format.
    ///
    /// Valid only when both an `amount` and a `category` are present at the
    /// top level; anything less is not recognizable as an expense.
    pub fn from_legacy_record(record: &serde_json::Map<String, Value>) -> Option<Self> {
        let amount = record.get("amount")?.as_f64()?;
        let category = record.get("category")?.as_str()?.to_string();
        Some(Self::assemble(
            amount,
            record
                .get("currency")
                .and_then(Value::as_str)
                .map(str::to_string),
            Some(category),
            record
                .get("note")
                .and_then(Value::as_str)
                .map(str::to_string),
            record.get("timestamp").and_then(Value::as_i64),
        ))
    }
}

/// Current time in milliseconds since the Unix epoch
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Plaintext expense fields carried alongside (or instead of) a ciphertext.
///
/// Historical records from before encryption, and records whose encryption
/// degraded, store their amount here. The same shape serves as the
/// caller-supplied fallback hint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpenseMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl ExpenseMetadata {
    /// Synthesize a payload when a plaintext amount is present
    pub fn to_payload(&self) -> Option<ExpensePayload> {
        let amount = self.amount?;
        Some(ExpensePayload::assemble(
            amount,
            self.currency.clone(),
            self.category.clone(),
            self.note.clone(),
            self.timestamp,
        ))
    }

    /// Whether this metadata can serve as a caller hint (positive amount)
    pub fn has_positive_amount(&self) -> bool {
        self.amount.is_some_and(|a| a > 0.0)
    }
}

/// The stored record a ciphertext blob deserializes into.
///
/// `encryptedAmount` holds the SDK-shaped envelope in whatever form it was
/// stored; unrecognized top-level fields are retained for the legacy
/// plaintext tier.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpenseAggregate {
    #[serde(
        default,
        rename = "encryptedAmount",
        skip_serializing_if = "Option::is_none"
    )]
    pub encrypted_amount: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ExpenseMetadata>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}
