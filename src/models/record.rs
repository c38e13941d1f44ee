//! Sealed-record receipt
//!
//! After an expense is sealed and its blob stored, the caller gets back a
//! receipt tying the record identity to the content CID and preview hash.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::RecordId;

/// Receipt for a sealed and stored expense blob
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseRecord {
    /// Record identity
    pub id: RecordId,
    /// Content CID of the stored ciphertext blob
    pub cid: String,
    /// Keccak-256 preview hash of the blob (0x-prefixed hex)
    pub preview_hash: String,
    /// When the record was sealed
    pub created_at: DateTime<Utc>,
}

impl ExpenseRecord {
    /// Create a receipt for a freshly stored blob
    pub fn new(cid: impl Into<String>, preview_hash: impl Into<String>) -> Self {
        Self {
            id: RecordId::new(),
            cid: cid.into(),
            preview_hash: preview_hash.into(),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record() {
        let record = ExpenseRecord::new("QmAbc", "0x1234");
        assert_eq!(record.cid, "QmAbc");
        assert_eq!(record.preview_hash, "0x1234");
    }

    #[test]
    fn test_serde_round_trip() {
        let record = ExpenseRecord::new("QmAbc", "0x1234");
        let json = serde_json::to_string(&record).unwrap();
        let back: ExpenseRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record.id, back.id);
        assert_eq!(record.cid, back.cid);
    }
}
