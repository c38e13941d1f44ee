//! Local aggregation over encrypted records
//!
//! Sums a set of stored blobs by decrypting each through the orchestrator.
//! Homomorphic aggregation on the coprocessor side belongs to the backend;
//! this is the client-side path used when a locally decryptable total is
//! wanted, and it tolerates individual records that cannot be recovered.

use tracing::warn;

use crate::decrypt::DecryptOrchestrator;
use crate::error::LedgerResult;
use crate::sdk::ContractContext;

/// Result of aggregating a set of records
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateOutcome {
    /// Sum of the recovered amounts
    pub total: f64,
    /// Number of records that contributed to the total
    pub count: usize,
    /// Number of records skipped because no tier could recover them
    pub skipped: usize,
}

/// Decrypt every blob and sum the amounts.
///
/// Records that fail every recovery tier are skipped with a warning and
/// counted in [`AggregateOutcome::skipped`]; they never contribute a zero
/// to the total.
pub async fn decrypted_total(
    orchestrator: &DecryptOrchestrator,
    blobs: &[Vec<u8>],
    ctx: &ContractContext,
) -> LedgerResult<AggregateOutcome> {
    let mut total = 0.0;
    let mut count = 0;
    let mut skipped = 0;

    for blob in blobs {
        match orchestrator.decrypt(blob, ctx, None).await {
            Ok(payload) => {
                total += payload.amount;
                count += 1;
            }
            Err(err) => {
                warn!(error = %err, "skipping undecryptable record in aggregate");
                skipped += 1;
            }
        }
    }

    Ok(AggregateOutcome {
        total,
        count,
        skipped,
    })
}
