//! Expense sealing command
//!
//! Builds a payload from the command line, seals it (plaintext legacy
//! format when no SDK is linked), stores the blob in the local ciphertext
//! directory, and prints the record receipt.

use std::sync::Arc;

use crate::config::{LedgerPaths, Settings};
use crate::error::LedgerResult;
use crate::models::{ExpensePayload, ExpenseRecord};
use crate::seal::Sealer;
use crate::sdk::SdkRegistry;
use crate::store::{CipherStore, DirStore};

/// Handle `pledger seal`
pub async fn handle_seal_command(
    paths: &LedgerPaths,
    settings: &Settings,
    amount: f64,
    category: String,
    currency: Option<String>,
    note: Option<String>,
    contract: Option<&str>,
) -> LedgerResult<()> {
    let ctx = settings.contract_context(contract)?;
    let payload = ExpensePayload::assemble(amount, currency, Some(category), note, None);

    let registry = Arc::new(SdkRegistry::detached());
    let sealer = Sealer::with_normalizer(registry, settings.normalizer());
    let sealed = sealer.seal(&payload, &ctx).await?;

    if !sealed.encrypted {
        eprintln!("warning: no encryption SDK linked; record stored in plaintext legacy format");
    }

    let store = DirStore::new(paths.cipher_dir())?;
    let cid = store.store(&sealed.blob).await?;

    let record = ExpenseRecord::new(cid, sealed.preview_hash.clone());
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}
