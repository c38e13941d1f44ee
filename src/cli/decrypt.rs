//! Blob decryption command
//!
//! Runs the full recovery ladder over a stored blob, read from a file or
//! fetched by CID from the local ciphertext store. Without a linked SDK
//! only the fallback tiers can produce a value, which is exactly what this
//! command is for: recovering legacy and degraded records offline.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{LedgerPaths, Settings};
use crate::decrypt::DecryptOrchestrator;
use crate::error::{LedgerError, LedgerResult};
use crate::models::ExpenseMetadata;
use crate::sdk::SdkRegistry;
use crate::store::{fetch_with_timeout, DirStore};

use super::read_blob;

/// Caller-supplied hint flags
pub struct HintArgs {
    pub amount: Option<f64>,
    pub currency: Option<String>,
    pub category: Option<String>,
}

/// Handle `pledger decrypt`
pub async fn handle_decrypt_command(
    paths: &LedgerPaths,
    settings: &Settings,
    file: Option<&Path>,
    cid: Option<&str>,
    base64_encoded: bool,
    contract: Option<&str>,
    hint: HintArgs,
) -> LedgerResult<()> {
    let blob = match (file, cid) {
        (Some(file), None) => read_blob(file, base64_encoded)?,
        (None, Some(cid)) => {
            let store = DirStore::new(paths.cipher_dir())?;
            fetch_with_timeout(
                &store,
                cid,
                Duration::from_secs(settings.fetch_timeout_secs),
            )
            .await?
        }
        _ => {
            return Err(LedgerError::Config(
                "Provide either a blob file or --cid, not both".into(),
            ))
        }
    };
    let ctx = settings.contract_context(contract)?;

    let registry = Arc::new(SdkRegistry::detached());
    let orchestrator = DecryptOrchestrator::with_normalizer(registry, settings.normalizer());

    let fallback = hint.amount.map(|amount| ExpenseMetadata {
        amount: Some(amount),
        currency: hint.currency.clone(),
        category: hint.category.clone(),
        ..Default::default()
    });

    let payload = orchestrator.decrypt(&blob, &ctx, fallback.as_ref()).await?;
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}
