//! Ciphertext store interface
//!
//! Sealed blobs live in an IPFS-style content-addressed store. The decrypt
//! pipeline only ever consumes fetched bytes; storage management belongs to
//! the surrounding application. Two implementations ship here: an in-memory
//! store for tests and embedding, and a directory-backed store for the CLI.

pub mod dir;
pub mod memory;

use std::time::Duration;

use futures::future::BoxFuture;
use sha2::{Digest, Sha256};

use crate::error::{LedgerError, LedgerResult};

pub use dir::DirStore;
pub use memory::MemoryStore;

/// Content-addressed blob store
pub trait CipherStore: Send + Sync {
    /// Fetch a blob by content CID
    fn fetch<'a>(&'a self, cid: &'a str) -> BoxFuture<'a, LedgerResult<Vec<u8>>>;

    /// Store a blob, returning its content CID
    fn store<'a>(&'a self, data: &'a [u8]) -> BoxFuture<'a, LedgerResult<String>>;
}

/// Derive the content CID for a blob.
///
/// `Qm`-prefixed truncated SHA-256 hex: deterministic, collision-resistant
/// for this purpose, and shaped like the CIDs the gateway hands out.
pub fn content_cid(data: &[u8]) -> String {
    let digest = Sha256::digest(data);
    format!("Qm{}", &hex::encode(digest)[..44])
}

/// Fetch with a deadline.
///
/// Abandoning a slow gateway is the caller's only cancellation mechanism;
/// the decrypt pipeline itself never retries.
pub async fn fetch_with_timeout(
    store: &dyn CipherStore,
    cid: &str,
    timeout: Duration,
) -> LedgerResult<Vec<u8>> {
    match tokio::time::timeout(timeout, store.fetch(cid)).await {
        Ok(result) => result,
        Err(_) => Err(LedgerError::Storage(format!(
            "fetch timed out after {}ms: {}",
            timeout.as_millis(),
            cid
        ))),
    }
}
