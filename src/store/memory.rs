//! In-memory ciphertext store

use std::collections::HashMap;
use std::sync::Mutex;

use futures::future::BoxFuture;

use crate::error::{LedgerError, LedgerResult};

use super::{content_cid, CipherStore};

/// Ciphertext store backed by a process-local map.
///
/// Used by tests and by embeddings that manage persistence themselves.
#[derive(Debug, Default)]
pub struct MemoryStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blobs
    pub fn len(&self) -> usize {
        self.blobs.lock().expect("store mutex poisoned").len()
    }

    /// True when nothing has been stored
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CipherStore for MemoryStore {
    fn fetch<'a>(&'a self, cid: &'a str) -> BoxFuture<'a, LedgerResult<Vec<u8>>> {
        Box::pin(async move {
            self.blobs
                .lock()
                .expect("store mutex poisoned")
                .get(cid)
                .cloned()
                .ok_or_else(|| LedgerError::Storage(format!("blob not found: {}", cid)))
        })
    }

    fn store<'a>(&'a self, data: &'a [u8]) -> BoxFuture<'a, LedgerResult<String>> {
        Box::pin(async move {
            let cid = content_cid(data);
            self.blobs
                .lock()
                .expect("store mutex poisoned")
                .insert(cid.clone(), data.to_vec());
            Ok(cid)
        })
    }
}
