//! Directory-backed ciphertext store
//!
//! One file per blob, named by content CID, written atomically (temp file
//! then rename) so a crash mid-write never leaves a corrupt blob behind.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use futures::future::BoxFuture;

use crate::error::{LedgerError, LedgerResult};

use super::{content_cid, CipherStore};

/// Ciphertext store backed by a directory of CID-named files
#[derive(Debug, Clone)]
pub struct DirStore {
    dir: PathBuf,
}

impl DirStore {
    /// Create a store rooted at `dir`, creating the directory if needed
    pub fn new(dir: impl Into<PathBuf>) -> LedgerResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| {
            LedgerError::Storage(format!(
                "Failed to create ciphertext directory {}: {}",
                dir.display(),
                e
            ))
        })?;
        Ok(Self { dir })
    }

    /// Path of the file holding `cid`
    pub fn blob_path(&self, cid: &str) -> PathBuf {
        self.dir.join(cid)
    }

    fn write_atomic(&self, path: &Path, data: &[u8]) -> LedgerResult<()> {
        let temp_path = path.with_extension("tmp");

        let mut file = File::create(&temp_path)
            .map_err(|e| LedgerError::Storage(format!("Failed to create temp file: {}", e)))?;
        file.write_all(data)
            .map_err(|e| LedgerError::Storage(format!("Failed to write blob: {}", e)))?;
        file.flush()
            .map_err(|e| LedgerError::Storage(format!("Failed to flush blob: {}", e)))?;
        file.sync_all()
            .map_err(|e| LedgerError::Storage(format!("Failed to sync blob: {}", e)))?;

        fs::rename(&temp_path, path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            LedgerError::Storage(format!("Failed to rename temp file: {}", e))
        })?;

        Ok(())
    }
}

impl CipherStore for DirStore {
    fn fetch<'a>(&'a self, cid: &'a str) -> BoxFuture<'a, LedgerResult<Vec<u8>>> {
        Box::pin(async move {
            let path = self.blob_path(cid);
            if !path.exists() {
                return Err(LedgerError::Storage(format!("blob not found: {}", cid)));
            }
            fs::read(&path).map_err(|e| {
                LedgerError::Storage(format!("Failed to read {}: {}", path.display(), e))
            })
        })
    }

    fn store<'a>(&'a self, data: &'a [u8]) -> BoxFuture<'a, LedgerResult<String>> {
        Box::pin(async move {
            let cid = content_cid(data);
            let path = self.blob_path(&cid);
            if !path.exists() {
                self.write_atomic(&path, data)?;
            }
            Ok(cid)
        })
    }
}
