//! CLI command handlers
//!
//! This module contains the implementation of CLI commands, bridging clap
//! argument parsing with the decryption pipeline.

pub mod decrypt;
pub mod inspect;
pub mod seal;

pub use decrypt::handle_decrypt_command;
pub use inspect::handle_inspect_command;
pub use seal::handle_seal_command;

use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine};

use crate::error::{LedgerError, LedgerResult};

/// Read a blob file, optionally base64-encoded (the transport encoding
/// used when blobs travel through JSON APIs)
pub fn read_blob(path: &Path, base64_encoded: bool) -> LedgerResult<Vec<u8>> {
    let raw = std::fs::read(path)
        .map_err(|e| LedgerError::Io(format!("Failed to read {}: {}", path.display(), e)))?;

    if !base64_encoded {
        return Ok(raw);
    }

    let text = String::from_utf8(raw)
        .map_err(|e| LedgerError::Io(format!("Base64 blob is not text: {}", e)))?;
    STANDARD
        .decode(text.trim())
        .map_err(|e| LedgerError::Io(format!("Invalid base64 blob: {}", e)))
}
