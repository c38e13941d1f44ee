//! Custom error types for private-ledger
//!
//! This module defines the error hierarchy for the crate using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

/// The main error type for private-ledger operations
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// A ciphertext-like value matched none of the recognized shapes
    #[error("Unsupported cipher shape ({kind}): {preview}")]
    UnsupportedShape {
        kind: &'static str,
        preview: String,
    },

    /// The SDK instance could not be acquired or exposes no usable methods
    #[error("SDK unavailable: {0}")]
    SdkUnavailable(String),

    /// Every decryption strategy and every fallback tier was exhausted
    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    /// Encryption/sealing errors
    #[error("Encryption error: {0}")]
    Encryption(String),

    /// Ciphertext store errors
    #[error("Storage error: {0}")]
    Storage(String),
}

impl LedgerError {
    /// Create an "unsupported shape" error carrying a diagnostic preview
    pub fn unsupported_shape(kind: &'static str, preview: impl Into<String>) -> Self {
        Self::UnsupportedShape {
            kind,
            preview: preview.into(),
        }
    }

    /// Check if this is an "unsupported shape" error
    pub fn is_unsupported_shape(&self) -> bool {
        matches!(self, Self::UnsupportedShape { .. })
    }

    /// Check if this is a terminal decryption failure
    pub fn is_decryption_failed(&self) -> bool {
        matches!(self, Self::DecryptionFailed(_))
    }

    /// Check if this is an SDK availability error
    pub fn is_sdk_unavailable(&self) -> bool {
        matches!(self, Self::SdkUnavailable(_))
    }
}

// Implement From traits for common error types

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for private-ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
