//! Blob inspection command
//!
//! Parses a stored blob, classifies its encrypted-amount envelope, and
//! reports the canonical form without touching the SDK. The offline first
//! stop when a record refuses to decrypt.

use std::path::Path;

use crate::config::Settings;
use crate::envelope::{byte_array, extract_candidate, preview, CanonicalCipher, CipherSet};
use crate::error::{LedgerError, LedgerResult};
use crate::models::ExpenseAggregate;

use super::read_blob;

/// Handle `pledger inspect`
pub fn handle_inspect_command(
    settings: &Settings,
    file: &Path,
    base64_encoded: bool,
) -> LedgerResult<()> {
    let blob = read_blob(file, base64_encoded)?;

    let text = match std::str::from_utf8(&blob) {
        Ok(text) => text,
        Err(_) => {
            println!("Blob is not UTF-8 ({} bytes); not a record this pipeline can inspect.", blob.len());
            return Ok(());
        }
    };

    let value: serde_json::Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(err) => {
            println!("Blob is not valid JSON: {}", err);
            return Ok(());
        }
    };

    println!("Record: {}", preview(&value));

    let record: ExpenseAggregate = serde_json::from_value(value)
        .map_err(|e| LedgerError::Json(format!("Malformed record: {}", e)))?;

    if let Some(meta) = &record.metadata {
        match meta.amount {
            Some(amount) => println!("Metadata: plaintext amount {} present", amount),
            None => println!("Metadata: present, no plaintext amount"),
        }
    } else {
        println!("Metadata: none");
    }

    let Some(envelope) = &record.encrypted_amount else {
        println!("Encrypted amount: absent");
        return Ok(());
    };

    if let Some(bytes) = byte_array(envelope) {
        println!("Encrypted amount: legacy byte array ({} bytes)", bytes.len());
        return Ok(());
    }

    let candidate = extract_candidate(envelope);
    match settings.normalizer().normalize_many(&candidate) {
        Ok(CipherSet::None) => println!("Encrypted amount: no usable ciphertext (legacy data)"),
        Ok(CipherSet::One(cipher)) => print_cipher("Encrypted amount", &cipher),
        Ok(CipherSet::Many(ciphers)) => {
            println!("Encrypted amount: {} candidates", ciphers.len());
            for cipher in &ciphers {
                print_cipher("  candidate", cipher);
            }
        }
        Err(err) => println!("Encrypted amount: {}", err),
    }

    Ok(())
}

fn print_cipher(label: &str, cipher: &CanonicalCipher) {
    match cipher {
        CanonicalCipher::Bytes(bytes) => {
            println!("{}: {} ciphertext bytes, handle {}", label, bytes.len(), short(&cipher.handle()))
        }
        CanonicalCipher::Encoded(s) => {
            println!("{}: encoded handle {}", label, short(s))
        }
    }
}

fn short(s: &str) -> String {
    if s.len() <= 18 {
        s.to_string()
    } else {
        format!("{}…", &s[..18])
    }
}
