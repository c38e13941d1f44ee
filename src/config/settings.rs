//! User settings for private-ledger
//!
//! Relayer endpoint, contract scoping, and the tunables of the decryption
//! pipeline, persisted as JSON next to the local ciphertext directory.

use serde::{Deserialize, Serialize};

use crate::envelope::{Normalizer, DEFAULT_MIN_CIPHER_BYTES};
use crate::error::LedgerError;
use crate::sdk::ContractContext;

use super::paths::LedgerPaths;

/// User settings for private-ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Relayer endpoint URL
    #[serde(default = "default_relayer_url")]
    pub relayer_url: String,

    /// Address of the expense contract, when configured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_address: Option<String>,

    /// Host chain id
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,

    /// Gateway chain id
    #[serde(default = "default_gateway_chain_id")]
    pub gateway_chain_id: u64,

    /// Minimum numeric-array length treated as ciphertext bytes.
    ///
    /// Shorter numeric arrays are classified as legacy plain-number data.
    /// A heuristic calibrated on observed records, not a format guarantee.
    #[serde(default = "default_min_cipher_bytes")]
    pub min_cipher_bytes: usize,

    /// Ciphertext fetch deadline in seconds
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
}

fn default_schema_version() -> u32 {
    1
}

fn default_relayer_url() -> String {
    "https://relayer.testnet.zama.org".to_string()
}

fn default_chain_id() -> u64 {
    11_155_111 // Sepolia
}

fn default_gateway_chain_id() -> u64 {
    55_815
}

fn default_min_cipher_bytes() -> usize {
    DEFAULT_MIN_CIPHER_BYTES
}

fn default_fetch_timeout_secs() -> u64 {
    30
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            relayer_url: default_relayer_url(),
            contract_address: None,
            chain_id: default_chain_id(),
            gateway_chain_id: default_gateway_chain_id(),
            min_cipher_bytes: default_min_cipher_bytes(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &LedgerPaths) -> Result<Self, LedgerError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path)
                .map_err(|e| LedgerError::Io(format!("Failed to read settings file: {}", e)))?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                LedgerError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &LedgerPaths) -> Result<(), LedgerError> {
        paths.ensure_directories()?;

        let settings_path = paths.settings_file();
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| LedgerError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(&settings_path, contents)
            .map_err(|e| LedgerError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }

    /// Build a normalizer from the configured cutoff
    pub fn normalizer(&self) -> Normalizer {
        Normalizer::new(self.min_cipher_bytes)
    }

    /// Build the contract context, preferring an explicit override
    pub fn contract_context(&self, override_address: Option<&str>) -> Result<ContractContext, LedgerError> {
        let address = override_address
            .map(str::to_string)
            .or_else(|| self.contract_address.clone())
            .ok_or_else(|| {
                LedgerError::Config(
                    "No contract address configured; set one in config.json or pass --contract"
                        .into(),
                )
            })?;
        Ok(ContractContext::new(address))
    }
}
