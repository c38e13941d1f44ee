//! private-ledger - Client-side decryption pipeline for FHE-encrypted expenses
//!
//! This library is the core of an expense tracker whose amounts are
//! encrypted through an external FHE relayer SDK and stored as blobs in an
//! IPFS-style content store. The SDK's output shape is unstable across
//! versions and records from before encryption still exist, so the crate
//! centers on two operations:
//!
//! - [`envelope::Normalizer`]: total, synchronous reduction of any
//!   ciphertext-like value the SDK may hand back to a canonical form
//! - [`decrypt::DecryptOrchestrator`]: async multi-tier recovery that
//!   prefers true decryption and falls back through inline metadata, a
//!   caller hint, and the oldest plaintext format before giving up
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Expense payloads, metadata, and record receipts
//! - `envelope`: Ciphertext shape classification and normalization
//! - `sdk`: SDK capability model and instance registry
//! - `decrypt`: The decryption/recovery orchestrator
//! - `seal`: Encryption-result handling and storage-record assembly
//! - `aggregate`: Local decrypted totals
//! - `store`: Content-addressed ciphertext stores
//!
//! # Example
//!
//! ```rust,ignore
//! use private_ledger::decrypt::DecryptOrchestrator;
//! use private_ledger::sdk::{ContractContext, SdkRegistry};
//!
//! let orchestrator = DecryptOrchestrator::new(sdk_registry);
//! let expense = orchestrator
//!     .decrypt(&blob, &ContractContext::new(contract), None)
//!     .await?;
//! ```

pub mod aggregate;
pub mod cli;
pub mod config;
pub mod decrypt;
pub mod envelope;
pub mod error;
pub mod models;
pub mod sdk;
pub mod seal;
pub mod store;

pub use decrypt::DecryptOrchestrator;
pub use envelope::{CanonicalCipher, CipherSet, Normalizer};
pub use error::{LedgerError, LedgerResult};
pub use models::{ExpenseMetadata, ExpensePayload};
pub use sdk::{ContractContext, SdkCapabilities, SdkRegistry};
