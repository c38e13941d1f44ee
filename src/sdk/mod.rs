//! External encryption SDK integration
//!
//! Capability-based model of the relayer SDK's unstable surface, plus the
//! process-scoped instance registry with single-flight initialization.

pub mod capabilities;
pub mod registry;

pub use capabilities::{
    ContractContext, DecryptStrategy, EncryptStrategy, SdkCapabilities, SdkFuture, SdkNumeric,
};
pub use registry::{SdkInitFuture, SdkRegistry};
