//! Ciphertext envelope taming
//!
//! The external encryption SDK does not return ciphertexts in a stable
//! shape. This module owns the boundary where those values are classified,
//! unwrapped, and reduced to canonical form, and the diagnostic previews
//! used when they cannot be.

pub mod locate;
pub mod normalize;
pub mod preview;
pub mod shape;

pub use locate::{byte_array, extract_candidate};
pub use normalize::{
    CanonicalCipher, CipherSet, Normalizer, DEFAULT_MIN_CIPHER_BYTES,
};
pub use preview::preview;
pub use shape::{CipherShape, ENVELOPE_FIELDS};
