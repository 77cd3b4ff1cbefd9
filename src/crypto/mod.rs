//! Cryptographic primitives for CredVault.
//!
//! This module provides:
//! - Argon2id password-based key derivation (`kdf`)
//! - AES-256-GCM encryption and decryption (`encryption`)
//! - The in-memory master key, per-record sub-keys and the password
//!   verifier (`keys`)
//!
//! Nothing here holds state or touches storage.

pub mod encryption;
pub mod kdf;
pub mod keys;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{encrypt, decrypt, derive_key, ...};
pub use encryption::{decrypt, encrypt};
pub use kdf::{derive_key, generate_salt, KdfParams};
pub use keys::{check_verifier, derive_record_key, generate_verifier, MasterKey};
