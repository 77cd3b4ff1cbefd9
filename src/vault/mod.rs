//! Vault module: the lock state machine and the credential API.
//!
//! This module provides:
//! - `VaultStatus`, the three-state lock status (`status`)
//! - `VaultCore`, which owns the session key and builds credential
//!   get/set/delete on top of the crypto and store layers (`core`)

pub mod core;
pub mod status;

// Re-export the most commonly used items.
pub use self::core::{VaultCore, VaultOptions};
pub use status::VaultStatus;
