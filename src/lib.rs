//! CredVault: a local, offline credential vault.
//!
//! Third-party API tokens are stored encrypted at rest (Argon2id-derived
//! master key, AES-256-GCM per record) and released as plaintext only
//! while the vault is unlocked for the session.  Callers that need a
//! secret go through [`coordinator::UnlockCoordinator::run`], which
//! prompts to create or unlock the vault and retries once if the vault
//! turns out to be locked mid-operation.

pub mod cli;
pub mod config;
pub mod coordinator;
pub mod crypto;
pub mod errors;
pub mod store;
pub mod vault;

pub use coordinator::{UnlockCoordinator, UnlockPrompt};
pub use errors::{ErrorCategory, LockAware, Result, VaultError};
pub use store::{EncryptedStore, MemoryStore, SqliteStore};
pub use vault::{VaultCore, VaultOptions, VaultStatus};
