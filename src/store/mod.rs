//! Store module: durable persistence of encrypted records.
//!
//! This module provides:
//! - `EncryptedRecord`, `VerifierRecord` and `CredentialMetadata` (`record`)
//! - The `EncryptedStore` trait the vault core is built on
//! - A SQLite-backed store for real vaults (`sqlite`)
//! - A `HashMap`-backed store for ephemeral vaults and tests (`memory`)
//!
//! Stores never see plaintext and never catch errors: every failure is
//! returned to the caller as a `VaultError`.

pub mod memory;
pub mod record;
pub mod sqlite;

pub use memory::MemoryStore;
pub use record::{CredentialMetadata, EncryptedRecord, VerifierRecord};
pub use sqlite::SqliteStore;

use crate::errors::Result;

/// Flat key→record persistence plus the single verifier record.
///
/// Implementations must be safe to share between threads.  Writes to
/// different ids must not interfere; last writer wins per id.
pub trait EncryptedStore: Send + Sync {
    /// Read the verifier record, if the vault has been created.
    fn load_verifier(&self) -> Result<Option<VerifierRecord>>;

    /// Insert or replace the verifier record.
    fn save_verifier(&self, verifier: &VerifierRecord) -> Result<()>;

    /// Fetch one record by id.
    fn get(&self, id: &str) -> Result<Option<EncryptedRecord>>;

    /// Insert or update a record.
    ///
    /// On update the stored `created_at` is kept and everything else
    /// (ciphertext, iv, salt, `updated_at`) is replaced.
    fn put(&self, record: &EncryptedRecord) -> Result<()>;

    /// Remove a record.  Returns `false` if there was nothing to remove.
    fn delete(&self, id: &str) -> Result<bool>;

    /// Metadata for every record, sorted by id.
    fn list(&self) -> Result<Vec<CredentialMetadata>>;

    /// Delete every record and the verifier.
    fn wipe(&self) -> Result<()>;
}
