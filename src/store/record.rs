//! Persisted shapes: one verifier record per vault plus one
//! `EncryptedRecord` per credential id.

use chrono::{DateTime, Utc};

use crate::crypto::KdfParams;

/// A single encrypted credential.
///
/// `ciphertext` is only meaningful together with its `iv`; the pair is
/// always written and read as one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedRecord {
    /// Credential id (e.g. "github_pat").
    pub id: String,

    /// AES-256-GCM ciphertext including the auth tag.
    pub ciphertext: Vec<u8>,

    /// The IV used for this encryption.  Fresh on every write.
    pub iv: Vec<u8>,

    /// Random salt feeding the per-record HKDF key.
    pub salt: Vec<u8>,

    /// When this credential was first stored.
    pub created_at: DateTime<Utc>,

    /// When this credential was last written.
    pub updated_at: DateTime<Utc>,
}

/// Everything needed to re-derive and check the master key on unlock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifierRecord {
    /// Argon2id salt.
    pub salt: Vec<u8>,

    /// HMAC tag proving a candidate key is the right one.
    pub verifier: Vec<u8>,

    /// KDF cost chosen at creation time.
    pub kdf_params: KdfParams,

    /// When the vault was created.
    pub created_at: DateTime<Utc>,
}

/// Lightweight metadata about a credential (no ciphertext).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialMetadata {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&EncryptedRecord> for CredentialMetadata {
    fn from(record: &EncryptedRecord) -> Self {
        Self {
            id: record.id.clone(),
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}
