//! Session key material and HKDF-SHA256 sub-keys.
//!
//! From the single Argon2id-derived master key we derive:
//! - A **per-record** encryption key, bound to the credential id and
//!   the record's own random salt.
//! - A **verifier** key, used only to produce and check the verifier
//!   that tells a correct master password from a wrong one.

use std::fmt;

use hkdf::Hkdf;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, Zeroizing};

use super::kdf::KEY_LEN;
use crate::errors::{Result, VaultError};

/// Message authenticated by the verifier.  Changing it invalidates
/// every existing vault.
const VERIFIER_CONSTANT: &[u8] = b"credvault-verifier-v1";

/// Length of a verifier tag (HMAC-SHA256).
pub const VERIFIER_LEN: usize = 32;

/// The derived master key, held only in process memory.
///
/// Zeroed when dropped, which happens on `lock()` or session end.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct MasterKey {
    bytes: [u8; KEY_LEN],
}

impl MasterKey {
    /// Create a new `MasterKey` from raw bytes.
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Access the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }

    /// Derive the encryption key for one record.
    pub fn derive_record_key(
        &self,
        record_salt: &[u8],
        id: &str,
    ) -> Result<Zeroizing<[u8; KEY_LEN]>> {
        derive_record_key(&self.bytes, record_salt, id)
    }
}

impl fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MasterKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Derive a per-record key: HKDF-SHA256 with the record salt as HKDF
/// salt and `credvault-record:<id>` as info.
pub fn derive_record_key(
    master_key: &[u8],
    record_salt: &[u8],
    id: &str,
) -> Result<Zeroizing<[u8; KEY_LEN]>> {
    let info = format!("credvault-record:{id}");
    hkdf_derive(master_key, Some(record_salt), info.as_bytes())
}

/// Produce the verifier for a master key.
///
/// Deterministic for a given key, and reveals nothing about any
/// stored credential.
pub fn generate_verifier(key: &MasterKey) -> Result<Vec<u8>> {
    let verifier_key = hkdf_derive(key.as_bytes(), None, b"credvault-verifier-key")?;

    let mut mac = Hmac::<Sha256>::new_from_slice(verifier_key.as_slice())
        .map_err(|e| VaultError::KeyDerivationFailed(format!("HMAC init failed: {e}")))?;
    mac.update(VERIFIER_CONSTANT);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Check a candidate key against a stored verifier in constant time.
pub fn check_verifier(key: &MasterKey, stored: &[u8]) -> Result<bool> {
    let candidate = generate_verifier(key)?;
    Ok(candidate.ct_eq(stored).into())
}

/// Run HKDF-SHA256 extract+expand.  The master key already has full
/// entropy (it came from Argon2id); the salt only separates records.
fn hkdf_derive(
    ikm: &[u8],
    salt: Option<&[u8]>,
    info: &[u8],
) -> Result<Zeroizing<[u8; KEY_LEN]>> {
    let hk = Hkdf::<Sha256>::new(salt, ikm);

    let mut okm = Zeroizing::new([0u8; KEY_LEN]);
    hk.expand(info, okm.as_mut_slice())
        .map_err(|e| VaultError::KeyDerivationFailed(format!("HKDF expand failed: {e}")))?;

    Ok(okm)
}
