//! AES-256-GCM authenticated encryption.
//!
//! Each call to `encrypt` generates a fresh random 12-byte IV and hands
//! it back next to the ciphertext; callers never supply their own.
//! The ciphertext carries the 16-byte GCM auth tag at its end.

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};

use crate::errors::{Result, VaultError};

/// Size of the AES-256-GCM IV (nonce) in bytes.
pub const IV_LEN: usize = 12;

/// Encrypt `plaintext` with a 32-byte `key`.
///
/// Returns `(ciphertext, iv)`.  Both must be stored to decrypt later.
pub fn encrypt(key: &[u8], plaintext: &[u8]) -> Result<(Vec<u8>, Vec<u8>)> {
    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| VaultError::EncryptionFailed(format!("invalid key length: {e}")))?;

    let iv = Aes256Gcm::generate_nonce(&mut OsRng);

    let ciphertext = cipher
        .encrypt(&iv, plaintext)
        .map_err(|e| VaultError::EncryptionFailed(format!("encryption error: {e}")))?;

    Ok((ciphertext, iv.to_vec()))
}

/// Decrypt a `(ciphertext, iv)` pair produced by `encrypt`.
///
/// Every failure (malformed IV, wrong key, tampered bytes) collapses to
/// `AuthenticationFailed` so the caller cannot tell them apart.
pub fn decrypt(key: &[u8], ciphertext: &[u8], iv: &[u8]) -> Result<Vec<u8>> {
    if iv.len() != IV_LEN {
        return Err(VaultError::AuthenticationFailed);
    }
    let nonce = Nonce::from_slice(iv);

    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| VaultError::AuthenticationFailed)?;

    cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| VaultError::AuthenticationFailed)
}
