//! The vault core: lock state machine plus credential operations.
//!
//! `VaultCore` owns the only copy of the session key.  Every operation
//! takes the same mutex for its whole duration, so a transition
//! (`create`, `unlock`, `lock`, `reset`) can never interleave with a
//! credential read or write that is using the key.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{debug, info, warn};
use zeroize::{Zeroize, Zeroizing};

use super::status::VaultStatus;
use crate::crypto::{
    check_verifier, decrypt, derive_key, encrypt, generate_salt, generate_verifier, KdfParams,
    MasterKey,
};
use crate::errors::{Result, VaultError};
use crate::store::{CredentialMetadata, EncryptedRecord, EncryptedStore, VerifierRecord};

/// Maximum length of a credential id in bytes.
const MAX_ID_LEN: usize = 256;

/// Tunables fixed when a `VaultCore` is built.
#[derive(Debug, Clone, Copy, Default)]
pub struct VaultOptions {
    /// KDF cost used by `create`.  `unlock` always uses the persisted cost.
    pub kdf_params: KdfParams,

    /// Lock automatically after this much inactivity.  `None` disables it.
    pub session_timeout: Option<Duration>,
}

/// Key material for the lifetime of one `Unlocked` state.
struct Session {
    key: MasterKey,
    last_used: Instant,
}

impl Session {
    fn new(key: MasterKey) -> Self {
        Self {
            key,
            last_used: Instant::now(),
        }
    }

    fn is_expired(&self, timeout: Option<Duration>) -> bool {
        timeout.is_some_and(|t| self.last_used.elapsed() >= t)
    }
}

/// The vault: session key, lock state and credential API.
pub struct VaultCore {
    store: Arc<dyn EncryptedStore>,
    options: VaultOptions,
    session: Mutex<Option<Session>>,
}

impl std::fmt::Debug for VaultCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultCore")
            .field("options", &self.options)
            .field("session", &"[REDACTED]")
            .finish()
    }
}

impl VaultCore {
    pub fn new(store: Arc<dyn EncryptedStore>, options: VaultOptions) -> Self {
        Self {
            store,
            options,
            session: Mutex::new(None),
        }
    }

    // ------------------------------------------------------------------
    // State machine
    // ------------------------------------------------------------------

    /// Current lock status.  Never changes state; an expired session
    /// reports `Locked` and is discarded on the next operation.
    pub fn status(&self) -> Result<VaultStatus> {
        let session = self.session();
        if let Some(s) = session.as_ref() {
            if !s.is_expired(self.options.session_timeout) {
                return Ok(VaultStatus::Unlocked);
            }
        }

        if self.store.load_verifier()?.is_some() {
            Ok(VaultStatus::Locked)
        } else {
            Ok(VaultStatus::Uninitialized)
        }
    }

    /// Create the vault and unlock it.  Only valid from `Uninitialized`.
    pub fn create(&self, password: &str) -> Result<()> {
        let mut session = self.session();
        if session.is_some() || self.store.load_verifier()?.is_some() {
            return Err(VaultError::AlreadyInitialized);
        }

        let params = self.options.kdf_params;
        let salt = generate_salt()?;
        let key = derive_master_key(password, &salt, &params)?;

        let verifier = VerifierRecord {
            salt: salt.to_vec(),
            verifier: generate_verifier(&key)?,
            kdf_params: params,
            created_at: Utc::now(),
        };
        self.store.save_verifier(&verifier)?;

        *session = Some(Session::new(key));
        info!("vault created");
        Ok(())
    }

    /// Unlock with the master password.
    ///
    /// A wrong password returns `InvalidPassword` and leaves the vault
    /// `Locked`.  Calling this while already unlocked re-checks the
    /// password: a match starts a fresh session, a mismatch ends the
    /// current one.
    pub fn unlock(&self, password: &str) -> Result<()> {
        let mut session = self.session();
        let stored = self
            .store
            .load_verifier()?
            .ok_or(VaultError::NotInitialized)?;

        if password.is_empty() {
            return Err(reject(&mut session));
        }

        let key = derive_master_key(password, &stored.salt, &stored.kdf_params)?;
        if !check_verifier(&key, &stored.verifier)? {
            return Err(reject(&mut session));
        }

        *session = Some(Session::new(key));
        info!("vault unlocked");
        Ok(())
    }

    /// Discard the session key.  Always succeeds; a no-op unless unlocked.
    pub fn lock(&self) {
        if self.session().take().is_some() {
            info!("vault locked");
        }
    }

    /// Delete every credential and the verifier, returning to
    /// `Uninitialized`.  Refuses to run unless `confirmed` is `true`.
    pub fn reset(&self, confirmed: bool) -> Result<()> {
        if !confirmed {
            return Err(VaultError::ResetNotConfirmed);
        }

        let mut session = self.session();
        self.store.wipe()?;
        *session = None;
        warn!("vault reset: all credentials deleted");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Credential operations
    // ------------------------------------------------------------------

    /// Encrypt and upsert a credential.  Requires `Unlocked`.
    pub fn set_credential(&self, id: &str, plaintext: &str) -> Result<()> {
        let mut session = self.session();
        let key = self.active_key(&mut session)?;
        validate_id(id)?;

        let record_salt = generate_salt()?;
        let record_key = key.derive_record_key(&record_salt, id)?;
        let (ciphertext, iv) = encrypt(record_key.as_slice(), plaintext.as_bytes())?;

        let now = Utc::now();
        self.store.put(&EncryptedRecord {
            id: id.to_string(),
            ciphertext,
            iv,
            salt: record_salt.to_vec(),
            created_at: now,
            updated_at: now,
        })?;

        debug!(id, "credential stored");
        Ok(())
    }

    /// Decrypt a credential.  Requires `Unlocked`.
    ///
    /// Returns `None` if there is no record for `id`.  A record that
    /// fails to decrypt is reported as `CorruptRecord`, never as a
    /// lock problem.
    pub fn get_credential(&self, id: &str) -> Result<Option<Zeroizing<String>>> {
        let mut session = self.session();
        let key = self.active_key(&mut session)?;
        validate_id(id)?;

        let Some(record) = self.store.get(id)? else {
            return Ok(None);
        };

        let record_key = key.derive_record_key(&record.salt, id)?;
        let plaintext = decrypt(record_key.as_slice(), &record.ciphertext, &record.iv)
            .map_err(|_| {
                warn!(id, "credential failed authentication");
                VaultError::CorruptRecord(id.to_string())
            })?;

        // On error, zeroize the bytes inside the error before discarding.
        let value = String::from_utf8(plaintext).map_err(|e| {
            let mut bad_bytes = e.into_bytes();
            bad_bytes.zeroize();
            VaultError::CorruptRecord(id.to_string())
        })?;

        Ok(Some(Zeroizing::new(value)))
    }

    /// Remove a credential.  Requires `Unlocked`; idempotent.
    pub fn delete_credential(&self, id: &str) -> Result<()> {
        let mut session = self.session();
        self.active_key(&mut session)?;
        validate_id(id)?;

        if self.store.delete(id)? {
            debug!(id, "credential deleted");
        }
        Ok(())
    }

    /// Metadata for every stored credential, sorted by id.  Requires
    /// `Unlocked`; nothing is decrypted.
    pub fn list_credentials(&self) -> Result<Vec<CredentialMetadata>> {
        let mut session = self.session();
        self.active_key(&mut session)?;
        self.store.list()
    }

    /// Returns `true` if a record exists for `id`.  Requires `Unlocked`.
    pub fn contains_credential(&self, id: &str) -> Result<bool> {
        let mut session = self.session();
        self.active_key(&mut session)?;
        validate_id(id)?;
        Ok(self.store.get(id)?.is_some())
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// The session slot only ever holds a whole `Session` or `None`, so a
    /// poisoned lock still guards a consistent value.
    fn session(&self) -> MutexGuard<'_, Option<Session>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Borrow the live key, expiring the session first if it idled out.
    fn active_key<'a>(&self, slot: &'a mut Option<Session>) -> Result<&'a MasterKey> {
        if slot
            .as_ref()
            .is_some_and(|s| s.is_expired(self.options.session_timeout))
        {
            *slot = None;
            info!("vault locked after inactivity");
        }

        let session = slot.as_mut().ok_or(VaultError::VaultLocked)?;
        session.last_used = Instant::now();
        Ok(&session.key)
    }
}

fn derive_master_key(password: &str, salt: &[u8], params: &KdfParams) -> Result<MasterKey> {
    let mut bytes = derive_key(password.as_bytes(), salt, params)?;
    let key = MasterKey::new(bytes);
    bytes.zeroize();
    Ok(key)
}

/// Drop any live session after a failed unlock.
fn reject(session: &mut Option<Session>) -> VaultError {
    if session.take().is_some() {
        info!("vault locked after failed unlock");
    } else {
        debug!("unlock rejected");
    }
    VaultError::InvalidPassword
}

/// Ids are opaque to the vault: any UTF-8 string that is non-empty and
/// at most `MAX_ID_LEN` bytes.
fn validate_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(VaultError::InvalidCredentialId(
            "credential id cannot be empty".into(),
        ));
    }
    if id.len() > MAX_ID_LEN {
        return Err(VaultError::InvalidCredentialId(format!(
            "credential id cannot exceed {MAX_ID_LEN} bytes"
        )));
    }
    Ok(())
}
