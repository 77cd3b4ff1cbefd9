//! In-memory store.  Same contract as `SqliteStore`, nothing survives
//! the process.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::record::{CredentialMetadata, EncryptedRecord, VerifierRecord};
use super::EncryptedStore;
use crate::errors::{Result, VaultError};

#[derive(Default)]
struct Inner {
    verifier: Option<VerifierRecord>,
    records: HashMap<String, EncryptedRecord>,
}

/// `HashMap`-backed implementation of `EncryptedStore`.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn inner(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| VaultError::Storage("memory store mutex poisoned".into()))
    }
}

impl EncryptedStore for MemoryStore {
    fn load_verifier(&self) -> Result<Option<VerifierRecord>> {
        Ok(self.inner()?.verifier.clone())
    }

    fn save_verifier(&self, verifier: &VerifierRecord) -> Result<()> {
        self.inner()?.verifier = Some(verifier.clone());
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<EncryptedRecord>> {
        Ok(self.inner()?.records.get(id).cloned())
    }

    fn put(&self, record: &EncryptedRecord) -> Result<()> {
        let mut inner = self.inner()?;
        let mut record = record.clone();
        if let Some(existing) = inner.records.get(&record.id) {
            record.created_at = existing.created_at;
        }
        inner.records.insert(record.id.clone(), record);
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<bool> {
        Ok(self.inner()?.records.remove(id).is_some())
    }

    fn list(&self) -> Result<Vec<CredentialMetadata>> {
        let mut list: Vec<CredentialMetadata> = self
            .inner()?
            .records
            .values()
            .map(CredentialMetadata::from)
            .collect();
        list.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(list)
    }

    fn wipe(&self) -> Result<()> {
        let mut inner = self.inner()?;
        inner.records.clear();
        inner.verifier = None;
        Ok(())
    }
}
