//! SQLite-backed encrypted store.
//!
//! Keeps the verifier and all credential records in a single local
//! database file (by default `<vault_dir>/vault.db`).  The file is
//! created with owner-only permissions on Unix.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use super::record::{CredentialMetadata, EncryptedRecord, VerifierRecord};
use super::EncryptedStore;
use crate::crypto::KdfParams;
use crate::errors::{Result, VaultError};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS vault_meta (
    id          INTEGER PRIMARY KEY CHECK (id = 1),
    salt        BLOB NOT NULL,
    verifier    BLOB NOT NULL,
    kdf_params  TEXT NOT NULL,
    created_at  TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS credentials (
    id          TEXT PRIMARY KEY,
    ciphertext  BLOB NOT NULL,
    iv          BLOB NOT NULL,
    salt        BLOB NOT NULL,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);";

/// Durable store on top of a single SQLite connection.
pub struct SqliteStore {
    path: PathBuf,
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database at `path`, creating parent
    /// directories and the schema as needed.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(path, perms)?;
        }

        conn.execute_batch(SCHEMA)?;
        debug!(path = %path.display(), "opened vault database");

        Ok(Self {
            path: path.to_path_buf(),
            conn: Mutex::new(conn),
        })
    }

    /// Path of the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| VaultError::Storage("database connection mutex poisoned".into()))
    }
}

impl EncryptedStore for SqliteStore {
    fn load_verifier(&self) -> Result<Option<VerifierRecord>> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                "SELECT salt, verifier, kdf_params, created_at FROM vault_meta WHERE id = 1",
                [],
                |row| {
                    Ok((
                        row.get::<_, Vec<u8>>(0)?,
                        row.get::<_, Vec<u8>>(1)?,
                        row.get::<_, String>(2)?,
                        parse_timestamp(row.get(3)?, 3)?,
                    ))
                },
            )
            .optional()?;

        let Some((salt, verifier, params_json, created_at)) = row else {
            return Ok(None);
        };

        let kdf_params: KdfParams = serde_json::from_str(&params_json)
            .map_err(|e| VaultError::Serialization(format!("stored KDF params: {e}")))?;

        Ok(Some(VerifierRecord {
            salt,
            verifier,
            kdf_params,
            created_at,
        }))
    }

    fn save_verifier(&self, verifier: &VerifierRecord) -> Result<()> {
        let params_json = serde_json::to_string(&verifier.kdf_params)
            .map_err(|e| VaultError::Serialization(format!("KDF params: {e}")))?;

        self.conn()?.execute(
            "INSERT OR REPLACE INTO vault_meta (id, salt, verifier, kdf_params, created_at)
             VALUES (1, ?1, ?2, ?3, ?4)",
            params![
                verifier.salt,
                verifier.verifier,
                params_json,
                verifier.created_at.to_rfc3339()
            ],
        )?;
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<EncryptedRecord>> {
        let conn = self.conn()?;
        let record = conn
            .query_row(
                "SELECT id, ciphertext, iv, salt, created_at, updated_at
                 FROM credentials WHERE id = ?1",
                params![id],
                |row| {
                    Ok(EncryptedRecord {
                        id: row.get(0)?,
                        ciphertext: row.get(1)?,
                        iv: row.get(2)?,
                        salt: row.get(3)?,
                        created_at: parse_timestamp(row.get(4)?, 4)?,
                        updated_at: parse_timestamp(row.get(5)?, 5)?,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    fn put(&self, record: &EncryptedRecord) -> Result<()> {
        self.conn()?.execute(
            "INSERT INTO credentials (id, ciphertext, iv, salt, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(id) DO UPDATE SET
                ciphertext = excluded.ciphertext,
                iv         = excluded.iv,
                salt       = excluded.salt,
                updated_at = excluded.updated_at",
            params![
                record.id,
                record.ciphertext,
                record.iv,
                record.salt,
                record.created_at.to_rfc3339(),
                record.updated_at.to_rfc3339()
            ],
        )?;
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<bool> {
        let removed = self
            .conn()?
            .execute("DELETE FROM credentials WHERE id = ?1", params![id])?;
        Ok(removed > 0)
    }

    fn list(&self) -> Result<Vec<CredentialMetadata>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT id, created_at, updated_at FROM credentials ORDER BY id")?;

        let rows = stmt.query_map([], |row| {
            Ok(CredentialMetadata {
                id: row.get(0)?,
                created_at: parse_timestamp(row.get(1)?, 1)?,
                updated_at: parse_timestamp(row.get(2)?, 2)?,
            })
        })?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(entries)
    }

    fn wipe(&self) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM credentials", [])?;
        tx.execute("DELETE FROM vault_meta", [])?;
        tx.commit()?;
        Ok(())
    }
}

fn parse_timestamp(raw: String, column: usize) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(id: &str, byte: u8) -> EncryptedRecord {
        let now = Utc::now();
        EncryptedRecord {
            id: id.to_string(),
            ciphertext: vec![byte; 24],
            iv: vec![byte; 12],
            salt: vec![byte; 32],
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn open_creates_database_and_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("vault.db");
        let store = SqliteStore::open(&path).unwrap();
        assert!(path.exists());
        assert_eq!(store.path(), path.as_path());
    }

    #[test]
    fn fresh_database_has_no_verifier() {
        let dir = TempDir::new().unwrap();
        let store = SqliteStore::open(&dir.path().join("vault.db")).unwrap();
        assert!(store.load_verifier().unwrap().is_none());
    }

    #[test]
    fn put_keeps_created_at_on_update() {
        let dir = TempDir::new().unwrap();
        let store = SqliteStore::open(&dir.path().join("vault.db")).unwrap();

        let first = record("github_pat", 1);
        store.put(&first).unwrap();

        let mut second = record("github_pat", 2);
        second.created_at = first.created_at + chrono::Duration::hours(1);
        second.updated_at = first.updated_at + chrono::Duration::hours(1);
        store.put(&second).unwrap();

        let loaded = store.get("github_pat").unwrap().unwrap();
        assert_eq!(loaded.ciphertext, second.ciphertext);
        assert_eq!(loaded.iv, second.iv);
        assert_eq!(loaded.created_at, first.created_at);
        assert_eq!(loaded.updated_at, second.updated_at);
    }

    #[test]
    fn wipe_removes_everything() {
        let dir = TempDir::new().unwrap();
        let store = SqliteStore::open(&dir.path().join("vault.db")).unwrap();
        store
            .save_verifier(&VerifierRecord {
                salt: vec![1; 32],
                verifier: vec![2; 32],
                kdf_params: KdfParams::minimum(),
                created_at: Utc::now(),
            })
            .unwrap();
        store.put(&record("a", 1)).unwrap();

        store.wipe().unwrap();

        assert!(store.load_verifier().unwrap().is_none());
        assert!(store.list().unwrap().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn database_has_restrictive_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vault.db");
        let _store = SqliteStore::open(&path).unwrap();

        let perms = std::fs::metadata(&path).unwrap().permissions();
        assert_eq!(perms.mode() & 0o777, 0o600, "vault.db should be 0o600");
    }
}
