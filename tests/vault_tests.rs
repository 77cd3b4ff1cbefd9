//! Integration tests for the vault state machine and credential API.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use credvault::crypto::KdfParams;
use credvault::{MemoryStore, SqliteStore, VaultCore, VaultError, VaultOptions, VaultStatus};
use tempfile::TempDir;

const PASSWORD: &str = "test-password-123";

fn fast_options() -> VaultOptions {
    VaultOptions {
        kdf_params: KdfParams::minimum(),
        session_timeout: None,
    }
}

fn memory_vault() -> VaultCore {
    VaultCore::new(Arc::new(MemoryStore::new()), fast_options())
}

/// Create a temp directory and return (TempDir guard, path to vault.db).
/// The TempDir must be held alive for the duration of the test.
fn vault_path() -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("failed to create temp dir");
    let path = dir.path().join("vault.db");
    (dir, path)
}

fn sqlite_vault(path: &PathBuf) -> VaultCore {
    let store = SqliteStore::open(path).expect("open store");
    VaultCore::new(Arc::new(store), fast_options())
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[test]
fn lifecycle_create_lock_unlock_reset() {
    let vault = memory_vault();
    assert_eq!(vault.status().unwrap(), VaultStatus::Uninitialized);

    vault.create(PASSWORD).expect("create");
    assert_eq!(vault.status().unwrap(), VaultStatus::Unlocked);

    vault.lock();
    assert_eq!(vault.status().unwrap(), VaultStatus::Locked);

    vault.unlock(PASSWORD).expect("unlock");
    assert_eq!(vault.status().unwrap(), VaultStatus::Unlocked);

    vault.reset(true).expect("reset");
    assert_eq!(vault.status().unwrap(), VaultStatus::Uninitialized);
}

#[test]
fn store_and_retrieve_after_relock() {
    let vault = memory_vault();
    vault.create(PASSWORD).unwrap();

    vault.set_credential("gemini_api_key", "AIza-123").unwrap();
    vault.lock();
    vault.unlock(PASSWORD).unwrap();

    let value = vault.get_credential("gemini_api_key").unwrap();
    assert_eq!(value.as_deref().map(String::as_str), Some("AIza-123"));
}

#[test]
fn wrong_password_keeps_vault_locked() {
    let vault = memory_vault();
    vault.create("correct-pass").unwrap();
    vault.lock();

    let result = vault.unlock("wrong-pass");
    assert!(matches!(result, Err(VaultError::InvalidPassword)));
    assert_eq!(vault.status().unwrap(), VaultStatus::Locked);
}

#[test]
fn wrong_password_while_unlocked_locks_vault() {
    let vault = memory_vault();
    vault.create(PASSWORD).unwrap();
    vault.set_credential("k", "v").unwrap();

    assert!(matches!(
        vault.unlock("not-the-password"),
        Err(VaultError::InvalidPassword)
    ));
    assert_eq!(vault.status().unwrap(), VaultStatus::Locked);

    vault.unlock(PASSWORD).unwrap();
    assert_eq!(vault.get_credential("k").unwrap().unwrap().as_str(), "v");
}

#[test]
fn create_twice_is_rejected() {
    let vault = memory_vault();
    vault.create(PASSWORD).unwrap();
    assert!(matches!(
        vault.create(PASSWORD),
        Err(VaultError::AlreadyInitialized)
    ));

    vault.lock();
    assert!(matches!(
        vault.create("another-password"),
        Err(VaultError::AlreadyInitialized)
    ));
}

#[test]
fn unlock_before_create_is_not_initialized() {
    let vault = memory_vault();
    assert!(matches!(
        vault.unlock(PASSWORD),
        Err(VaultError::NotInitialized)
    ));
    assert_eq!(vault.status().unwrap(), VaultStatus::Uninitialized);
}

#[test]
fn create_with_empty_password_fails_and_stays_uninitialized() {
    let vault = memory_vault();
    assert!(matches!(
        vault.create(""),
        Err(VaultError::KeyDerivationFailed(_))
    ));
    assert_eq!(vault.status().unwrap(), VaultStatus::Uninitialized);
}

#[test]
fn lock_is_idempotent() {
    let vault = memory_vault();
    vault.lock();
    assert_eq!(vault.status().unwrap(), VaultStatus::Uninitialized);

    vault.create(PASSWORD).unwrap();
    vault.lock();
    vault.lock();
    assert_eq!(vault.status().unwrap(), VaultStatus::Locked);
}

// ---------------------------------------------------------------------------
// Locked guard
// ---------------------------------------------------------------------------

fn assert_every_op_locked(vault: &VaultCore) {
    assert!(matches!(
        vault.set_credential("k", "v"),
        Err(VaultError::VaultLocked)
    ));
    assert!(matches!(
        vault.get_credential("k"),
        Err(VaultError::VaultLocked)
    ));
    assert!(matches!(
        vault.delete_credential("k"),
        Err(VaultError::VaultLocked)
    ));
    assert!(matches!(
        vault.list_credentials(),
        Err(VaultError::VaultLocked)
    ));
    assert!(matches!(
        vault.contains_credential("k"),
        Err(VaultError::VaultLocked)
    ));
}

#[test]
fn credential_ops_require_unlocked_vault() {
    let vault = memory_vault();
    assert_every_op_locked(&vault);

    vault.create(PASSWORD).unwrap();
    vault.lock();
    assert_every_op_locked(&vault);
}

#[test]
fn lock_check_comes_before_id_validation() {
    let vault = memory_vault();
    assert!(matches!(
        vault.get_credential(""),
        Err(VaultError::VaultLocked)
    ));
}

#[test]
fn session_timeout_locks_vault() {
    let vault = VaultCore::new(
        Arc::new(MemoryStore::new()),
        VaultOptions {
            session_timeout: Some(Duration::from_millis(50)),
            ..fast_options()
        },
    );
    vault.create(PASSWORD).unwrap();
    vault.set_credential("k", "v").unwrap();

    std::thread::sleep(Duration::from_millis(120));

    assert_eq!(vault.status().unwrap(), VaultStatus::Locked);
    assert!(matches!(
        vault.get_credential("k"),
        Err(VaultError::VaultLocked)
    ));
}

// ---------------------------------------------------------------------------
// Credential operations
// ---------------------------------------------------------------------------

#[test]
fn set_overwrites_existing_value() {
    let vault = memory_vault();
    vault.create(PASSWORD).unwrap();

    vault.set_credential("github_pat", "ghp_old").unwrap();
    vault.set_credential("github_pat", "ghp_new").unwrap();

    let value = vault.get_credential("github_pat").unwrap().unwrap();
    assert_eq!(value.as_str(), "ghp_new");
    assert_eq!(vault.list_credentials().unwrap().len(), 1);
}

#[test]
fn get_missing_credential_is_none() {
    let vault = memory_vault();
    vault.create(PASSWORD).unwrap();
    assert!(vault.get_credential("nope").unwrap().is_none());
    assert!(!vault.contains_credential("nope").unwrap());
}

#[test]
fn delete_is_idempotent() {
    let vault = memory_vault();
    vault.create(PASSWORD).unwrap();
    vault.set_credential("slack_token", "xoxb").unwrap();

    vault.delete_credential("slack_token").unwrap();
    vault.delete_credential("slack_token").unwrap();
    assert!(vault.get_credential("slack_token").unwrap().is_none());
}

#[test]
fn empty_value_roundtrips() {
    let vault = memory_vault();
    vault.create(PASSWORD).unwrap();
    vault.set_credential("blank", "").unwrap();
    assert_eq!(vault.get_credential("blank").unwrap().unwrap().as_str(), "");
}

#[test]
fn unicode_value_roundtrips() {
    let vault = memory_vault();
    vault.create(PASSWORD).unwrap();
    vault.set_credential("note", "pässwörd 🔑").unwrap();
    assert_eq!(
        vault.get_credential("note").unwrap().unwrap().as_str(),
        "pässwörd 🔑"
    );
}

#[test]
fn list_reports_sorted_ids() {
    let vault = memory_vault();
    vault.create(PASSWORD).unwrap();
    for id in ["jira_pat", "azure_key", "github_pat"] {
        vault.set_credential(id, "x").unwrap();
    }

    let ids: Vec<String> = vault
        .list_credentials()
        .unwrap()
        .into_iter()
        .map(|m| m.id)
        .collect();
    assert_eq!(ids, vec!["azure_key", "github_pat", "jira_pat"]);
}

#[test]
fn empty_and_oversized_ids_are_rejected() {
    let vault = memory_vault();
    vault.create(PASSWORD).unwrap();

    let too_long = "a".repeat(257);
    for bad in ["", too_long.as_str()] {
        assert!(
            matches!(
                vault.set_credential(bad, "v"),
                Err(VaultError::InvalidCredentialId(_))
            ),
            "id {bad:?} should be rejected"
        );
    }
}

#[test]
fn ids_are_opaque_strings() {
    let (_dir, path) = vault_path();
    let ids = ["openai api key", "jira/domain", "clé", "a:b", "ключ 🔑"];

    {
        let vault = sqlite_vault(&path);
        vault.create(PASSWORD).unwrap();
        for (i, id) in ids.iter().enumerate() {
            vault.set_credential(id, &format!("secret-{i}")).unwrap();
        }
    }

    let vault = sqlite_vault(&path);
    vault.unlock(PASSWORD).unwrap();
    for (i, id) in ids.iter().enumerate() {
        let value = vault.get_credential(id).unwrap().unwrap();
        assert_eq!(value.as_str(), format!("secret-{i}"));
        assert!(vault.contains_credential(id).unwrap());
    }
    assert_eq!(vault.list_credentials().unwrap().len(), ids.len());

    vault.delete_credential("jira/domain").unwrap();
    assert!(vault.get_credential("jira/domain").unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Reset
// ---------------------------------------------------------------------------

#[test]
fn reset_requires_confirmation() {
    let vault = memory_vault();
    vault.create(PASSWORD).unwrap();
    vault.set_credential("k", "v").unwrap();

    assert!(matches!(
        vault.reset(false),
        Err(VaultError::ResetNotConfirmed)
    ));
    assert_eq!(vault.status().unwrap(), VaultStatus::Unlocked);
    assert!(vault.contains_credential("k").unwrap());
}

#[test]
fn reset_wipes_credentials_and_allows_recreate() {
    let vault = memory_vault();
    vault.create("first-password").unwrap();
    vault.set_credential("k", "v").unwrap();
    vault.lock();

    vault.reset(true).unwrap();
    assert_eq!(vault.status().unwrap(), VaultStatus::Uninitialized);

    vault.create("second-password").unwrap();
    assert!(vault.list_credentials().unwrap().is_empty());
    assert!(vault.get_credential("k").unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

#[test]
fn sqlite_vault_survives_reopen() {
    let (_dir, path) = vault_path();

    {
        let vault = sqlite_vault(&path);
        vault.create(PASSWORD).unwrap();
        vault.set_credential("github_pat", "ghp_persisted").unwrap();
    }

    let vault = sqlite_vault(&path);
    assert_eq!(vault.status().unwrap(), VaultStatus::Locked);

    vault.unlock(PASSWORD).unwrap();
    let value = vault.get_credential("github_pat").unwrap().unwrap();
    assert_eq!(value.as_str(), "ghp_persisted");
}

#[test]
fn sqlite_file_never_contains_plaintext() {
    let (_dir, path) = vault_path();
    let secret = "super-secret-token-value-0123456789";

    {
        let vault = sqlite_vault(&path);
        vault.create(PASSWORD).unwrap();
        vault.set_credential("token", secret).unwrap();
    }

    let bytes = std::fs::read(&path).unwrap();
    let needle = secret.as_bytes();
    assert!(
        !bytes.windows(needle.len()).any(|w| w == needle),
        "plaintext leaked into the database file"
    );
}

#[test]
fn unlock_uses_persisted_kdf_cost() {
    let (_dir, path) = vault_path();
    {
        let vault = sqlite_vault(&path);
        vault.create(PASSWORD).unwrap();
        vault.set_credential("k", "v").unwrap();
    }

    // A different configured cost must not change the key used on unlock.
    let store = SqliteStore::open(&path).unwrap();
    let vault = VaultCore::new(
        Arc::new(store),
        VaultOptions {
            kdf_params: KdfParams {
                iterations: 2,
                ..KdfParams::minimum()
            },
            session_timeout: None,
        },
    );
    vault.unlock(PASSWORD).unwrap();
    assert_eq!(vault.get_credential("k").unwrap().unwrap().as_str(), "v");
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

#[test]
fn concurrent_sets_on_different_ids() {
    let (_dir, path) = vault_path();
    let vault = Arc::new(sqlite_vault(&path));
    vault.create(PASSWORD).unwrap();

    let handles: Vec<_> = (0..6)
        .map(|i| {
            let vault = Arc::clone(&vault);
            std::thread::spawn(move || {
                vault
                    .set_credential(&format!("key{i}"), &format!("value{i}"))
                    .unwrap();
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    for i in 0..6 {
        let value = vault.get_credential(&format!("key{i}")).unwrap().unwrap();
        assert_eq!(value.as_str(), format!("value{i}"));
    }
}

#[test]
fn lock_racing_with_reads_never_corrupts() {
    let vault = Arc::new(memory_vault());
    vault.create(PASSWORD).unwrap();
    vault.set_credential("k", "v").unwrap();

    let reader = {
        let vault = Arc::clone(&vault);
        std::thread::spawn(move || {
            for _ in 0..200 {
                match vault.get_credential("k") {
                    Ok(Some(v)) => assert_eq!(v.as_str(), "v"),
                    Err(VaultError::VaultLocked) => {}
                    other => panic!("unexpected result: {other:?}"),
                }
            }
        })
    };

    for _ in 0..5 {
        vault.lock();
        vault.unlock(PASSWORD).unwrap();
    }
    reader.join().unwrap();
}
