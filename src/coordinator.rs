//! Unlock-gated operations.
//!
//! Every feature that needs a secret goes through
//! [`UnlockCoordinator::run`].  It makes sure the vault exists and is
//! unlocked before the operation starts, and if the operation finds the
//! vault locked part-way through (another session locked it, or it idled
//! out) it asks for the password once more and re-runs the operation
//! exactly once.
//!
//! A re-run is a fresh attempt.  Anything the first attempt already
//! handed to the caller (partial stream output, for instance) is not
//! rolled back.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::errors::{LockAware, Result, VaultError};
use crate::vault::{VaultCore, VaultStatus};

/// User-facing boundary that creates or unlocks the vault.
///
/// Implementations own all interaction (terminal, GUI, test double) and
/// report back only whether the vault is now usable.  `Ok(false)` means
/// the user declined or cancelled.
#[async_trait]
pub trait UnlockPrompt: Send + Sync {
    /// Ask the user to choose a master password and create the vault.
    async fn request_creation(&self) -> Result<bool>;

    /// Ask the user for the master password and unlock the vault.
    async fn request_unlock(&self) -> Result<bool>;
}

/// Runs operations that need an unlocked vault.
pub struct UnlockCoordinator {
    vault: Arc<VaultCore>,
    prompt: Arc<dyn UnlockPrompt>,
}

impl UnlockCoordinator {
    pub fn new(vault: Arc<VaultCore>, prompt: Arc<dyn UnlockPrompt>) -> Self {
        Self { vault, prompt }
    }

    /// The vault this coordinator guards.
    pub fn vault(&self) -> &Arc<VaultCore> {
        &self.vault
    }

    /// Run `operation` with the vault unlocked.
    ///
    /// - Uninitialized vault: the creation prompt runs first; declining
    ///   fails with `SetupCancelled` and `operation` never runs.
    /// - Locked vault: the unlock prompt runs first; declining fails with
    ///   `UnlockCancelled` and `operation` never runs.
    /// - If `operation` fails with a vault-locked error and no prompt was
    ///   shown during this call, the unlock prompt runs once and
    ///   `operation` is re-run once.  If that prompt is declined or
    ///   fails, the original lock error is returned.
    /// - Every other error from `operation` is returned unchanged.
    pub async fn run<T, E, F, Fut>(&self, mut operation: F) -> std::result::Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        E: From<VaultError> + LockAware,
    {
        let prompted = self.ensure_unlocked().await.map_err(E::from)?;

        match operation().await {
            Err(err) if err.is_vault_locked() && !prompted => {
                debug!("operation found the vault locked; requesting unlock before retry");
                match self.prompt.request_unlock().await {
                    Ok(true) => {
                        info!("vault unlocked, retrying operation once");
                        operation().await
                    }
                    Ok(false) => {
                        debug!("unlock declined; giving up on retry");
                        Err(err)
                    }
                    Err(prompt_err) => {
                        warn!(error = %prompt_err, "unlock prompt failed; giving up on retry");
                        Err(err)
                    }
                }
            }
            outcome => outcome,
        }
    }

    /// Bring the vault to `Unlocked`, prompting if needed.  Returns
    /// `true` if a prompt was satisfied during this call.
    async fn ensure_unlocked(&self) -> Result<bool> {
        match self.vault.status()? {
            VaultStatus::Unlocked => Ok(false),
            VaultStatus::Uninitialized => {
                debug!("vault not created yet; requesting creation");
                if self.prompt.request_creation().await? {
                    Ok(true)
                } else {
                    debug!("vault creation declined");
                    Err(VaultError::SetupCancelled)
                }
            }
            VaultStatus::Locked => {
                debug!("vault locked; requesting unlock");
                if self.prompt.request_unlock().await? {
                    Ok(true)
                } else {
                    debug!("vault unlock declined");
                    Err(VaultError::UnlockCancelled)
                }
            }
        }
    }
}
