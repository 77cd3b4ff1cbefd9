//! Terminal implementation of the unlock prompt.
//!
//! Password source, in order:
//! 1. `CREDVAULT_PASSWORD` env var (CI/scripts; one attempt, no retries)
//! 2. Interactive `dialoguer` prompt, re-asking on a wrong password up to
//!    `max_unlock_attempts` times
//!
//! The blocking terminal I/O and the Argon2id derivation both run on
//! tokio's blocking pool.

use std::sync::Arc;

use async_trait::async_trait;
use dialoguer::Confirm;
use tracing::debug;

use super::{env_password, output, prompt_new_password, prompt_password};
use crate::coordinator::UnlockPrompt;
use crate::errors::{Result, VaultError};
use crate::vault::VaultCore;

/// Prompts on the controlling terminal and drives `VaultCore` directly.
pub struct TerminalPrompt {
    vault: Arc<VaultCore>,
    max_attempts: u32,
}

impl TerminalPrompt {
    pub fn new(vault: Arc<VaultCore>, max_attempts: u32) -> Self {
        Self {
            vault,
            max_attempts,
        }
    }

    /// Ask for a new master password and create the vault, without the
    /// "create one now?" question.  Used by `init`.
    pub async fn create_vault(&self) -> Result<()> {
        let vault = Arc::clone(&self.vault);
        run_blocking(move || {
            let password = prompt_new_password()?;
            vault.create(&password)
        })
        .await
    }
}

#[async_trait]
impl UnlockPrompt for TerminalPrompt {
    async fn request_creation(&self) -> Result<bool> {
        let vault = Arc::clone(&self.vault);
        run_blocking(move || {
            if env_password().is_none() {
                let create = Confirm::new()
                    .with_prompt("No credential vault found. Create one now?")
                    .default(true)
                    .interact()
                    .map_err(|e| VaultError::CommandFailed(format!("confirm prompt: {e}")))?;
                if !create {
                    return Ok(false);
                }
            }

            let password = prompt_new_password()?;
            vault.create(&password)?;
            Ok(true)
        })
        .await
    }

    async fn request_unlock(&self) -> Result<bool> {
        let vault = Arc::clone(&self.vault);
        let max_attempts = self.max_attempts;
        run_blocking(move || unlock_interactive(&vault, max_attempts)).await
    }
}

fn unlock_interactive(vault: &VaultCore, max_attempts: u32) -> Result<bool> {
    if let Some(password) = env_password() {
        vault.unlock(&password)?;
        return Ok(true);
    }

    for attempt in 1..=max_attempts {
        let Some(password) = prompt_password()? else {
            return Ok(false);
        };

        match vault.unlock(&password) {
            Ok(()) => return Ok(true),
            Err(VaultError::InvalidPassword) if attempt < max_attempts => {
                debug!(attempt, "wrong master password");
                output::warning("Wrong password, try again.");
            }
            Err(e) => return Err(e),
        }
    }

    Err(VaultError::InvalidPassword)
}

async fn run_blocking<T, F>(f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| VaultError::CommandFailed(format!("prompt task failed: {e}")))?
}
