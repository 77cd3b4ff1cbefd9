//! CLI module: Clap argument parser, terminal prompts, output helpers,
//! and command implementations.

pub mod commands;
pub mod output;
pub mod prompt;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use zeroize::Zeroizing;

use crate::config::Settings;
use crate::coordinator::UnlockCoordinator;
use crate::errors::{Result, VaultError};
use crate::store::SqliteStore;
use crate::vault::VaultCore;

use self::prompt::TerminalPrompt;

/// Environment variable that supplies the master password non-interactively.
pub const PASSWORD_ENV_VAR: &str = "CREDVAULT_PASSWORD";

/// Minimum password length to prevent trivially weak passwords.
const MIN_PASSWORD_LEN: usize = 8;

/// CredVault CLI: local encrypted credential vault.
#[derive(Parser)]
#[command(
    name = "credvault",
    about = "Local encrypted vault for API tokens and credentials",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Vault directory (default: `vault_dir` from .credvault.toml, else .credvault)
    #[arg(long, global = true)]
    pub vault_dir: Option<String>,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Create a new vault protected by a master password
    Init,

    /// Show whether the vault is uninitialized, locked or unlocked
    Status,

    /// Store a credential (add or update)
    Set {
        /// Credential id (e.g. github_pat)
        id: String,
        /// Credential value (omit for interactive prompt)
        value: Option<String>,
    },

    /// Print a credential's value
    Get {
        /// Credential id
        id: String,
    },

    /// List stored credential ids
    List,

    /// Delete a credential
    Delete {
        /// Credential id
        id: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Wipe the vault: delete every credential and the master password
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

/// Everything a command needs to talk to the vault.
pub struct VaultContext {
    pub database_path: PathBuf,
    pub vault: Arc<VaultCore>,
    pub prompt: Arc<TerminalPrompt>,
    pub coordinator: UnlockCoordinator,
}

/// Load settings with the `--vault-dir` override applied.
fn load_settings(cli: &Cli) -> Result<(Settings, PathBuf)> {
    let cwd = std::env::current_dir()?;
    let mut settings = Settings::load(&cwd)?;
    if let Some(dir) = &cli.vault_dir {
        settings.vault_dir.clone_from(dir);
    }
    Ok((settings, cwd))
}

/// Where the vault database lives, without opening or creating it.
pub fn database_path(cli: &Cli) -> Result<PathBuf> {
    let (settings, cwd) = load_settings(cli)?;
    Ok(settings.database_path(&cwd))
}

/// Load settings, open the vault database and wire up the coordinator
/// with a terminal prompt.
pub fn open_vault(cli: &Cli) -> Result<VaultContext> {
    let (settings, cwd) = load_settings(cli)?;

    let database_path = settings.database_path(&cwd);
    let store = Arc::new(SqliteStore::open(&database_path)?);
    let vault = Arc::new(VaultCore::new(store, settings.vault_options()));
    let prompt = Arc::new(TerminalPrompt::new(
        Arc::clone(&vault),
        settings.max_unlock_attempts,
    ));
    let coordinator = UnlockCoordinator::new(Arc::clone(&vault), prompt.clone());

    Ok(VaultContext {
        database_path,
        vault,
        prompt,
        coordinator,
    })
}

// ---------------------------------------------------------------------------
// Shared password helpers
// ---------------------------------------------------------------------------

/// The password from `CREDVAULT_PASSWORD`, if set and non-empty.
pub fn env_password() -> Option<Zeroizing<String>> {
    std::env::var(PASSWORD_ENV_VAR)
        .ok()
        .filter(|pw| !pw.is_empty())
        .map(Zeroizing::new)
}

/// Ask for the master password.  Submitting an empty line cancels and
/// returns `None`.
///
/// Returns `Zeroizing<String>` so the password is wiped from memory on drop.
pub fn prompt_password() -> Result<Option<Zeroizing<String>>> {
    let pw = dialoguer::Password::new()
        .with_prompt("Vault password (empty to cancel)")
        .allow_empty_password(true)
        .interact()
        .map_err(|e| VaultError::CommandFailed(format!("password prompt: {e}")))?;

    let pw = Zeroizing::new(pw);
    if pw.is_empty() {
        return Ok(None);
    }
    Ok(Some(pw))
}

/// Prompt for a new password with confirmation (used during creation).
///
/// Also respects `CREDVAULT_PASSWORD` for scripted/CI usage.
/// Enforces a minimum password length.
pub fn prompt_new_password() -> Result<Zeroizing<String>> {
    if let Some(pw) = env_password() {
        if pw.len() < MIN_PASSWORD_LEN {
            return Err(VaultError::CommandFailed(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        return Ok(pw);
    }

    loop {
        let password = dialoguer::Password::new()
            .with_prompt("Choose vault password")
            .with_confirmation(
                "Confirm vault password",
                "Passwords do not match, try again",
            )
            .interact()
            .map_err(|e| VaultError::CommandFailed(format!("password prompt: {e}")))?;
        let password = Zeroizing::new(password);

        if password.len() < MIN_PASSWORD_LEN {
            output::warning(&format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters. Try again."
            ));
            continue;
        }

        return Ok(password);
    }
}
