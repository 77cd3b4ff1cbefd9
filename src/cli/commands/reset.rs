//! `credvault reset`: wipe the vault back to uninitialized.
//!
//! Deletes every credential and the stored verifier.  Works from any
//! state and needs no password: it destroys data, it does not reveal it.

use dialoguer::Confirm;

use crate::cli::output;
use crate::cli::{open_vault, Cli};
use crate::errors::{Result, VaultError};

/// Execute the `reset` command.
pub fn execute(cli: &Cli, force: bool) -> Result<()> {
    let confirmed = force
        || Confirm::new()
            .with_prompt("Delete ALL credentials and the master password? This cannot be undone")
            .default(false)
            .interact()
            .map_err(|e| VaultError::CommandFailed(format!("confirm prompt: {e}")))?;

    if !confirmed {
        output::info("Cancelled.");
        return Ok(());
    }

    let ctx = open_vault(cli)?;
    ctx.vault.reset(true)?;

    output::success("Vault wiped. Run `credvault init` to start over.");

    Ok(())
}
