//! `credvault status`: report the vault's lock state.

use crate::cli::output;
use crate::cli::{database_path, open_vault, Cli};
use crate::errors::Result;
use crate::vault::VaultStatus;

/// Execute the `status` command.
pub fn execute(cli: &Cli) -> Result<()> {
    // A missing database means no vault; don't create one just to say so.
    let path = database_path(cli)?;
    let status = if path.exists() {
        open_vault(cli)?.vault.status()?
    } else {
        VaultStatus::Uninitialized
    };

    output::info(&format!("Vault at {} is {status}", path.display()));
    if status == VaultStatus::Uninitialized {
        output::tip("Run `credvault init` to create it.");
    }

    Ok(())
}
