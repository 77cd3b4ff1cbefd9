//! `credvault init`: create a new vault.

use crate::cli::output;
use crate::cli::{open_vault, Cli};
use crate::errors::{Result, VaultError};
use crate::vault::VaultStatus;

/// Execute the `init` command.
pub async fn execute(cli: &Cli) -> Result<()> {
    let ctx = open_vault(cli)?;

    if ctx.vault.status()? != VaultStatus::Uninitialized {
        output::tip("Use `credvault set <ID>` to add credentials to the existing vault.");
        return Err(VaultError::AlreadyInitialized);
    }

    ctx.prompt.create_vault().await?;

    output::success(&format!(
        "Vault created at {}",
        ctx.database_path.display()
    ));
    output::tip("Run `credvault set <ID>` to store a credential.");
    output::tip("Run `credvault list` to see stored credentials.");

    Ok(())
}
