//! `credvault get`: print a single credential's value.

use crate::cli::{open_vault, Cli};
use crate::errors::{Result, VaultError};

/// Execute the `get` command.
pub async fn execute(cli: &Cli, id: &str) -> Result<()> {
    let ctx = open_vault(cli)?;
    let vault = ctx.vault.as_ref();

    let value = ctx
        .coordinator
        .run(move || async move { vault.get_credential(id) })
        .await?
        .ok_or_else(|| VaultError::CredentialNotFound(id.to_string()))?;

    println!("{}", value.as_str());

    Ok(())
}
