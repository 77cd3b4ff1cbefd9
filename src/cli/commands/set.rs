//! `credvault set`: add or update a credential.

use std::io::{self, IsTerminal, Read};

use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::{open_vault, Cli};
use crate::errors::{Result, VaultError};

/// Execute the `set` command.
pub async fn execute(cli: &Cli, id: &str, value: Option<&str>) -> Result<()> {
    // Read the value before touching the vault so a retry after unlock
    // never asks for it twice.
    let secret_value = if let Some(v) = value {
        output::warning("Value provided on command line; it may appear in shell history.");
        Zeroizing::new(v.to_string())
    } else if !io::stdin().is_terminal() {
        let mut buf = Zeroizing::new(String::new());
        io::stdin().read_to_string(&mut buf)?;
        Zeroizing::new(buf.trim_end().to_string())
    } else {
        let entered = dialoguer::Password::new()
            .with_prompt(format!("Enter value for {id}"))
            .interact()
            .map_err(|e| VaultError::CommandFailed(format!("input prompt: {e}")))?;
        Zeroizing::new(entered)
    };

    let ctx = open_vault(cli)?;
    let vault = ctx.vault.as_ref();
    let plaintext: &str = &secret_value;

    let existed = ctx
        .coordinator
        .run(move || async move {
            let existed = vault.contains_credential(id)?;
            vault.set_credential(id, plaintext)?;
            Ok::<_, VaultError>(existed)
        })
        .await?;

    if existed {
        output::success(&format!("Credential '{id}' updated"));
    } else {
        output::success(&format!("Credential '{id}' added"));
    }

    Ok(())
}
