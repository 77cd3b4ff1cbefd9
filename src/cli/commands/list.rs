//! `credvault list`: display stored credential ids in a table.

use crate::cli::output;
use crate::cli::{open_vault, Cli};
use crate::errors::Result;

/// Execute the `list` command.
pub async fn execute(cli: &Cli) -> Result<()> {
    let ctx = open_vault(cli)?;
    let vault = ctx.vault.as_ref();

    let credentials = ctx
        .coordinator
        .run(move || async move { vault.list_credentials() })
        .await?;

    output::info(&format!("{} credential(s)", credentials.len()));
    output::print_credentials_table(&credentials);

    Ok(())
}
