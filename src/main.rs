use clap::Parser;
use credvault::cli::{output, Cli, Commands};

/// Environment variable controlling log verbosity (tracing `EnvFilter` syntax).
const LOG_ENV_VAR: &str = "CREDVAULT_LOG";

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init => credvault::cli::commands::init::execute(&cli).await,
        Commands::Status => credvault::cli::commands::status::execute(&cli),
        Commands::Set { ref id, ref value } => {
            credvault::cli::commands::set::execute(&cli, id, value.as_deref()).await
        }
        Commands::Get { ref id } => credvault::cli::commands::get::execute(&cli, id).await,
        Commands::List => credvault::cli::commands::list::execute(&cli).await,
        Commands::Delete { ref id, force } => {
            credvault::cli::commands::delete::execute(&cli, id, force).await
        }
        Commands::Reset { force } => credvault::cli::commands::reset::execute(&cli, force),
    };

    match result {
        Ok(()) => {}
        // A declined prompt ends the action quietly.
        Err(e) if e.is_cancellation() => output::info(&e.to_string()),
        Err(e) => {
            output::error(&e.to_string());
            std::process::exit(1);
        }
    }
}

/// Log to stderr so stdout stays clean for `credvault get`.
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new("credvault=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
