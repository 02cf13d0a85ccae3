use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pocketchat::{run_repl_mode, setup_from_cli, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    // Diagnostics go to stderr so they never interleave with the chat thread
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let app_config = setup_from_cli(&cli)?;

    // If a subcommand was provided, execute it and exit
    if let Some(ref command) = cli.command {
        let result = command.execute(&app_config)?;
        println!("{}", result);
        return Ok(());
    }

    run_repl_mode(app_config).await
}
