use clap::Parser;
use haven::Config;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod output;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    // Diagnostics go to stderr so stdout stays machine-readable.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("haven=info")),
        )
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &cli.config {
        Some(path) => Config::load(path).await?,
        None => Config::default(),
    };
    let format = cli.format;

    match &cli.command {
        Commands::Keygen => commands::keys::keygen(format),
        Commands::Inspect(args) => commands::keys::inspect(args, format),
        Commands::Seal(args) => commands::record::seal(args, &config, format).await,
        Commands::Unseal(args) => commands::record::unseal(args, &config, format).await,
        Commands::Wrap(args) => commands::message::wrap(args, &config).await,
        Commands::Unwrap(args) => commands::message::unwrap(args, format).await,
    }
}
