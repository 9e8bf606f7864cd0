//! Sourcify chain registry
//!
//! A CLI and HTTP server over the chains Sourcify knows about: the
//! chainid.network catalog merged with Sourcify's extension table.
//!
//! ```sh
//! sourcify-chains init              # Generate default config.toml
//! sourcify-chains list --supported  # Print supported chains
//! sourcify-chains check 11155111    # Validate a chain id
//! sourcify-chains serve             # Start the server
//! ```

mod cmd;
mod config;
mod routes;
mod signal;
#[cfg(feature = "telemetry")]
mod telemetry;

use clap::Parser;
use cmd::{Cli, Commands};
use dotenvy::dotenv;

#[tokio::main]
#[allow(clippy::print_stderr)]
async fn main() {
    // Before parsing, so `.env` can provide CONFIG.
    dotenv().ok();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { output, force } => cmd::init::run(&output, force),
        Commands::List {
            config,
            supported,
            json,
        } => cmd::list::run(&config, supported, json),
        Commands::Check {
            chain_id,
            config,
            supported,
        } => cmd::check::run(&config, &chain_id, supported),
        Commands::Serve { config } => cmd::serve::run(&config).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
