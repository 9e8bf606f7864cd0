//! CLI definitions and command implementations.

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use sourcify_chains::Error;
use tracing_subscriber::EnvFilter;

pub mod check;
pub mod init;
pub mod list;
pub mod serve;

/// Sourcify chain registry: list, check and serve the chains Sourcify knows.
#[derive(Debug, Parser)]
#[command(name = "sourcify-chains")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate a default TOML configuration file.
    Init {
        /// Output path for the configuration file.
        #[arg(short, long, default_value = "config.toml")]
        output: PathBuf,

        /// Overwrite the file if it already exists.
        #[arg(long, default_value_t = false)]
        force: bool,
    },

    /// Print the registered chains in display order.
    List {
        /// Path to the TOML configuration file.
        #[arg(short, long, env = "CONFIG", default_value = "config.toml")]
        config: PathBuf,

        /// Only chains supported for verification.
        #[arg(long, default_value_t = false)]
        supported: bool,

        /// Emit JSON instead of a table.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Check a chain id against the registry.
    Check {
        /// Chain id, as a decimal string.
        chain_id: String,

        /// Path to the TOML configuration file.
        #[arg(short, long, env = "CONFIG", default_value = "config.toml")]
        config: PathBuf,

        /// Require the chain to be supported for verification.
        #[arg(long, default_value_t = false)]
        supported: bool,
    },

    /// Start the registry HTTP server.
    Serve {
        /// Path to the TOML configuration file.
        #[arg(short, long, env = "CONFIG", default_value = "config.toml")]
        config: PathBuf,
    },
}

/// Log to stderr, filtered by `RUST_LOG` or `default_directive`.
pub fn init_console_logging(default_directive: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    // A subscriber may already be installed, e.g. by a test harness.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Write command output, reporting a closed or failing stream as
/// [`Error::Output`].
pub fn write_output(mut out: impl Write, text: &str) -> Result<(), Error> {
    out.write_all(text.as_bytes())
        .and_then(|()| out.flush())
        .map_err(|e| Error::output_with("failed to write to stdout", e))
}
