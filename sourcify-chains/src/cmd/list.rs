//! `sourcify-chains list`: print the registry in display order.

use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;

use sourcify_chains::chain::EnvCredentials;
use sourcify_chains::{ChainView, Error, SourcifyChain};

use crate::config::load_config;

/// Execute the `list` command.
///
/// # Errors
///
/// Returns an error if the registry cannot be built or stdout is closed.
pub fn run(config_path: &Path, supported_only: bool, json: bool) -> Result<(), Error> {
    super::init_console_logging("warn");
    let registry = load_config(config_path)?.load_registry(&EnvCredentials)?;
    let chains = if supported_only {
        registry.supported_chains()
    } else {
        registry.chains()
    };

    let output = if json {
        render_json(chains)?
    } else {
        render_table(chains)
    };
    super::write_output(std::io::stdout().lock(), &output)
}

fn render_json(chains: &[Arc<SourcifyChain>]) -> Result<String, Error> {
    let views: Vec<ChainView<'_>> = chains.iter().map(|c| ChainView::from(c.as_ref())).collect();
    let mut json = serde_json::to_string_pretty(&views)
        .map_err(|e| Error::output_with("failed to encode chains as JSON", e))?;
    json.push('\n');
    Ok(json)
}

fn render_table(chains: &[Arc<SourcifyChain>]) -> String {
    let mut table = String::new();
    for chain in chains {
        let status = if chain.supported { "supported" } else { "-" };
        let _ = writeln!(table, "{:>10}  {status:<9}  {}", chain.chain_id, chain.name);
    }
    table
}
