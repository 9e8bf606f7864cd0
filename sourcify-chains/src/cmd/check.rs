//! `sourcify-chains check`: validate a chain id.

use std::path::Path;

use sourcify_chains::chain::EnvCredentials;
use sourcify_chains::{Error, Registry};

use crate::config::load_config;

/// Execute the `check` command.
///
/// # Errors
///
/// Returns the registry's rejection when the id does not pass.
pub fn run(config_path: &Path, chain_id: &str, supported: bool) -> Result<(), Error> {
    super::init_console_logging("warn");
    let registry = load_config(config_path)?.load_registry(&EnvCredentials)?;
    let verdict = check(&registry, chain_id, supported)?;
    super::write_output(std::io::stdout().lock(), &format!("{verdict}\n"))
}

fn check(registry: &Registry, chain_id: &str, supported: bool) -> Result<String, Error> {
    if supported {
        registry.check_supported_chain_id(chain_id)?;
        Ok(format!("Chain {chain_id} is supported for verification"))
    } else {
        registry.check_sourcify_chain_id(chain_id)?;
        Ok(format!("Chain {chain_id} is a Sourcify chain"))
    }
}
