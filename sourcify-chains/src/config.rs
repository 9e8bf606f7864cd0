//! Configuration loading and default template generation.
//!
//! # Configuration File Format
//!
//! ```toml
//! host = "0.0.0.0"
//! port = 5555
//! mode = "production"
//! catalog = "chains.json"
//! # extensions = "extensions.toml"
//! ```
//!
//! Relative paths are resolved against the directory of the config file.

use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use sourcify_chains::chain::{Catalog, Credentials, ExtensionTable};
use sourcify_chains::{Error, Mode, Registry};

const DEFAULT_PORT: u16 = 5555;

/// Service configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default = "default_host")]
    host: IpAddr,
    #[serde(default = "default_port")]
    port: u16,
    #[serde(default = "default_mode")]
    mode: Mode,
    catalog: PathBuf,
    #[serde(default)]
    extensions: Option<PathBuf>,
}

fn default_host() -> IpAddr {
    std::env::var("HOST")
        .ok()
        .and_then(|host| host.parse().ok())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

fn default_port() -> u16 {
    std::env::var("PORT")
        .ok()
        .and_then(|port| port.parse().ok())
        .unwrap_or(DEFAULT_PORT)
}

/// Variables consulted for the mode, in order. `NODE_ENV` is what existing
/// Sourcify deployments set.
const MODE_VARS: [&str; 2] = ["SOURCIFY_ENV", "NODE_ENV"];

fn default_mode() -> Mode {
    mode_from(|name| std::env::var(name).ok())
}

fn mode_from(lookup: impl Fn(&str) -> Option<String>) -> Mode {
    MODE_VARS
        .iter()
        .find_map(|name| lookup(name).filter(|value| !value.trim().is_empty()))
        .map(|value| Mode::from_env_value(&value))
        .unwrap_or_default()
}

impl Config {
    /// Bind address.
    #[must_use]
    pub const fn host(&self) -> IpAddr {
        self.host
    }

    /// Bind port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Deployment mode.
    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// Path of the chains catalog.
    #[must_use]
    pub fn catalog(&self) -> &Path {
        &self.catalog
    }

    /// Path of an extension table replacing the bundled one.
    #[must_use]
    pub fn extensions(&self) -> Option<&Path> {
        self.extensions.as_deref()
    }

    /// Load the catalog and extension table, then build the registry.
    ///
    /// # Errors
    ///
    /// Returns an error if either source cannot be loaded or the registry
    /// fails its integrity checks.
    pub fn load_registry(&self, credentials: &dyn Credentials) -> Result<Registry, Error> {
        let catalog = Catalog::load(self.catalog())?;
        let table = match self.extensions() {
            Some(path) => ExtensionTable::load(path)?,
            None => ExtensionTable::bundled()?,
        };
        tracing::debug!(
            catalog = %self.catalog().display(),
            records = catalog.len(),
            extensions = table.chains.len(),
            "registry sources loaded"
        );
        Registry::from_sources(&catalog, &table, credentials, self.mode)
    }

    fn resolve_paths(&mut self, base: &Path) {
        self.catalog = base.join(&self.catalog);
        if let Some(extensions) = &self.extensions {
            self.extensions = Some(base.join(extensions));
        }
    }
}

/// Load configuration from a TOML file at the given path.
///
/// `host`, `port`, and `mode` fall back to the `HOST`, `PORT`, and
/// `SOURCIFY_ENV` (else `NODE_ENV`) environment variables, then to built-in
/// defaults.
///
/// # Errors
///
/// Returns an error if the file cannot be resolved, read, or parsed.
pub fn load_config(path: &Path) -> Result<Config, Error> {
    let config_path = path.canonicalize().map_err(|e| {
        Error::config_with(format!("failed to resolve config path '{}'", path.display()), e)
    })?;
    let content = std::fs::read_to_string(&config_path).map_err(|e| {
        Error::config_with(format!("failed to read config file '{}'", config_path.display()), e)
    })?;
    let mut config: Config = toml::from_str(&content).map_err(|e| {
        Error::config_with(format!("failed to parse TOML config '{}'", config_path.display()), e)
    })?;
    if let Some(base) = config_path.parent() {
        config.resolve_paths(base);
    }
    Ok(config)
}

/// Generate a default TOML configuration template.
#[must_use]
pub fn generate_default_config() -> String {
    format!(
        r#"# Sourcify chain registry configuration

# Server bind address and port.
# Can also be set via HOST / PORT environment variables.
host = "0.0.0.0"
port = {DEFAULT_PORT}

# "production" leaves out the local Ganache (1337) and Hardhat (31337) chains.
# Defaults to the SOURCIFY_ENV environment variable, then NODE_ENV,
# else "development".
mode = "development"

# chainid.network chains.json
catalog = "chains.json"

# Replace the bundled extension table.
# extensions = "extensions.toml"

# Credentials are read from the environment (or .env):
#   ALCHEMY_API_KEY, ALCHEMY_API_KEY_OPTIMISM, ALCHEMY_API_KEY_ARBITRUM,
#   INFURA_API_KEY, NODE_URL_<NETWORK>, CF_ACCESS_CLIENT_ID,
#   CF_ACCESS_CLIENT_SECRET, and the explorer keys named by `api_key_env`.
"#
    )
}
