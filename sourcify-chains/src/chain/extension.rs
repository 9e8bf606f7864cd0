//! Service-specific chain overrides.
//!
//! The extension table is authored as TOML ([`BUNDLED_EXTENSIONS`] ships with
//! the binary) and keyed by decimal chain id:
//!
//! ```toml
//! [chains."1"]
//! supported = true
//! explorer = { kind = "etherscan-api", api_url = "https://api.etherscan.io", api_key_env = "ETHERSCAN_API_KEY" }
//! rpc = { alchemy = "mainnet", family = "eth", own_node = true }
//!
//! [chains."11297108109"]
//! supported = true
//! explorer = { kind = "blockscout", url = "https://explorer.palm.io/" }
//! rpc = ["https://palm-mainnet.infura.io/v3/{INFURA_API_KEY}"]
//! ```
//!
//! [`ExtensionTable::resolve`] expands templates and credentials into
//! [`ChainOverride`]s once, before the registry is built.

use std::collections::BTreeMap;
use std::ops::Deref;
use std::path::Path;

use serde::Deserialize;

use super::explorer::{ETHERSCAN_REGEX, ExplorerSpec};
use super::rpc::{
    Credentials, INFURA_API_KEY, ProviderFamily, RpcEndpoint, build_alchemy_and_custom_rpc_urls,
    substitute_credential,
};
use crate::error::Error;

/// Extension table compiled into the binary.
pub const BUNDLED_EXTENSIONS: &str = include_str!("../../data/extensions.toml");

/// RPC override as written in the extension table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RpcSpec {
    /// Literal URLs. `{INFURA_API_KEY}` placeholders are substituted.
    Urls(Vec<String>),
    /// Alchemy network, optionally preceded by the operator's own node.
    Alchemy {
        /// Network part of the Alchemy host, e.g. `mainnet` or `goerli`.
        alchemy: String,
        /// Provider family.
        family: ProviderFamily,
        /// Prefer the node in `NODE_URL_<ALCHEMY>`.
        #[serde(default)]
        own_node: bool,
    },
}

/// Named transaction pattern set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxRegexPreset {
    /// [`ETHERSCAN_REGEX`].
    Etherscan,
}

/// Transaction patterns as written in the extension table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TxRegexSpec {
    /// A named preset.
    Preset(TxRegexPreset),
    /// Explicit patterns, tried in order.
    Patterns(Vec<String>),
}

impl TxRegexSpec {
    fn patterns(&self) -> Vec<String> {
        match self {
            Self::Preset(TxRegexPreset::Etherscan) => vec![ETHERSCAN_REGEX.to_owned()],
            Self::Patterns(patterns) => patterns.clone(),
        }
    }
}

/// One `[chains."<id>"]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtensionEntry {
    /// Whether new verifications are accepted.
    pub supported: bool,
    /// Explorer used to find creation transactions.
    #[serde(default)]
    pub explorer: Option<ExplorerSpec>,
    /// Patterns replacing the explorer's defaults.
    #[serde(default)]
    pub tx_regex: Option<TxRegexSpec>,
    /// GraphQL endpoint used instead of an explorer.
    #[serde(default)]
    pub graphql_fetch_address: Option<String>,
    /// RPC override.
    #[serde(default)]
    pub rpc: Option<RpcSpec>,
}

impl ExtensionEntry {
    /// Expand templates and credentials for chain `chain_id`.
    #[must_use]
    pub fn resolve(&self, chain_id: &str, credentials: &dyn Credentials) -> ChainOverride {
        let fetch = self
            .explorer
            .as_ref()
            .map(|explorer| explorer.resolve(chain_id, credentials))
            .unwrap_or_default();
        let rpc = self.rpc.as_ref().and_then(|rpc| match rpc {
            RpcSpec::Urls(urls) => Some(
                urls.iter()
                    .map(|url| {
                        RpcEndpoint::Url(substitute_credential(url, INFURA_API_KEY, credentials))
                    })
                    .collect(),
            ),
            RpcSpec::Alchemy {
                alchemy,
                family,
                own_node,
            } => build_alchemy_and_custom_rpc_urls(alchemy, *family, *own_node, credentials),
        });

        ChainOverride {
            supported: self.supported,
            contract_fetch_address: fetch.contract_fetch_address,
            tx_regex: self
                .tx_regex
                .as_ref()
                .map(TxRegexSpec::patterns)
                .or(fetch.tx_regex),
            rpc,
            graphql_fetch_address: self.graphql_fetch_address.clone(),
        }
    }
}

/// Parsed extension table, before credentials are applied.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtensionTable {
    /// Entries keyed by decimal chain id.
    #[serde(default)]
    pub chains: BTreeMap<String, ExtensionEntry>,
}

impl ExtensionTable {
    /// Parse an extension table document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Extensions`] on malformed TOML or unknown fields.
    pub fn from_toml(document: &str) -> Result<Self, Error> {
        toml::from_str(document)
            .map_err(|e| Error::extensions(format!("failed to parse extension table: {e}")))
    }

    /// The table shipped with the binary.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Extensions`] if the bundled document is malformed.
    pub fn bundled() -> Result<Self, Error> {
        Self::from_toml(BUNDLED_EXTENSIONS)
    }

    /// Read and parse an extension table file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Extensions`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::extensions(format!("failed to read '{}': {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Resolve every entry against `credentials`.
    #[must_use]
    pub fn resolve(&self, credentials: &dyn Credentials) -> ChainExtensions {
        self.chains
            .iter()
            .map(|(chain_id, entry)| (chain_id.clone(), entry.resolve(chain_id, credentials)))
            .collect()
    }
}

/// Resolved override for a single chain.
///
/// Fields left as `None` fall back to the catalog record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainOverride {
    /// Whether new verifications are accepted.
    pub supported: bool,
    /// Creation-transaction lookup URL, containing `${ADDRESS}`.
    pub contract_fetch_address: Option<String>,
    /// Patterns extracting the creation transaction hash, tried in order.
    pub tx_regex: Option<Vec<String>>,
    /// RPC endpoints replacing the catalog's list.
    pub rpc: Option<Vec<RpcEndpoint>>,
    /// GraphQL endpoint used instead of an explorer.
    pub graphql_fetch_address: Option<String>,
}

impl ChainOverride {
    /// Override that only sets the supported flag.
    #[must_use]
    pub fn new(supported: bool) -> Self {
        Self {
            supported,
            ..Self::default()
        }
    }

    /// Sets the RPC endpoints.
    #[must_use]
    pub fn with_rpc(mut self, rpc: Vec<RpcEndpoint>) -> Self {
        self.rpc = Some(rpc);
        self
    }

    /// Sets the contract fetch address.
    #[must_use]
    pub fn with_contract_fetch_address(mut self, address: impl Into<String>) -> Self {
        self.contract_fetch_address = Some(address.into());
        self
    }
}

/// Resolved overrides keyed by decimal chain id.
#[derive(Debug, Clone, Default)]
pub struct ChainExtensions(pub BTreeMap<String, ChainOverride>);

impl Deref for ChainExtensions {
    type Target = BTreeMap<String, ChainOverride>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<K: Into<String>> FromIterator<(K, ChainOverride)> for ChainExtensions {
    fn from_iter<I: IntoIterator<Item = (K, ChainOverride)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}
