//! Canonical chain records, as published in chainid.network's `chains.json`.

use std::ops::Deref;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Native currency of a chain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    /// Currency name, e.g. `Ether`.
    pub name: String,
    /// Ticker symbol, e.g. `ETH`.
    pub symbol: String,
    /// Number of decimals.
    pub decimals: u8,
}

/// Block explorer listed in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogExplorer {
    /// Explorer name.
    pub name: String,
    /// Explorer base URL.
    pub url: String,
    /// Explorer standard, e.g. `EIP3091`.
    #[serde(default)]
    pub standard: Option<String>,
}

/// One chain in the catalog.
///
/// Fields the registry does not use are ignored when parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainRecord {
    /// Display name.
    pub name: String,
    /// Chain family label, e.g. `ETH`.
    #[serde(default)]
    pub chain: String,
    /// Long-form name, e.g. `Ethereum Testnet Goerli`.
    #[serde(default)]
    pub title: Option<String>,
    /// Short name, e.g. `gor`.
    #[serde(default)]
    pub short_name: String,
    /// EIP-155 chain id.
    pub chain_id: u64,
    /// Network id, usually equal to the chain id.
    #[serde(default)]
    pub network_id: Option<u64>,
    /// Native currency.
    #[serde(default)]
    pub native_currency: NativeCurrency,
    /// Public RPC URLs.
    #[serde(default)]
    pub rpc: Vec<String>,
    /// Faucet URLs.
    #[serde(default)]
    pub faucets: Vec<String>,
    /// Project homepage.
    #[serde(default, rename = "infoURL")]
    pub info_url: Option<String>,
    /// Block explorers.
    #[serde(default)]
    pub explorers: Vec<CatalogExplorer>,
    /// Network classification, e.g. `mainnet` or `testnet`.
    #[serde(default)]
    pub network: Option<String>,
}

impl ChainRecord {
    /// Minimal record with only an id and a name.
    #[must_use]
    pub fn new(chain_id: u64, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            chain: String::new(),
            title: None,
            short_name: String::new(),
            chain_id,
            network_id: Some(chain_id),
            native_currency: NativeCurrency::default(),
            rpc: Vec::new(),
            faucets: Vec::new(),
            info_url: None,
            explorers: Vec::new(),
            network: None,
        }
    }
}

/// Ordered list of [`ChainRecord`]s.
#[derive(Debug, Clone, Default)]
pub struct Catalog(pub Vec<ChainRecord>);

impl Deref for Catalog {
    type Target = Vec<ChainRecord>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<ChainRecord>> for Catalog {
    fn from(records: Vec<ChainRecord>) -> Self {
        Self(records)
    }
}

impl Catalog {
    /// Parse a `chains.json` document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Catalog`] if the document is not a JSON array of
    /// chain records.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        serde_json::from_str(json)
            .map(Self)
            .map_err(|e| Error::catalog_with("failed to parse chains catalog", e))
    }

    /// Read and parse a `chains.json` file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Catalog`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::catalog_with(format!("failed to read '{}'", path.display()), e)
        })?;
        Self::from_json(&content)
    }
}
