//! The chain registry: catalog records merged with their overrides.
//!
//! A [`Registry`] is built once at startup and never changes afterwards. It
//! holds four views over the same chains: every chain and the supported
//! subset, each as a map keyed by decimal chain id and as a display-sorted
//! list.
//!
//! ```ignore
//! let table = ExtensionTable::bundled()?;
//! let registry = Registry::from_sources(&catalog, &table, &EnvCredentials, Mode::Production)?;
//! registry.check_supported_chain_id("1")?;
//! ```

mod build;
mod sort;

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use self::build::{LOCAL_CHAIN_IDS, local_chains};
pub use self::sort::{PRIMARY_CHAIN_IDS, sort_chains};
use crate::chain::{
    CatalogExplorer, ChainExtensions, ChainOverride, ChainRecord, Credentials, ExtensionTable,
    NativeCurrency, RpcEndpoint,
};
use crate::error::Error;

/// Chain id accepted by [`Registry::check_sourcify_chain_id`] without lookup.
pub const WILDCARD_CHAIN_ID: &str = "0";

/// Deployment mode.
///
/// Local development chains are only registered outside production.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Public deployment.
    Production,
    /// Local development and tests.
    #[default]
    Development,
}

impl Mode {
    /// Interpret an environment value; anything but `production` is development.
    #[must_use]
    pub fn from_env_value(value: &str) -> Self {
        if value.trim() == "production" {
            Self::Production
        } else {
            Self::Development
        }
    }

    /// Whether this is [`Mode::Production`].
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

/// A chain known to the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcifyChain {
    /// EIP-155 chain id.
    pub chain_id: u64,
    /// Display name.
    pub name: String,
    /// Long-form name.
    pub title: Option<String>,
    /// Short name.
    pub short_name: String,
    /// Chain family label.
    pub chain: String,
    /// Network id.
    pub network_id: Option<u64>,
    /// Native currency.
    pub native_currency: NativeCurrency,
    /// Network classification, e.g. `testnet`.
    pub network: Option<String>,
    /// Project homepage.
    pub info_url: Option<String>,
    /// Faucet URLs.
    pub faucets: Vec<String>,
    /// Block explorers from the catalog.
    pub explorers: Vec<CatalogExplorer>,
    /// RPC endpoints in priority order.
    pub rpc: Vec<RpcEndpoint>,
    /// Whether new verifications are accepted.
    pub supported: bool,
    /// Creation-transaction lookup URL, containing `${ADDRESS}`.
    pub contract_fetch_address: Option<String>,
    /// Patterns extracting the creation transaction hash, tried in order.
    pub tx_regex: Option<Vec<String>>,
    /// GraphQL endpoint used instead of an explorer.
    pub graphql_fetch_address: Option<String>,
}

impl SourcifyChain {
    /// Merge a catalog record with its override.
    ///
    /// The override's RPC list replaces the catalog's as a whole, and only
    /// when it has at least one endpoint.
    #[must_use]
    pub fn merge(record: &ChainRecord, ext: &ChainOverride) -> Self {
        let rpc = match &ext.rpc {
            Some(rpc) if !rpc.is_empty() => rpc.clone(),
            _ => record
                .rpc
                .iter()
                .map(|url| RpcEndpoint::Url(url.clone()))
                .collect(),
        };
        Self {
            chain_id: record.chain_id,
            name: record.name.clone(),
            title: record.title.clone(),
            short_name: record.short_name.clone(),
            chain: record.chain.clone(),
            network_id: record.network_id,
            native_currency: record.native_currency.clone(),
            network: record.network.clone(),
            info_url: record.info_url.clone(),
            faucets: record.faucets.clone(),
            explorers: record.explorers.clone(),
            rpc,
            supported: ext.supported,
            contract_fetch_address: ext.contract_fetch_address.clone(),
            tx_regex: ext.tx_regex.clone(),
            graphql_fetch_address: ext.graphql_fetch_address.clone(),
        }
    }

    /// Registry key of this chain.
    #[must_use]
    pub fn key(&self) -> String {
        self.chain_id.to_string()
    }
}

/// Public JSON representation of a [`SourcifyChain`].
///
/// RPC endpoints are left out: they may embed provider keys or point at
/// access-controlled nodes.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainView<'a> {
    /// EIP-155 chain id.
    pub chain_id: u64,
    /// Display name.
    pub name: &'a str,
    /// Long-form name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<&'a str>,
    /// Short name.
    pub short_name: &'a str,
    /// Network classification.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<&'a str>,
    /// Whether new verifications are accepted.
    pub supported: bool,
    /// Creation-transaction lookup URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_fetch_address: Option<&'a str>,
    /// Creation-transaction patterns.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_regex: Option<&'a [String]>,
    /// GraphQL lookup endpoint.
    #[serde(rename = "graphQLFetchAddress", skip_serializing_if = "Option::is_none")]
    pub graphql_fetch_address: Option<&'a str>,
}

impl<'a> From<&'a SourcifyChain> for ChainView<'a> {
    fn from(chain: &'a SourcifyChain) -> Self {
        Self {
            chain_id: chain.chain_id,
            name: &chain.name,
            title: chain.title.as_deref(),
            short_name: &chain.short_name,
            network: chain.network.as_deref(),
            supported: chain.supported,
            contract_fetch_address: chain.contract_fetch_address.as_deref(),
            tx_regex: chain.tx_regex.as_deref(),
            graphql_fetch_address: chain.graphql_fetch_address.as_deref(),
        }
    }
}

/// Read-only chain registry.
#[derive(Debug, Clone)]
pub struct Registry {
    chains: HashMap<String, Arc<SourcifyChain>>,
    sorted: Vec<Arc<SourcifyChain>>,
    supported: HashMap<String, Arc<SourcifyChain>>,
    supported_sorted: Vec<Arc<SourcifyChain>>,
}

impl Registry {
    /// Build the registry from catalog records and resolved overrides.
    ///
    /// Outside production the local development chains are registered first
    /// and shadow catalog records with the same id. Catalog chains without an
    /// override are left out.
    ///
    /// # Errors
    ///
    /// - [`Error::DuplicateChainId`] if a catalog record repeats the id of a
    ///   chain already registered. Repeats of ids without an override are
    ///   ignored.
    /// - [`Error::OrphanedExtensions`] if overrides reference chains missing
    ///   from the catalog; all such ids are reported at once.
    pub fn build(
        catalog: &[ChainRecord],
        extensions: &ChainExtensions,
        mode: Mode,
    ) -> Result<Self, Error> {
        let chains = build::build_chains(catalog, extensions, mode)?;
        let registry = Self::from_chains(chains);
        tracing::info!(
            chains = registry.len(),
            supported = registry.supported_chains().len(),
            ?mode,
            "chain registry built"
        );
        Ok(registry)
    }

    /// Resolve `table` against `credentials`, then [`Registry::build`].
    ///
    /// # Errors
    ///
    /// See [`Registry::build`].
    pub fn from_sources(
        catalog: &[ChainRecord],
        table: &ExtensionTable,
        credentials: &dyn Credentials,
        mode: Mode,
    ) -> Result<Self, Error> {
        Self::build(catalog, &table.resolve(credentials), mode)
    }

    fn from_chains(chains: Vec<SourcifyChain>) -> Self {
        let sorted: Vec<_> = sort_chains(chains).into_iter().map(Arc::new).collect();
        let supported_sorted: Vec<_> = sorted
            .iter()
            .filter(|chain| chain.supported)
            .cloned()
            .collect();
        let by_key = |chains: &[Arc<SourcifyChain>]| {
            chains
                .iter()
                .map(|chain| (chain.key(), Arc::clone(chain)))
                .collect::<HashMap<_, _>>()
        };
        Self {
            chains: by_key(&sorted),
            supported: by_key(&supported_sorted),
            sorted,
            supported_sorted,
        }
    }

    /// Number of registered chains.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    /// Whether no chain is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    /// Look up any registered chain.
    #[must_use]
    pub fn get(&self, chain_id: &str) -> Option<&SourcifyChain> {
        self.chains.get(chain_id).map(Arc::as_ref)
    }

    /// Look up a chain that accepts new verifications.
    #[must_use]
    pub fn get_supported(&self, chain_id: &str) -> Option<&SourcifyChain> {
        self.supported.get(chain_id).map(Arc::as_ref)
    }

    /// All chains, display sorted.
    #[must_use]
    pub fn chains(&self) -> &[Arc<SourcifyChain>] {
        &self.sorted
    }

    /// Supported chains, display sorted.
    #[must_use]
    pub fn supported_chains(&self) -> &[Arc<SourcifyChain>] {
        &self.supported_sorted
    }

    /// All chains keyed by decimal chain id.
    #[must_use]
    pub const fn chain_map(&self) -> &HashMap<String, Arc<SourcifyChain>> {
        &self.chains
    }

    /// Supported chains keyed by decimal chain id.
    #[must_use]
    pub const fn supported_chain_map(&self) -> &HashMap<String, Arc<SourcifyChain>> {
        &self.supported
    }

    /// Succeeds if `chain_id` accepts new verifications.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedChain`] if the chain is unknown or
    /// registered but not supported.
    pub fn check_supported_chain_id(&self, chain_id: &str) -> Result<(), Error> {
        if self.supported.contains_key(chain_id) {
            Ok(())
        } else {
            Err(Error::UnsupportedChain(chain_id.to_owned()))
        }
    }

    /// Succeeds if `chain_id` is registered, supported or not, or is the
    /// wildcard id [`WILDCARD_CHAIN_ID`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownChain`] otherwise.
    pub fn check_sourcify_chain_id(&self, chain_id: &str) -> Result<(), Error> {
        if chain_id == WILDCARD_CHAIN_ID || self.chains.contains_key(chain_id) {
            Ok(())
        } else {
            Err(Error::UnknownChain(chain_id.to_owned()))
        }
    }
}
