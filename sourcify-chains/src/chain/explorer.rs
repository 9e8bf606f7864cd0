//! Block explorer templates used to find a contract's creation transaction.
//!
//! A fetch address keeps the literal `${ADDRESS}` token; the verifier
//! substitutes the contract address at request time and, for HTML explorers,
//! runs the `txRegex` patterns over the response in order.

use serde::Deserialize;

use super::rpc::Credentials;

/// Token replaced with the contract address by the consumer.
pub const ADDRESS_TOKEN: &str = "${ADDRESS}";

/// Pattern matching the creation transaction on etherscan-like pages.
pub const ETHERSCAN_REGEX: &str = "at txn.*href=.*/tx/(0x.{64})";

const ETHERSCAN_SUFFIX: &str = "address/${ADDRESS}";
const ETHERSCAN_API_SUFFIX: &str =
    "/api?module=contract&action=getcontractcreation&contractaddresses=${ADDRESS}&apikey=";
const BLOCKSSCAN_SUFFIX: &str = "api/accounts/${ADDRESS}";
const BLOCKSCOUT_SUFFIX: &str = "address/${ADDRESS}/transactions";
const BLOCKSCOUT_REGEX_OLD: &str = "transaction_hash_link\" href=\"${BLOCKSCOUT_PREFIX}/tx/(.*?)\"";
const BLOCKSCOUT_REGEX_NEW: &str = "at txn.*href.*/tx/(0x.{64}?)";
const TELOS_SUFFIX: &str = "v2/evm/get_contract?contract=${ADDRESS}";
const METER_SUFFIX: &str = "api/accounts/${ADDRESS}";
const AVALANCHE_GLACIER_URL: &str = "https://glacier-api.avax.network/v1/chains/";
const AVALANCHE_SUBNET_SUFFIX: &str = "contracts/${ADDRESS}/transactions:getDeployment";

/// Explorer flavour of a chain, as written in the extension table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ExplorerSpec {
    /// Etherscan-style HTML explorer.
    Etherscan {
        /// Explorer base URL, with trailing slash.
        url: String,
        /// Whether the page is scraped with [`ETHERSCAN_REGEX`].
        #[serde(default = "default_true")]
        scrape: bool,
    },
    /// Etherscan API with the contract creation endpoint.
    EtherscanApi {
        /// API base URL, without trailing slash.
        api_url: String,
        /// Name of the variable holding the API key.
        api_key_env: String,
    },
    /// Blockscout HTML explorer.
    Blockscout {
        /// Explorer base URL, with trailing slash.
        url: String,
        /// Path prefix of the instance, e.g. `/xdai/mainnet`.
        #[serde(default)]
        prefix: String,
    },
    /// `BlocksScan` JSON API.
    Blocksscan {
        /// API base URL, with trailing slash.
        url: String,
    },
    /// Meter JSON API.
    Meter {
        /// API base URL, with trailing slash.
        url: String,
    },
    /// Teloscan JSON API.
    Telos {
        /// API base URL, with trailing slash.
        url: String,
    },
    /// Avalanche subnet served by the Glacier API.
    AvalancheSubnet,
}

const fn default_true() -> bool {
    true
}

/// Fetch address and scraping patterns derived from an [`ExplorerSpec`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExplorerFetch {
    /// Creation-transaction lookup URL, containing [`ADDRESS_TOKEN`].
    pub contract_fetch_address: Option<String>,
    /// Patterns extracting the transaction hash, tried in order.
    pub tx_regex: Option<Vec<String>>,
}

impl ExplorerSpec {
    /// Expand the template for chain `chain_id`.
    ///
    /// Only [`ExplorerSpec::EtherscanApi`] consults `credentials`; a missing
    /// key is logged and leaves `apikey=` empty.
    #[must_use]
    pub fn resolve(&self, chain_id: &str, credentials: &dyn Credentials) -> ExplorerFetch {
        match self {
            Self::Etherscan { url, scrape } => ExplorerFetch {
                contract_fetch_address: Some(format!("{url}{ETHERSCAN_SUFFIX}")),
                tx_regex: scrape.then(|| vec![ETHERSCAN_REGEX.to_owned()]),
            },
            Self::EtherscanApi {
                api_url,
                api_key_env,
            } => {
                let key = credentials.get(api_key_env).unwrap_or_else(|| {
                    tracing::warn!("Environment variable {api_key_env} not set for chain {chain_id}!");
                    String::new()
                });
                fetch_only(format!("{api_url}{ETHERSCAN_API_SUFFIX}{key}"))
            }
            Self::Blockscout { url, prefix } => ExplorerFetch {
                contract_fetch_address: Some(format!("{url}{BLOCKSCOUT_SUFFIX}")),
                tx_regex: Some(blockscout_regex(prefix).into()),
            },
            Self::Blocksscan { url } => fetch_only(format!("{url}{BLOCKSSCAN_SUFFIX}")),
            Self::Meter { url } => fetch_only(format!("{url}{METER_SUFFIX}")),
            Self::Telos { url } => fetch_only(format!("{url}{TELOS_SUFFIX}")),
            Self::AvalancheSubnet => fetch_only(format!(
                "{AVALANCHE_GLACIER_URL}{chain_id}/{AVALANCHE_SUBNET_SUFFIX}"
            )),
        }
    }
}

fn fetch_only(contract_fetch_address: String) -> ExplorerFetch {
    ExplorerFetch {
        contract_fetch_address: Some(contract_fetch_address),
        tx_regex: None,
    }
}

/// Blockscout patterns for an instance served under `prefix`.
///
/// Returns the legacy pattern first, then the current one. Consumers must
/// try both, in this order.
#[must_use]
pub fn blockscout_regex(prefix: &str) -> [String; 2] {
    [
        BLOCKSCOUT_REGEX_OLD.replace("${BLOCKSCOUT_PREFIX}", prefix),
        BLOCKSCOUT_REGEX_NEW.to_owned(),
    ]
}
