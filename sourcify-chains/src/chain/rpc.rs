//! RPC endpoint descriptors and the credentialed URL builder.
//!
//! Endpoint lists are priority ordered: the operator's own node (if any)
//! comes first, then the Alchemy URL for the network.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::BuildHasher;

use serde::Deserialize;
use url::Url;

/// Generic Alchemy key, used when no family-specific key is set.
pub const ALCHEMY_API_KEY: &str = "ALCHEMY_API_KEY";
/// Key substituted into `{INFURA_API_KEY}` placeholders.
pub const INFURA_API_KEY: &str = "INFURA_API_KEY";
/// Cloudflare Access client id sent to the operator's own nodes.
pub const CF_ACCESS_CLIENT_ID: &str = "CF_ACCESS_CLIENT_ID";
/// Cloudflare Access client secret sent to the operator's own nodes.
pub const CF_ACCESS_CLIENT_SECRET: &str = "CF_ACCESS_CLIENT_SECRET";

const ALCHEMY_DOMAIN: &str = "g.alchemy.com";

/// Named secret lookup.
///
/// Implemented for the process environment and for plain maps, so the
/// registry can be built in tests without touching environment variables.
pub trait Credentials {
    /// Returns the value stored under `name`, or `None` when it is absent.
    fn get(&self, name: &str) -> Option<String>;
}

/// [`Credentials`] backed by process environment variables.
///
/// Blank values are treated as unset.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvCredentials;

impl Credentials for EnvCredentials {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok().filter(|v| !v.trim().is_empty())
    }
}

impl<S: BuildHasher> Credentials for HashMap<String, String, S> {
    fn get(&self, name: &str) -> Option<String> {
        HashMap::get(self, name).cloned()
    }
}

impl Credentials for BTreeMap<String, String> {
    fn get(&self, name: &str) -> Option<String> {
        BTreeMap::get(self, name).cloned()
    }
}

/// A single RPC endpoint.
#[derive(Clone, PartialEq, Eq)]
pub enum RpcEndpoint {
    /// Plain URL, no extra request headers.
    Url(String),
    /// URL that must be called with the given request headers.
    WithHeaders {
        /// Endpoint URL.
        url: String,
        /// Header name/value pairs, in insertion order.
        headers: Vec<(String, String)>,
    },
}

impl RpcEndpoint {
    /// Returns the endpoint URL.
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::Url(url) | Self::WithHeaders { url, .. } => url,
        }
    }

    /// Returns the request headers required by this endpoint.
    #[must_use]
    pub fn headers(&self) -> &[(String, String)] {
        match self {
            Self::Url(_) => &[],
            Self::WithHeaders { headers, .. } => headers,
        }
    }
}

// Header values hold access secrets, so only names are printed.
impl fmt::Debug for RpcEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) => f.debug_tuple("Url").field(url).finish(),
            Self::WithHeaders { url, headers } => f
                .debug_struct("WithHeaders")
                .field("url", url)
                .field(
                    "headers",
                    &headers.iter().map(|(name, _)| name).collect::<Vec<_>>(),
                )
                .finish(),
        }
    }
}

impl From<&str> for RpcEndpoint {
    fn from(url: &str) -> Self {
        Self::Url(url.to_owned())
    }
}

/// Alchemy network family, used as the first label of the Alchemy host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderFamily {
    /// Ethereum mainnet and testnets.
    Eth,
    /// Polygon PoS.
    Polygon,
    /// Arbitrum.
    Arb,
    /// Optimism.
    Opt,
}

impl ProviderFamily {
    /// Host label of the family, e.g. `arb` in `arb-goerli.g.alchemy.com`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eth => "eth",
            Self::Polygon => "polygon",
            Self::Arb => "arb",
            Self::Opt => "opt",
        }
    }

    /// Key checked before [`ALCHEMY_API_KEY`], if the family has its own.
    #[must_use]
    pub const fn credential_var(self) -> Option<&'static str> {
        match self {
            Self::Opt => Some("ALCHEMY_API_KEY_OPTIMISM"),
            Self::Arb => Some("ALCHEMY_API_KEY_ARBITRUM"),
            Self::Eth | Self::Polygon => None,
        }
    }
}

impl fmt::Display for ProviderFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name of the variable holding the operator node URL for `sub_id`.
#[must_use]
pub fn node_url_var(sub_id: &str) -> String {
    format!("NODE_URL_{}", sub_id.to_uppercase())
}

/// Build the RPC list for an Alchemy-backed network.
///
/// With `use_own_node`, the URL in `NODE_URL_<SUB_ID>` is placed first,
/// carrying the Cloudflare Access headers. The Alchemy URL follows when a
/// key for `family` resolves. Missing variables are logged and skipped.
///
/// Returns `None` when neither endpoint could be built, which callers treat
/// as "keep the catalog RPCs".
#[must_use]
pub fn build_alchemy_and_custom_rpc_urls(
    sub_id: &str,
    family: ProviderFamily,
    use_own_node: bool,
    credentials: &dyn Credentials,
) -> Option<Vec<RpcEndpoint>> {
    let mut endpoints = Vec::new();

    if use_own_node {
        let var = node_url_var(sub_id);
        match credentials.get(&var) {
            Some(url) if Url::parse(&url).is_ok() => {
                endpoints.push(own_node_endpoint(url, credentials));
            }
            Some(url) => {
                tracing::warn!(%var, %url, "ignoring invalid node URL");
            }
            None => {
                tracing::warn!("Environment variable {var} not set!");
            }
        }
    }

    let key = family
        .credential_var()
        .and_then(|var| credentials.get(var))
        .or_else(|| credentials.get(ALCHEMY_API_KEY));
    match key {
        Some(key) => endpoints.push(RpcEndpoint::Url(format!(
            "https://{family}-{sub_id}.{ALCHEMY_DOMAIN}/v2/{key}"
        ))),
        None => {
            tracing::warn!("Environment variable {ALCHEMY_API_KEY} not set for {family} {sub_id}!");
        }
    }

    (!endpoints.is_empty()).then_some(endpoints)
}

fn own_node_endpoint(url: String, credentials: &dyn Credentials) -> RpcEndpoint {
    let header = |name: &str, var: &str| {
        (
            name.to_owned(),
            credentials.get(var).unwrap_or_default(),
        )
    };
    RpcEndpoint::WithHeaders {
        url,
        headers: vec![
            ("Content-Type".to_owned(), "application/json".to_owned()),
            header("CF-Access-Client-Id", CF_ACCESS_CLIENT_ID),
            header("CF-Access-Client-Secret", CF_ACCESS_CLIENT_SECRET),
        ],
    }
}

/// Replace the `{<var>}` placeholder in `template` with the value of `var`.
///
/// Used for providers that embed the key in the URL path, e.g.
/// `https://palm-mainnet.infura.io/v3/{INFURA_API_KEY}`. An unset key
/// substitutes the empty string.
#[must_use]
pub fn substitute_credential(template: &str, var: &str, credentials: &dyn Credentials) -> String {
    let placeholder = format!("{{{var}}}");
    template.replacen(&placeholder, &credentials.get(var).unwrap_or_default(), 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn nothing_resolvable_yields_none() {
        let creds = creds(&[]);
        assert_eq!(
            build_alchemy_and_custom_rpc_urls("mainnet", ProviderFamily::Eth, true, &creds),
            None
        );
        assert_eq!(
            build_alchemy_and_custom_rpc_urls("mumbai", ProviderFamily::Polygon, false, &creds),
            None
        );
    }

    #[test]
    fn provider_key_only_yields_single_url() {
        let creds = creds(&[(ALCHEMY_API_KEY, "abc")]);
        let urls = build_alchemy_and_custom_rpc_urls("goerli", ProviderFamily::Eth, true, &creds)
            .expect("alchemy url");
        assert_eq!(
            urls,
            vec![RpcEndpoint::from("https://eth-goerli.g.alchemy.com/v2/abc")]
        );
    }

    #[test]
    fn own_node_precedes_provider() {
        let creds = creds(&[
            (ALCHEMY_API_KEY, "abc"),
            ("NODE_URL_SEPOLIA", "https://sepolia.node.internal"),
            (CF_ACCESS_CLIENT_ID, "client-id"),
        ]);
        let urls = build_alchemy_and_custom_rpc_urls("sepolia", ProviderFamily::Eth, true, &creds)
            .expect("endpoints");
        assert_eq!(urls.len(), 2);
        assert_eq!(urls[0].url(), "https://sepolia.node.internal");
        assert_eq!(
            urls[0].headers(),
            &[
                ("Content-Type".to_owned(), "application/json".to_owned()),
                ("CF-Access-Client-Id".to_owned(), "client-id".to_owned()),
                ("CF-Access-Client-Secret".to_owned(), String::new()),
            ]
        );
        assert_eq!(urls[1].url(), "https://eth-sepolia.g.alchemy.com/v2/abc");
    }

    #[test]
    fn own_node_ignored_unless_requested() {
        let creds = creds(&[("NODE_URL_MAINNET", "https://node.internal")]);
        assert_eq!(
            build_alchemy_and_custom_rpc_urls("mainnet", ProviderFamily::Eth, false, &creds),
            None
        );
    }

    #[test]
    fn family_key_wins_over_generic_key() {
        let creds = creds(&[(ALCHEMY_API_KEY, "generic"), ("ALCHEMY_API_KEY_OPTIMISM", "op")]);
        let urls = build_alchemy_and_custom_rpc_urls("mainnet", ProviderFamily::Opt, false, &creds)
            .expect("alchemy url");
        assert_eq!(urls[0].url(), "https://opt-mainnet.g.alchemy.com/v2/op");

        let urls = build_alchemy_and_custom_rpc_urls("goerli", ProviderFamily::Arb, false, &creds)
            .expect("alchemy url");
        assert_eq!(urls[0].url(), "https://arb-goerli.g.alchemy.com/v2/generic");
    }

    #[test]
    fn debug_output_hides_header_values() {
        let endpoint = RpcEndpoint::WithHeaders {
            url: "https://node".to_owned(),
            headers: vec![("CF-Access-Client-Secret".to_owned(), "s3cret".to_owned())],
        };
        let printed = format!("{endpoint:?}");
        assert!(printed.contains("CF-Access-Client-Secret"));
        assert!(!printed.contains("s3cret"));
    }

    #[test]
    fn infura_placeholder_is_substituted() {
        let template = "https://palm-mainnet.infura.io/v3/{INFURA_API_KEY}";
        assert_eq!(
            substitute_credential(template, INFURA_API_KEY, &creds(&[(INFURA_API_KEY, "xyz")])),
            "https://palm-mainnet.infura.io/v3/xyz"
        );
        assert_eq!(
            substitute_credential(template, INFURA_API_KEY, &creds(&[])),
            "https://palm-mainnet.infura.io/v3/"
        );
        assert_eq!(
            substitute_credential("https://rpc.example", INFURA_API_KEY, &creds(&[])),
            "https://rpc.example"
        );
    }

    #[test]
    fn missing_credentials_are_logged() {
        let (endpoints, logs) = crate::testing::capture_warnings(|| {
            build_alchemy_and_custom_rpc_urls("mainnet", ProviderFamily::Eth, true, &creds(&[]))
        });
        assert_eq!(endpoints, None);
        assert!(logs.contains("WARN"));
        assert!(logs.contains("Environment variable NODE_URL_MAINNET not set!"));
        assert!(logs.contains("Environment variable ALCHEMY_API_KEY not set for eth mainnet!"));
    }

    #[test]
    fn invalid_node_url_is_logged_and_skipped() {
        let creds = creds(&[("NODE_URL_GOERLI", "not a url"), ("ALCHEMY_API_KEY", "key")]);
        let (endpoints, logs) = crate::testing::capture_warnings(|| {
            build_alchemy_and_custom_rpc_urls("goerli", ProviderFamily::Eth, true, &creds)
        });
        assert_eq!(
            endpoints,
            Some(vec![RpcEndpoint::from("https://eth-goerli.g.alchemy.com/v2/key")])
        );
        assert!(logs.contains("ignoring invalid node URL"));
        assert!(!logs.contains("ALCHEMY_API_KEY not set"));
    }

    #[test]
    fn resolved_credentials_log_nothing() {
        let creds = creds(&[
            ("NODE_URL_SEPOLIA", "https://node.example"),
            ("ALCHEMY_API_KEY", "key"),
        ]);
        let (endpoints, logs) = crate::testing::capture_warnings(|| {
            build_alchemy_and_custom_rpc_urls("sepolia", ProviderFamily::Eth, true, &creds)
        });
        assert_eq!(endpoints.map(|e| e.len()), Some(2));
        assert!(logs.is_empty(), "unexpected warnings: {logs}");
    }
}
