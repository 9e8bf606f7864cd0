//! Chain data sources: the catalog, the extension table, and the RPC and
//! explorer templates the extension table expands to.
//!
//! - [`catalog`] — [`ChainRecord`]s from chainid.network.
//! - [`extension`] — the TOML extension table and its resolved [`ChainOverride`]s.
//! - [`explorer`] — contract-creation lookup templates.
//! - [`rpc`] — [`RpcEndpoint`]s, the Alchemy/own-node builder, [`Credentials`].

pub mod catalog;
pub mod explorer;
pub mod extension;
pub mod rpc;

pub use self::catalog::{Catalog, CatalogExplorer, ChainRecord, NativeCurrency};
pub use self::explorer::{ExplorerFetch, ExplorerSpec, blockscout_regex};
pub use self::extension::{ChainExtensions, ChainOverride, ExtensionEntry, ExtensionTable};
pub use self::rpc::{
    Credentials, EnvCredentials, ProviderFamily, RpcEndpoint, build_alchemy_and_custom_rpc_urls,
    substitute_credential,
};
