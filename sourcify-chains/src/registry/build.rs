//! Registry construction and referential-integrity checks.

use std::collections::HashSet;

use super::{Mode, SourcifyChain};
use crate::chain::{ChainExtensions, ChainRecord, NativeCurrency, RpcEndpoint};
use crate::error::Error;

/// Ids of the development chains registered outside production.
pub const LOCAL_CHAIN_IDS: [u64; 2] = [1337, 31337];

const LOCAL_RPC_URL: &str = "http://localhost:8545";

fn local_chain(chain_id: u64, name: &str, short_name: &str) -> SourcifyChain {
    SourcifyChain {
        chain_id,
        name: name.to_owned(),
        title: None,
        short_name: short_name.to_owned(),
        chain: String::new(),
        network_id: Some(chain_id),
        native_currency: NativeCurrency {
            name: "localETH".to_owned(),
            symbol: "localETH".to_owned(),
            decimals: 18,
        },
        network: Some("testnet".to_owned()),
        info_url: Some("localhost".to_owned()),
        faucets: Vec::new(),
        explorers: Vec::new(),
        rpc: vec![RpcEndpoint::from(LOCAL_RPC_URL)],
        supported: true,
        contract_fetch_address: None,
        tx_regex: None,
        graphql_fetch_address: None,
    }
}

/// Ganache and Hardhat chains, both served from [`LOCAL_RPC_URL`].
#[must_use]
pub fn local_chains() -> Vec<SourcifyChain> {
    vec![
        local_chain(LOCAL_CHAIN_IDS[0], "Ganache Localhost", "Ganache"),
        local_chain(LOCAL_CHAIN_IDS[1], "Hardhat Network Localhost", "Hardhat Network"),
    ]
}

/// Merge `catalog` with `extensions`, in catalog order after the local chains.
pub(super) fn build_chains(
    catalog: &[ChainRecord],
    extensions: &ChainExtensions,
    mode: Mode,
) -> Result<Vec<SourcifyChain>, Error> {
    let mut chains = if mode.is_production() {
        Vec::new()
    } else {
        local_chains()
    };
    let mut admitted: HashSet<u64> = chains.iter().map(|chain| chain.chain_id).collect();

    for record in catalog {
        let chain_id = record.chain_id;
        if admitted.contains(&chain_id) {
            if !mode.is_production() && LOCAL_CHAIN_IDS.contains(&chain_id) {
                tracing::debug!(chain_id, "local chain shadows catalog record");
                continue;
            }
            return Err(Error::DuplicateChainId(chain_id));
        }
        if let Some(ext) = extensions.get(&chain_id.to_string()) {
            chains.push(SourcifyChain::merge(record, ext));
            admitted.insert(chain_id);
        }
    }

    ensure_extensions_registered(extensions, &chains)?;
    Ok(chains)
}

/// Every extension key must name a registered chain.
fn ensure_extensions_registered(
    extensions: &ChainExtensions,
    chains: &[SourcifyChain],
) -> Result<(), Error> {
    let registered: HashSet<String> = chains.iter().map(SourcifyChain::key).collect();
    let orphaned: Vec<String> = extensions
        .keys()
        .filter(|chain_id| !registered.contains(*chain_id))
        .cloned()
        .collect();
    if orphaned.is_empty() {
        Ok(())
    } else {
        Err(Error::OrphanedExtensions(orphaned))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::ChainOverride;

    fn extensions(ids: &[&str]) -> ChainExtensions {
        ids.iter().map(|id| (*id, ChainOverride::new(true))).collect()
    }

    fn ids(chains: &[SourcifyChain]) -> Vec<u64> {
        chains.iter().map(|c| c.chain_id).collect()
    }

    #[test]
    fn catalog_chains_without_override_are_dropped() {
        let catalog = [
            ChainRecord::new(1, "Mainnet"),
            ChainRecord::new(2, "Expanse"),
            ChainRecord::new(10, "Optimism"),
        ];
        let chains = build_chains(&catalog, &extensions(&["10", "1"]), Mode::Production)
            .expect("valid inputs");
        assert_eq!(ids(&chains), vec![1, 10]);
    }

    #[test]
    fn local_chains_only_outside_production() {
        let catalog = [ChainRecord::new(1, "Mainnet")];
        let ext = extensions(&["1"]);

        let dev = build_chains(&catalog, &ext, Mode::Development).expect("dev build");
        assert_eq!(ids(&dev), vec![1337, 31337, 1]);

        let prod = build_chains(&catalog, &ext, Mode::Production).expect("prod build");
        assert_eq!(ids(&prod), vec![1]);
    }

    #[test]
    fn local_chain_wins_over_catalog_record() {
        let catalog = [
            ChainRecord::new(1337, "Geth Testnet"),
            ChainRecord::new(1337, "Geth Testnet again"),
        ];
        let chains = build_chains(&catalog, &extensions(&["1337"]), Mode::Development)
            .expect("local ids may repeat in development");
        let ganache = chains.iter().find(|c| c.chain_id == 1337).expect("ganache");
        assert_eq!(ganache.name, "Ganache Localhost");
        assert_eq!(ganache.rpc, vec![RpcEndpoint::from("http://localhost:8545")]);
    }

    #[test]
    fn duplicate_catalog_ids_are_fatal() {
        let catalog = [ChainRecord::new(5, "Goerli"), ChainRecord::new(5, "Görli")];
        let err = build_chains(&catalog, &extensions(&["5"]), Mode::Development)
            .expect_err("duplicate id");
        assert!(matches!(err, Error::DuplicateChainId(5)));

        let catalog = [ChainRecord::new(1337, "A"), ChainRecord::new(1337, "B")];
        let err = build_chains(&catalog, &extensions(&["1337"]), Mode::Production)
            .expect_err("no local exception in production");
        assert!(matches!(err, Error::DuplicateChainId(1337)));
    }

    #[test]
    fn repeated_unregistered_ids_are_ignored() {
        let catalog = [
            ChainRecord::new(1, "A"),
            ChainRecord::new(2, "B"),
            ChainRecord::new(2, "B2"),
        ];
        let chains = build_chains(&catalog, &extensions(&["1"]), Mode::Production)
            .expect("chain 2 is never registered");
        assert_eq!(ids(&chains), vec![1]);
    }

    #[test]
    fn duplicate_after_registration_is_fatal() {
        let catalog = [ChainRecord::new(2, "B"), ChainRecord::new(2, "B2")];
        let err = build_chains(&catalog, &extensions(&["2"]), Mode::Production)
            .expect_err("chain 2 registered twice");
        assert!(matches!(err, Error::DuplicateChainId(2)));
    }

    #[test]
    fn orphaned_extensions_are_reported_together() {
        let catalog = [ChainRecord::new(1, "Mainnet")];
        let err = build_chains(&catalog, &extensions(&["1", "2", "77"]), Mode::Production)
            .expect_err("orphans");
        assert!(matches!(err, Error::OrphanedExtensions(ref ids) if ids == &["2", "77"]));
    }

    #[test]
    fn local_extension_is_orphaned_in_production() {
        let err = build_chains(&[], &extensions(&["31337"]), Mode::Production)
            .expect_err("no catalog record for hardhat");
        assert!(matches!(err, Error::OrphanedExtensions(ref ids) if ids == &["31337"]));
        assert!(build_chains(&[], &extensions(&["31337"]), Mode::Development).is_ok());
    }
}
