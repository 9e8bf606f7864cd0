use std::collections::BTreeMap;
use std::fs;

use sourcify_chains::chain::{
    Catalog, ChainExtensions, ChainOverride, ChainRecord, ExtensionTable, RpcEndpoint,
};
use sourcify_chains::registry::{LOCAL_CHAIN_IDS, PRIMARY_CHAIN_IDS};
use sourcify_chains::{Error, Mode, Registry};

fn credentials(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect()
}

/// A catalog covering every chain in the bundled table, plus two chains
/// Sourcify does not know.
fn full_catalog(table: &ExtensionTable) -> Vec<ChainRecord> {
    let mut catalog: Vec<ChainRecord> = table
        .chains
        .keys()
        .map(|id| {
            let chain_id: u64 = id.parse().expect("numeric key");
            let mut record = ChainRecord::new(chain_id, format!("Chain {id}"));
            record.rpc = vec![format!("https://rpc.example/{id}")];
            record
        })
        .collect();
    catalog.push(ChainRecord::new(2, "Expanse Network"));
    catalog.push(ChainRecord::new(7, "ThaiChain"));
    for record in &mut catalog {
        match record.chain_id {
            5 => record.title = Some("Ethereum Testnet Goerli".to_owned()),
            11_155_111 => record.title = Some("Ethereum Testnet Sepolia".to_owned()),
            _ => {}
        }
    }
    catalog
}

#[test]
fn mainnet_only_registry() {
    let catalog = [ChainRecord::new(1, "Mainnet")];
    let extensions: ChainExtensions = [("1", ChainOverride::new(true))].into_iter().collect();
    let registry = Registry::build(&catalog, &extensions, Mode::Production).expect("valid");

    assert_eq!(registry.len(), 1);
    assert!(registry.check_supported_chain_id("1").is_ok());
    let err = registry.check_supported_chain_id("2").expect_err("unknown chain");
    assert_eq!(err.to_string(), "Chain 2 not supported for verification!");
    assert!(err.is_user_facing());
}

#[test]
fn orphaned_extension_aborts_construction() {
    let catalog = [ChainRecord::new(1, "Mainnet")];
    let extensions: ChainExtensions = [
        ("1", ChainOverride::new(true)),
        ("2", ChainOverride::new(true)),
    ]
    .into_iter()
    .collect();
    let err = Registry::build(&catalog, &extensions, Mode::Production).expect_err("orphan");
    assert!(matches!(err, Error::OrphanedExtensions(ref ids) if ids == &["2"]));
    assert!(err.to_string().contains('2'));
}

#[test]
fn bundled_table_builds_against_full_catalog() {
    let table = ExtensionTable::bundled().expect("bundled table parses");
    let catalog = full_catalog(&table);
    let registry = Registry::from_sources(
        &catalog,
        &table,
        &credentials(&[("ALCHEMY_API_KEY", "key")]),
        Mode::Production,
    )
    .expect("bundled table matches catalog");

    // Catalog chains without an extension entry are not registered.
    assert_eq!(registry.len(), table.chains.len());
    assert!(registry.check_sourcify_chain_id("2").is_err());
    assert!(registry.check_sourcify_chain_id("7").is_err());

    let leading: Vec<u64> = registry
        .chains()
        .iter()
        .take(PRIMARY_CHAIN_IDS.len())
        .map(|c| c.chain_id)
        .collect();
    assert_eq!(leading, PRIMARY_CHAIN_IDS);
    assert_eq!(registry.chains()[1].name, "Ethereum Testnet Goerli");
    assert_eq!(registry.chains()[2].name, "Ethereum Testnet Sepolia");

    let rest = &registry.chains()[PRIMARY_CHAIN_IDS.len()..];
    assert!(rest.windows(2).all(|pair| pair[0].name <= pair[1].name));
}

#[test]
fn supported_set_is_the_allow_list() {
    let table = ExtensionTable::bundled().expect("bundled table parses");
    let registry = Registry::from_sources(
        &full_catalog(&table),
        &table,
        &credentials(&[]),
        Mode::Production,
    )
    .expect("valid");

    for (chain_id, entry) in &table.chains {
        assert_eq!(
            registry.check_supported_chain_id(chain_id).is_ok(),
            entry.supported,
            "chain {chain_id}"
        );
        assert!(registry.check_sourcify_chain_id(chain_id).is_ok());
    }
    assert!(registry.check_sourcify_chain_id("0").is_ok());
    assert!(registry.check_supported_chain_id("0").is_err());
    assert_eq!(
        registry.supported_chain_map().len(),
        table.chains.values().filter(|e| e.supported).count()
    );
}

#[test]
fn credentials_shape_rpc_lists() {
    let table = ExtensionTable::bundled().expect("bundled table parses");
    let catalog = full_catalog(&table);

    let with_keys = Registry::from_sources(
        &catalog,
        &table,
        &credentials(&[
            ("ALCHEMY_API_KEY", "key"),
            ("NODE_URL_MAINNET", "https://node.sourcify.example"),
        ]),
        Mode::Production,
    )
    .expect("valid");
    let mainnet = with_keys.get("1").expect("mainnet");
    let urls: Vec<&str> = mainnet.rpc.iter().map(RpcEndpoint::url).collect();
    assert_eq!(
        urls,
        vec![
            "https://node.sourcify.example",
            "https://eth-mainnet.g.alchemy.com/v2/key",
        ]
    );

    let without_keys =
        Registry::from_sources(&catalog, &table, &credentials(&[]), Mode::Production)
            .expect("valid");
    let mainnet = without_keys.get("1").expect("mainnet");
    assert_eq!(mainnet.rpc, vec![RpcEndpoint::from("https://rpc.example/1")]);
}

#[test]
fn development_adds_local_chains() {
    let table = ExtensionTable::bundled().expect("bundled table parses");
    let registry = Registry::from_sources(
        &full_catalog(&table),
        &table,
        &credentials(&[]),
        Mode::Development,
    )
    .expect("valid");
    for chain_id in LOCAL_CHAIN_IDS {
        let chain = registry.get_supported(&chain_id.to_string()).expect("local chain");
        assert_eq!(chain.rpc, vec![RpcEndpoint::from("http://localhost:8545")]);
    }
    assert_eq!(registry.len(), table.chains.len() + LOCAL_CHAIN_IDS.len());
}

#[test]
fn catalog_loads_from_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("chains.json");
    fs::write(
        &path,
        r#"[
            {"name": "Ethereum Mainnet", "chainId": 1, "shortName": "eth", "infoURL": "https://ethereum.org"},
            {"name": "Expanse Network", "chainId": 2, "shortName": "exp"}
        ]"#,
    )
    .expect("write catalog");

    let catalog = Catalog::load(&path).expect("valid catalog");
    let table = ExtensionTable::from_toml("[chains.\"1\"]\nsupported = true\n").expect("table");
    let registry =
        Registry::from_sources(&catalog, &table, &credentials(&[]), Mode::Production)
            .expect("valid");
    let mainnet = registry.get("1").expect("mainnet");
    assert_eq!(mainnet.short_name, "eth");
    assert_eq!(mainnet.info_url.as_deref(), Some("https://ethereum.org"));
    assert!(registry.get("2").is_none());
}
