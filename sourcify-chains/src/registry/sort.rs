//! Display order of chains.

use super::SourcifyChain;

/// Ethereum mainnet and its testnets, listed first in this order.
pub const PRIMARY_CHAIN_IDS: [u64; 6] = [1, 5, 11_155_111, 3, 4, 42];

/// Sort chains for display.
///
/// Primary chains come first in [`PRIMARY_CHAIN_IDS`] order and are renamed
/// to their long-form title when the catalog has a non-empty one. The rest follow sorted
/// by name (title when the name is empty), byte-wise and case-sensitive;
/// equal names keep their input order. Primary ids without a chain are
/// skipped.
#[must_use]
pub fn sort_chains(chains: Vec<SourcifyChain>) -> Vec<SourcifyChain> {
    let mut primary: [Option<SourcifyChain>; PRIMARY_CHAIN_IDS.len()] = Default::default();
    let mut others = Vec::with_capacity(chains.len());

    for mut chain in chains {
        match PRIMARY_CHAIN_IDS.iter().position(|id| *id == chain.chain_id) {
            Some(slot) => {
                if let Some(title) = chain.title.as_ref().filter(|t| !t.is_empty()) {
                    chain.name.clone_from(title);
                }
                primary[slot] = Some(chain);
            }
            None => others.push(chain),
        }
    }

    others.sort_by(|a, b| sort_key(a).cmp(sort_key(b)));
    primary.into_iter().flatten().chain(others).collect()
}

fn sort_key(chain: &SourcifyChain) -> &str {
    if chain.name.is_empty() {
        chain.title.as_deref().unwrap_or_default()
    } else {
        &chain.name
    }
}
