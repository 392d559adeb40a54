use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use super::types::{NodeId, WalletNode};

/// Wallets whose address or entity name fuzzily matches `query`, best match
/// first. Ties keep insertion order.
pub(super) fn search_nodes(nodes: &[WalletNode], query: &str) -> Vec<NodeId> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }

    // Skim defaults to smart case, where an uppercase query never matches a
    // lowercase address.
    let matcher = SkimMatcherV2::default().ignore_case();
    let mut scored = nodes
        .iter()
        .filter_map(|node| {
            let by_address = matcher.fuzzy_match(&node.address, query);
            let by_entity = matcher.fuzzy_match(&node.entity_name, query);
            by_address.max(by_entity).map(|score| (score, node.id))
        })
        .collect::<Vec<_>>();

    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.into_iter().map(|(_, id)| id).collect()
}
