use std::collections::BTreeMap;

use crate::{MetadataStore, TokenId, TokenMetadata};

/// Sum of the token's attribute scores; unannotated attributes count as zero.
pub(crate) fn total_rarity_score(metadata: &TokenMetadata) -> f64 {
    metadata
        .attributes
        .iter()
        .fold(0.0, |total, attribute| total + attribute.score.unwrap_or(0.0))
}

pub(crate) fn rarity_scores(store: &MetadataStore) -> BTreeMap<TokenId, f64> {
    store
        .iter()
        .map(|(token_id, metadata)| (token_id, total_rarity_score(metadata)))
        .collect()
}
