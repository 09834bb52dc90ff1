//! Trait-type frequency scoring.
//!
//! A trait-type's score is its occurrence count divided by the number of
//! acquired tokens, scaled to a percentage. Common trait-types score high and
//! rare ones low; the figure is a raw frequency and is deliberately not
//! inverted.

use std::collections::HashMap;

use crate::{MetadataStore, TraitStat, TraitStats};

/// Count every attribute occurrence per trait-type across the store.
///
/// A token carrying the same trait-type twice contributes two occurrences.
/// Attributes without a trait-type are counted together under
/// `MISSING_TRAIT_TYPE`.
pub(crate) fn count_trait_occurrences(store: &MetadataStore) -> HashMap<String, u64> {
    let mut counts: HashMap<String, u64> = HashMap::new();
    for (_, metadata) in store.iter() {
        for attribute in &metadata.attributes {
            *counts.entry(attribute.trait_key().to_owned()).or_insert(0) += 1;
        }
    }
    counts
}

/// Read-only pass over the full store. The denominator is the number of tokens
/// present in the store, so tokens that failed acquisition count nowhere.
pub(crate) fn compute_trait_stats(store: &MetadataStore) -> TraitStats {
    let token_count = store.len();
    let traits = count_trait_occurrences(store)
        .into_iter()
        .map(|(trait_type, count)| {
            let score = (count as f64 / token_count as f64) * 100.0;
            (trait_type, TraitStat { score, count })
        })
        .collect();
    TraitStats {
        traits,
        token_count,
    }
}
