//! Orders tokens by total score and hands out dense, 1-based ranks.
//!
//! Ties: tokens with equal totals keep ascending token id order. The input map
//! iterates in id order and the sort is stable, so the rule holds without a
//! secondary key. Tied tokens still receive distinct consecutive ranks.

use std::collections::BTreeMap;

use crate::{MetadataStore, RankEntry, Ranking, RarityInfo, TokenId};

pub(crate) fn rank_tokens(scores: &BTreeMap<TokenId, f64>) -> Ranking {
    let mut sorted: Vec<(TokenId, f64)> = scores.iter().map(|(id, score)| (*id, *score)).collect();
    sorted.sort_by(|a, b| b.1.total_cmp(&a.1));
    sorted
        .into_iter()
        .enumerate()
        .map(|(index, (token_id, total_rarity_score))| RankEntry {
            token_id,
            total_rarity_score,
            rank: index as u64 + 1,
        })
        .collect()
}

/// Copy each ranking entry onto its token as `rarity`.
pub(crate) fn attach_rarity(store: &mut MetadataStore, ranking: &Ranking) {
    for entry in ranking {
        if let Some(metadata) = store.get_mut(entry.token_id) {
            metadata.rarity = Some(RarityInfo {
                total_rarity_score: entry.total_rarity_score,
                rank: entry.rank,
            });
        }
    }
}
