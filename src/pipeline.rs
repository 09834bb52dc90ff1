//! One rarity run: acquire, then score, annotate, aggregate, rank.
//!
//! The compute stages only ever see a fully acquired store; nothing is scored
//! while fetches are still outstanding.

use std::path::Path;

use crate::{
    MetadataSource, MetadataStore, PersistSummary, Ranking, RarityDocument, Result, RunConfig,
    SkipReport, TraitStats, acquire_collection, annotate_store, attach_rarity,
    compute_trait_stats, load_document, rank_tokens, rarity_scores, write_document,
};

#[derive(Debug)]
pub(crate) struct RunOutcome {
    pub(crate) document: RarityDocument,
    pub(crate) skipped: SkipReport,
    pub(crate) trait_stats: TraitStats,
}

/// Run every compute stage over an acquired store and attach the results.
///
/// Safe to call on a store that was already scored: annotation and rarity
/// are overwritten with identical values.
pub(crate) fn score_store(store: &mut MetadataStore) -> (TraitStats, Ranking) {
    let stats = compute_trait_stats(store);
    annotate_store(store, &stats);
    let totals = rarity_scores(store);
    let ranking = rank_tokens(&totals);
    attach_rarity(store, &ranking);
    (stats, ranking)
}

pub(crate) fn run_collection(config: &RunConfig, source: &dyn MetadataSource) -> RunOutcome {
    tracing::info!(
        total_supply = config.total_supply,
        concurrency = config.concurrency,
        "acquiring collection metadata"
    );
    let (mut store, skipped) = acquire_collection(source, config.total_supply, config.concurrency);
    if store.is_empty() {
        tracing::warn!(
            skipped = skipped.len(),
            "no token could be acquired; the ranking will be empty"
        );
    } else if !skipped.is_empty() {
        tracing::warn!(
            skipped = skipped.len(),
            acquired = store.len(),
            "some tokens could not be acquired"
        );
    }

    let (trait_stats, ranking) = score_store(&mut store);
    tracing::info!(
        tokens = store.len(),
        trait_types = trait_stats.len(),
        "scored collection"
    );
    RunOutcome {
        document: store.into_document(ranking),
        skipped,
        trait_stats,
    }
}

/// Re-score a previously written document without fetching anything.
///
/// The result replaces `input` unless `out` names another file.
pub(crate) fn rescore_document(input: &Path, out: Option<&Path>) -> Result<(TraitStats, PersistSummary)> {
    let mut store = MetadataStore::from_document(load_document(input)?);
    let (stats, ranking) = score_store(&mut store);
    let target = out.unwrap_or(input);
    let summary = write_document(target, &store.into_document(ranking))?;
    tracing::info!(
        input = %input.display(),
        output = %summary.path.display(),
        bytes = summary.bytes,
        "rescored document"
    );
    Ok((stats, summary))
}
