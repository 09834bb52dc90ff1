use crate::{MetadataStore, TraitStats};

/// Write each trait-type's score and count onto every matching attribute.
///
/// Must run after `compute_trait_stats` has seen the whole store. Existing
/// values are overwritten, so annotating twice with the same stats is a no-op.
pub(crate) fn annotate_store(store: &mut MetadataStore, stats: &TraitStats) {
    for (_, metadata) in store.iter_mut() {
        for attribute in &mut metadata.attributes {
            match stats.get(attribute.trait_key()) {
                Some(stat) => {
                    attribute.score = Some(stat.score);
                    attribute.trait_count = Some(stat.count);
                }
                None => {
                    attribute.score = None;
                    attribute.trait_count = None;
                }
            }
        }
    }
}
