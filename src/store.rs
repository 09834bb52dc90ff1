use std::collections::BTreeMap;

use crate::{RarityDocument, TokenId, TokenMetadata};

/// Metadata of every successfully acquired token, owned by a single run.
///
/// Iteration is always in ascending token id, which is what the ranking's
/// tie-break relies on.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct MetadataStore {
    tokens: BTreeMap<TokenId, TokenMetadata>,
}

impl MetadataStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, token_id: TokenId, metadata: TokenMetadata) {
        self.tokens.insert(token_id, metadata);
    }

    pub(crate) fn get(&self, token_id: TokenId) -> Option<&TokenMetadata> {
        self.tokens.get(&token_id)
    }

    pub(crate) fn get_mut(&mut self, token_id: TokenId) -> Option<&mut TokenMetadata> {
        self.tokens.get_mut(&token_id)
    }

    pub(crate) fn contains(&self, token_id: TokenId) -> bool {
        self.tokens.contains_key(&token_id)
    }

    pub(crate) fn len(&self) -> usize {
        self.tokens.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (TokenId, &TokenMetadata)> {
        self.tokens.iter().map(|(id, meta)| (*id, meta))
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = (TokenId, &mut TokenMetadata)> {
        self.tokens.iter_mut().map(|(id, meta)| (*id, meta))
    }

    pub(crate) fn from_document(document: RarityDocument) -> Self {
        Self {
            tokens: document.metadata,
        }
    }

    pub(crate) fn into_document(self, rarity: crate::Ranking) -> RarityDocument {
        RarityDocument {
            metadata: self.tokens,
            rarity,
        }
    }
}

impl FromIterator<(TokenId, TokenMetadata)> for MetadataStore {
    fn from_iter<I: IntoIterator<Item = (TokenId, TokenMetadata)>>(iter: I) -> Self {
        Self {
            tokens: iter.into_iter().collect(),
        }
    }
}
