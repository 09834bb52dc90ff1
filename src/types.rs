use std::collections::{BTreeMap, HashMap};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

pub(crate) type TokenId = u64;

/// Grouping key for attributes published without a `trait_type`.
pub(crate) const MISSING_TRAIT_TYPE: &str = "undefined";

/// One trait of a token, as published in the collection's metadata.
///
/// `score` and `trait_count` stay `None` until the annotator has run over the
/// whole store; afterwards every attribute sharing a trait key carries the
/// same pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct Attribute {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) trait_type: Option<String>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub(crate) value: Option<serde_json::Value>,
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub(crate) score: Option<f64>,
    #[serde(
        default,
        rename = "traitCount",
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub(crate) trait_count: Option<u64>,
    #[serde(default, flatten)]
    pub(crate) extra: serde_json::Map<String, serde_json::Value>,
}

impl Attribute {
    pub(crate) fn new(trait_type: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self {
            trait_type: Some(trait_type.into()),
            value: Some(value.into()),
            score: None,
            trait_count: None,
            extra: serde_json::Map::new(),
        }
    }

    /// The key scores are grouped under; attributes without a trait type
    /// share `MISSING_TRAIT_TYPE`.
    pub(crate) fn trait_key(&self) -> &str {
        self.trait_type.as_deref().unwrap_or(MISSING_TRAIT_TYPE)
    }
}

/// Keeps an explicit `null` as `Some(Null)` so it is written back.
fn present<'de, D>(deserializer: D) -> Result<Option<serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    serde_json::Value::deserialize(deserializer).map(Some)
}

/// Derived fields are recomputed on every run, so a publisher's own value of
/// a different shape is dropped instead of failing the token.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct TokenMetadata {
    pub(crate) attributes: Vec<Attribute>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) image: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub(crate) rarity: Option<RarityInfo>,
    #[serde(default, flatten)]
    pub(crate) extra: serde_json::Map<String, serde_json::Value>,
}

impl TokenMetadata {
    pub(crate) fn with_attributes(attributes: Vec<Attribute>) -> Self {
        Self {
            attributes,
            image: None,
            rarity: None,
            extra: serde_json::Map::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub(crate) struct RarityInfo {
    #[serde(rename = "totalRarityScore")]
    pub(crate) total_rarity_score: f64,
    pub(crate) rank: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub(crate) struct RankEntry {
    #[serde(rename = "tokenId")]
    pub(crate) token_id: TokenId,
    #[serde(rename = "totalRarityScore")]
    pub(crate) total_rarity_score: f64,
    pub(crate) rank: u64,
}

pub(crate) type Ranking = Vec<RankEntry>;

/// Per trait-type statistics over one acquired store.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub(crate) struct TraitStat {
    pub(crate) score: f64,
    pub(crate) count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub(crate) struct TraitStats {
    pub(crate) traits: HashMap<String, TraitStat>,
    pub(crate) token_count: usize,
}

impl TraitStats {
    pub(crate) fn get(&self, trait_type: &str) -> Option<&TraitStat> {
        self.traits.get(trait_type)
    }

    pub(crate) fn len(&self) -> usize {
        self.traits.len()
    }
}

/// The persisted output: annotated metadata keyed by token id plus the ranking.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct RarityDocument {
    pub(crate) metadata: BTreeMap<TokenId, TokenMetadata>,
    pub(crate) rarity: Ranking,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct SkippedToken {
    pub(crate) token_id: TokenId,
    pub(crate) reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct SkipReport {
    pub(crate) skipped: Vec<SkippedToken>,
}

impl SkipReport {
    pub(crate) fn record(&mut self, token_id: TokenId, reason: impl Into<String>) {
        self.skipped.push(SkippedToken {
            token_id,
            reason: reason.into(),
        });
    }

    pub(crate) fn len(&self) -> usize {
        self.skipped.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.skipped.is_empty()
    }

    pub(crate) fn token_ids(&self) -> Vec<TokenId> {
        self.skipped.iter().map(|s| s.token_id).collect()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct RunLogEntry {
    pub(crate) ts_utc: i64,
    pub(crate) total_supply: u64,
    pub(crate) acquired: usize,
    #[serde(default)]
    pub(crate) skipped: Vec<SkippedToken>,
    pub(crate) output: String,
    #[serde(default)]
    pub(crate) digest: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_keeps_opaque_fields() {
        let raw = r#"{
            "name": "Token #7",
            "image": "ipfs://QmImage/7.png",
            "attributes": [
                {"trait_type": "Background", "value": "Red", "display_type": "string"}
            ]
        }"#;
        let meta: TokenMetadata = serde_json::from_str(raw).unwrap();
        assert_eq!(meta.extra.get("name").and_then(|v| v.as_str()), Some("Token #7"));
        assert_eq!(meta.attributes[0].extra.len(), 1);

        let out = serde_json::to_value(&meta).unwrap();
        assert_eq!(out["name"], "Token #7");
        assert_eq!(out["attributes"][0]["display_type"], "string");
        assert!(out["attributes"][0].get("score").is_none());
        assert!(out.get("rarity").is_none());
    }

    #[test]
    fn annotated_fields_use_document_names() {
        let mut attr = Attribute::new("Eyes", "Laser");
        attr.score = Some(12.5);
        attr.trait_count = Some(3);
        let out = serde_json::to_value(&attr).unwrap();
        assert_eq!(out["traitCount"], 3);
        assert_eq!(out["score"], 12.5);

        let entry = RankEntry {
            token_id: 4,
            total_rarity_score: 50.0,
            rank: 1,
        };
        let out = serde_json::to_value(entry).unwrap();
        assert_eq!(out["tokenId"], 4);
        assert_eq!(out["totalRarityScore"], 50.0);
    }

    #[test]
    fn attribute_without_trait_type_is_kept() {
        let raw = r#"{"attributes": [{"value": "Gold"}, {"trait_type": "Hat", "value": "Cap"}]}"#;
        let meta: TokenMetadata = serde_json::from_str(raw).unwrap();
        assert_eq!(meta.attributes[0].trait_type, None);
        assert_eq!(meta.attributes[0].trait_key(), MISSING_TRAIT_TYPE);
        assert_eq!(meta.attributes[1].trait_key(), "Hat");

        let out = serde_json::to_value(&meta).unwrap();
        assert!(out["attributes"][0].get("trait_type").is_none());
    }

    #[test]
    fn publisher_rarity_and_score_are_replaced_not_rejected() {
        let raw = r#"{
            "rarity": "Legendary",
            "attributes": [{"trait_type": "Eyes", "value": "Laser", "score": "high", "traitCount": -1}]
        }"#;
        let meta: TokenMetadata = serde_json::from_str(raw).unwrap();
        assert!(meta.rarity.is_none());
        assert!(meta.attributes[0].score.is_none());
        assert!(meta.attributes[0].trait_count.is_none());
        assert!(!meta.extra.contains_key("rarity"));
    }

    #[test]
    fn missing_and_null_values_round_trip_unchanged() {
        let raw = r#"{"attributes": [{"trait_type": "Hat"}, {"trait_type": "Eyes", "value": null}]}"#;
        let meta: TokenMetadata = serde_json::from_str(raw).unwrap();
        assert_eq!(meta.attributes[0].value, None);
        assert_eq!(meta.attributes[1].value, Some(serde_json::Value::Null));

        let out = serde_json::to_value(&meta).unwrap();
        assert!(out["attributes"][0].get("value").is_none());
        assert!(out["attributes"][1].get("value").unwrap().is_null());
    }

    #[test]
    fn metadata_without_attributes_is_rejected() {
        let raw = r#"{"name": "broken", "image": "https://example.com/1.png"}"#;
        assert!(serde_json::from_str::<TokenMetadata>(raw).is_err());
    }

    #[test]
    fn document_keys_are_numeric_token_ids() {
        let mut doc = RarityDocument::default();
        doc.metadata
            .insert(2, TokenMetadata::with_attributes(Vec::new()));
        let json = serde_json::to_string(&doc).unwrap();
        assert!(json.contains("\"2\""));
        let back: RarityDocument = serde_json::from_str(&json).unwrap();
        assert!(back.metadata.contains_key(&2));
    }
}
