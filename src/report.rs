use crate::{RarityDocument, RunLogEntry, format_score};

/// Table of the `limit` best-ranked tokens, header first. Empty when the
/// document has no ranking.
pub(crate) fn ranking_lines(document: &RarityDocument, limit: usize) -> Vec<String> {
    let top = document.rarity.iter().take(limit);
    let mut lines = Vec::new();
    for entry in top {
        if lines.is_empty() {
            lines.push(format!("{:>6}  {:>8}  {:>12}  NAME", "RANK", "TOKEN", "SCORE"));
        }
        let name = document
            .metadata
            .get(&entry.token_id)
            .and_then(|m| m.extra.get("name"))
            .and_then(|v| v.as_str())
            .unwrap_or("");
        lines.push(
            format!(
                "{:>6}  {:>8}  {:>12}  {name}",
                entry.rank,
                entry.token_id,
                format_score(entry.total_rarity_score)
            )
            .trim_end()
            .to_string(),
        );
    }
    lines
}

/// One line per run plus an indented line per skipped token.
pub(crate) fn history_lines(runs: &[RunLogEntry]) -> Vec<String> {
    let mut lines = Vec::new();
    for run in runs {
        let when = chrono::DateTime::from_timestamp(run.ts_utc, 0)
            .map(|dt| dt.to_rfc3339())
            .unwrap_or_else(|| run.ts_utc.to_string());
        lines.push(format!(
            "{when}  supply={} acquired={} skipped={}  {}",
            run.total_supply,
            run.acquired,
            run.skipped.len(),
            run.output
        ));
        for skipped in &run.skipped {
            lines.push(format!("    token {}: {}", skipped.token_id, skipped.reason));
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Attribute, MetadataStore, SkippedToken, TokenMetadata, score_store};

    fn ranked_document() -> RarityDocument {
        let mut named = TokenMetadata::with_attributes(vec![
            Attribute::new("Background", "Red"),
            Attribute::new("Hat", "Crown"),
        ]);
        named.extra.insert("name".into(), "Token #1".into());
        let mut store: MetadataStore = [
            (1, named),
            (
                2,
                TokenMetadata::with_attributes(vec![Attribute::new("Background", "Blue")]),
            ),
            (3, TokenMetadata::with_attributes(Vec::new())),
        ]
        .into_iter()
        .collect();
        let (_, ranking) = score_store(&mut store);
        store.into_document(ranking)
    }

    #[test]
    fn ranking_table_honours_limit_and_names() {
        let lines = ranking_lines(&ranked_document(), 2);
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("RANK"));
        assert!(lines[1].ends_with("Token #1"));
        assert!(lines[1].contains("100"));
        assert!(lines[2].trim_start().starts_with('2'));
        assert!(lines[2].ends_with("66.6667"));
    }

    #[test]
    fn empty_ranking_renders_nothing() {
        assert!(ranking_lines(&RarityDocument::default(), 10).is_empty());
        assert!(ranking_lines(&ranked_document(), 0).is_empty());
    }

    #[test]
    fn history_lists_skipped_tokens_under_their_run() {
        let runs = vec![
            RunLogEntry {
                ts_utc: 0,
                total_supply: 10,
                acquired: 9,
                skipped: vec![SkippedToken {
                    token_id: 5,
                    reason: "status 404".into(),
                }],
                output: "metadata.json".into(),
                digest: None,
            },
            RunLogEntry {
                ts_utc: 60,
                total_supply: 10,
                acquired: 10,
                skipped: Vec::new(),
                output: "out.json".into(),
                digest: None,
            },
        ];
        let lines = history_lines(&runs);
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("1970-01-01T00:00:00"));
        assert!(lines[0].contains("supply=10 acquired=9 skipped=1"));
        assert!(lines[0].ends_with("metadata.json"));
        assert_eq!(lines[1], "    token 5: status 404");
        assert!(lines[2].ends_with("out.json"));
    }
}
