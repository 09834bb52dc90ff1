use std::time::Duration;

use rayon::ThreadPoolBuilder;
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::{
    AcquisitionError, MetadataStore, SkipReport, TokenId, TokenMetadata, TokenUriResolver,
    adjust_image_url, resolve_locator,
};

/// Where token metadata comes from. Implementations must be safe to call from
/// several pool threads at once.
pub(crate) trait MetadataSource: Send + Sync {
    fn fetch_token_metadata(&self, token_id: TokenId) -> Result<TokenMetadata, AcquisitionError>;
}

pub(crate) struct HttpMetadataSource {
    agent: ureq::Agent,
    resolver: Box<dyn TokenUriResolver>,
    gateway: String,
}

impl HttpMetadataSource {
    pub(crate) fn new(resolver: Box<dyn TokenUriResolver>, gateway: impl Into<String>, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(timeout)
            .timeout_read(timeout)
            .build();
        Self {
            agent,
            resolver,
            gateway: gateway.into(),
        }
    }
}

impl MetadataSource for HttpMetadataSource {
    fn fetch_token_metadata(&self, token_id: TokenId) -> Result<TokenMetadata, AcquisitionError> {
        let locator = self.resolver.token_uri(token_id)?;
        let url = resolve_locator(&locator, &self.gateway)?;
        let http_err = |message: String| AcquisitionError::Http {
            url: url.clone(),
            message,
        };
        let body = match self.agent.get(&url).call() {
            Ok(resp) => resp
                .into_string()
                .map_err(|e| http_err(format!("read body: {e}")))?,
            Err(ureq::Error::Status(code, _)) => return Err(http_err(format!("status {code}"))),
            Err(ureq::Error::Transport(err)) => return Err(http_err(err.to_string())),
        };
        let metadata: TokenMetadata =
            serde_json::from_str(&body).map_err(|e| AcquisitionError::Decode {
                context: format!("metadata for token {token_id}").into(),
                message: e.to_string(),
            })?;
        tracing::debug!(token_id, %url, "fetched metadata");
        adjust_image_url(&metadata, &self.gateway)
    }
}

/// Attempt every token id in `1..=total_supply` and keep the successes.
///
/// At most `concurrency` fetches are in flight; with `1` the ids are fetched
/// strictly in ascending order. Returns only after every attempt has resolved.
pub(crate) fn acquire_collection(
    source: &dyn MetadataSource,
    total_supply: u64,
    concurrency: usize,
) -> (MetadataStore, SkipReport) {
    let fetch = |token_id: TokenId| (token_id, source.fetch_token_metadata(token_id));
    let attempts: Vec<(TokenId, Result<TokenMetadata, AcquisitionError>)> = if concurrency <= 1 {
        (1..=total_supply).map(fetch).collect()
    } else {
        ThreadPoolBuilder::new()
            .num_threads(concurrency)
            .build()
            .map(|pool| pool.install(|| (1..=total_supply).into_par_iter().map(fetch).collect()))
            .unwrap_or_else(|err| {
                tracing::warn!(%err, "could not build fetch pool, fetching sequentially");
                (1..=total_supply).map(fetch).collect()
            })
    };

    let mut store = MetadataStore::new();
    let mut report = SkipReport::default();
    for (token_id, attempt) in attempts {
        match attempt {
            Ok(metadata) => {
                tracing::info!(token_id, "acquired metadata");
                store.insert(token_id, metadata);
            }
            Err(err) => {
                tracing::warn!(token_id, reason = %err, "skipping token");
                report.record(token_id, err.to_string());
            }
        }
    }
    (store, report)
}


#[cfg(test)]
mod tests {
    use super::fake::{FakeSource, spawn_server};
    use super::*;
    use crate::{RpcTokenUri, TemplateTokenUri};

    #[test]
    fn sequential_acquisition_is_ascending() {
        let source = FakeSource::uniform(6, &[]);
        let (store, report) = acquire_collection(&source, 6, 1);
        assert_eq!(store.len(), 6);
        assert!(report.is_empty());
        assert_eq!(*source.calls.lock().unwrap(), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn failed_tokens_are_skipped_and_reported() {
        let source = FakeSource::uniform(8, &[5]);
        let (store, report) = acquire_collection(&source, 8, 1);
        assert_eq!(store.len(), 7);
        assert!(!store.contains(5));
        assert_eq!(report.token_ids(), vec![5]);
        assert!(report.skipped[0].reason.contains("connection reset"));
    }

    #[test]
    fn bounded_pool_gathers_every_attempt() {
        let source = FakeSource::uniform(40, &[3, 17]);
        let (store, report) = acquire_collection(&source, 40, 4);
        assert_eq!(store.len(), 38);
        assert_eq!(report.token_ids(), vec![3, 17]);
        assert_eq!(source.calls.lock().unwrap().len(), 40);
    }

    #[test]
    fn ids_beyond_the_source_are_skipped() {
        let source = FakeSource::uniform(3, &[]);
        let (store, report) = acquire_collection(&source, 5, 1);
        assert_eq!(store.len(), 3);
        assert_eq!(report.token_ids(), vec![4, 5]);
    }

    fn metadata_server() -> String {
        spawn_server(|_, url, _| match url {
            "/meta/1" => (
                200,
                r#"{"name":"One","image":"ipfs://QmImg/1.png","attributes":[{"trait_type":"Hat","value":"Cap"}]}"#
                    .to_string(),
            ),
            "/meta/2" => (
                200,
                r#"{"image":"https://cdn.example.com/2.png","attributes":[]}"#.to_string(),
            ),
            "/meta/3" => (500, "upstream exploded".to_string()),
            "/meta/4" => (200, "<html>not json</html>".to_string()),
            "/meta/6" => (
                200,
                r#"{"rarity":"Legendary","attributes":[{"value":"Gold","score":"high"},{"trait_type":"Hat","value":"Cap","traitCount":"many"}]}"#
                    .to_string(),
            ),
            _ => (404, String::new()),
        })
    }

    #[test]
    fn http_source_fetches_and_normalizes_images() {
        let base = metadata_server();
        let source = HttpMetadataSource::new(
            Box::new(TemplateTokenUri::new(format!("{base}/meta/"))),
            "https://ipfs.io/ipfs/",
            Duration::from_secs(5),
        );

        let one = source.fetch_token_metadata(1).unwrap();
        assert_eq!(one.image.as_deref(), Some("https://ipfs.io/ipfs/QmImg/1.png"));
        assert_eq!(one.attributes[0].trait_key(), "Hat");
        assert_eq!(one.extra.get("name").and_then(|v| v.as_str()), Some("One"));

        let two = source.fetch_token_metadata(2).unwrap();
        assert_eq!(two.image.as_deref(), Some("https://cdn.example.com/2.png"));
        assert!(two.attributes.is_empty());
    }

    #[test]
    fn publisher_supplied_rarity_fields_do_not_fail_the_fetch() {
        let base = metadata_server();
        let source = HttpMetadataSource::new(
            Box::new(TemplateTokenUri::new(format!("{base}/meta/"))),
            "https://ipfs.io/ipfs/",
            Duration::from_secs(5),
        );

        let six = source.fetch_token_metadata(6).unwrap();
        assert!(six.rarity.is_none());
        assert_eq!(six.attributes.len(), 2);
        assert_eq!(six.attributes[0].trait_key(), crate::MISSING_TRAIT_TYPE);
        assert!(six.attributes[0].score.is_none());
        assert!(six.attributes[1].trait_count.is_none());
    }

    #[test]
    fn http_failures_become_skips() {
        let base = metadata_server();
        let source = HttpMetadataSource::new(
            Box::new(TemplateTokenUri::new(format!("{base}/meta/"))),
            "https://ipfs.io/ipfs/",
            Duration::from_secs(5),
        );

        assert!(matches!(
            source.fetch_token_metadata(3),
            Err(AcquisitionError::Http { .. })
        ));
        assert!(matches!(
            source.fetch_token_metadata(4),
            Err(AcquisitionError::Decode { .. })
        ));

        let (store, report) = acquire_collection(&source, 5, 2);
        assert_eq!(store.len(), 2);
        assert_eq!(report.token_ids(), vec![3, 4, 5]);
    }

    #[test]
    fn rpc_resolver_reads_token_uri() {
        let rpc = spawn_server(|is_post, _, body| {
            assert!(is_post);
            let request: serde_json::Value = serde_json::from_str(body).unwrap();
            let data = request["params"][0]["data"].as_str().unwrap();
            let token_id = u64::from_str_radix(&data[data.len() - 16..], 16).unwrap();
            if token_id == 9 {
                return (
                    200,
                    r#"{"jsonrpc":"2.0","id":9,"error":{"code":3,"message":"execution reverted"}}"#
                        .to_string(),
                );
            }
            let uri = format!("ipfs://QmCollection/{token_id}");
            let mut encoded = format!("{:064x}{:064x}", 32, uri.len());
            let mut data = hex::encode(uri.as_bytes());
            while data.len() % 64 != 0 {
                data.push('0');
            }
            encoded.push_str(&data);
            let reply = serde_json::json!({"jsonrpc": "2.0", "id": token_id, "result": format!("0x{encoded}")});
            (200, reply.to_string())
        });

        let resolver = RpcTokenUri::new(rpc, "0xf3e6dbbe461c6fa492cea7cb1f5c5ea660eb1b47", Duration::from_secs(5));
        assert_eq!(resolver.token_uri(42).unwrap(), "ipfs://QmCollection/42");
        let err = resolver.token_uri(9).unwrap_err();
        assert!(matches!(err, AcquisitionError::Rpc { token_id: 9, .. }));
        assert!(err.to_string().contains("execution reverted"));
    }
}
