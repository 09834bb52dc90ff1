use std::path::PathBuf;
use std::time::Duration;

use crate::{
    FileConfig, HttpMetadataSource, RarityError, Result, RpcTokenUri, TemplateTokenUri,
    TokenUriResolver, env_optional, normalize_gateway,
};

pub(crate) const DEFAULT_TOTAL_SUPPLY: u64 = 8887;
pub(crate) const DEFAULT_CONTRACT: &str = "0xf3e6dbbe461c6fa492cea7cb1f5c5ea660eb1b47";
pub(crate) const DEFAULT_RPC_URL: &str = "https://ethereum-rpc.publicnode.com";
pub(crate) const DEFAULT_IPFS_GATEWAY: &str = "https://ipfs.io/ipfs/";
pub(crate) const DEFAULT_OUTPUT: &str = "metadata.json";
pub(crate) const DEFAULT_LOG_DIR: &str = "logs";
pub(crate) const DEFAULT_CONFIG_FILE: &str = "nftrank.json";
pub(crate) const DEFAULT_CONCURRENCY: usize = 1;
pub(crate) const DEFAULT_TIMEOUT_SECS: u64 = 30;

const ENV_RPC_URL: &str = "NFTRANK_RPC_URL";
const ENV_GATEWAY: &str = "NFTRANK_GATEWAY";

/// Fully resolved settings for one rank run.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RunConfig {
    pub(crate) total_supply: u64,
    pub(crate) contract: String,
    pub(crate) base_uri: Option<String>,
    pub(crate) rpc_url: String,
    pub(crate) gateway: String,
    pub(crate) concurrency: usize,
    pub(crate) timeout_secs: u64,
    pub(crate) output: PathBuf,
    pub(crate) log_dir: PathBuf,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            total_supply: DEFAULT_TOTAL_SUPPLY,
            contract: DEFAULT_CONTRACT.to_string(),
            base_uri: None,
            rpc_url: DEFAULT_RPC_URL.to_string(),
            gateway: DEFAULT_IPFS_GATEWAY.to_string(),
            concurrency: DEFAULT_CONCURRENCY,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            output: PathBuf::from(DEFAULT_OUTPUT),
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
        }
    }
}

/// Values given on the command line; `None` falls through to env, file, default.
#[derive(Debug, Clone, Default)]
pub(crate) struct ConfigOverrides {
    pub(crate) total_supply: Option<u64>,
    pub(crate) contract: Option<String>,
    pub(crate) base_uri: Option<String>,
    pub(crate) rpc_url: Option<String>,
    pub(crate) gateway: Option<String>,
    pub(crate) concurrency: Option<usize>,
    pub(crate) timeout_secs: Option<u64>,
    pub(crate) output: Option<PathBuf>,
    pub(crate) log_dir: Option<PathBuf>,
}

impl RunConfig {
    pub(crate) fn resolve(file: FileConfig, cli: ConfigOverrides) -> Result<Self> {
        let defaults = RunConfig::default();
        let config = RunConfig {
            total_supply: cli
                .total_supply
                .or(file.total_supply)
                .unwrap_or(defaults.total_supply),
            contract: cli.contract.or(file.contract).unwrap_or(defaults.contract),
            base_uri: cli
                .base_uri
                .or(file.base_uri)
                .filter(|uri| !uri.trim().is_empty()),
            rpc_url: cli
                .rpc_url
                .or_else(|| env_optional(ENV_RPC_URL))
                .or(file.rpc_url)
                .unwrap_or(defaults.rpc_url),
            gateway: normalize_gateway(
                &cli.gateway
                    .or_else(|| env_optional(ENV_GATEWAY))
                    .or(file.gateway)
                    .unwrap_or(defaults.gateway),
            ),
            concurrency: cli
                .concurrency
                .or(file.concurrency)
                .unwrap_or(defaults.concurrency),
            timeout_secs: cli
                .timeout_secs
                .or(file.timeout_secs)
                .unwrap_or(defaults.timeout_secs),
            output: cli.output.or(file.output).unwrap_or(defaults.output),
            log_dir: cli.log_dir.or(file.log_dir).unwrap_or(defaults.log_dir),
        };
        config.validate()?;
        Ok(config)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.total_supply == 0 {
            return Err(RarityError::Config {
                reason: "total_supply must be at least 1".into(),
            });
        }
        if self.concurrency == 0 {
            return Err(RarityError::Config {
                reason: "concurrency must be at least 1".into(),
            });
        }
        if self.timeout_secs == 0 {
            return Err(RarityError::Config {
                reason: "timeout_secs must be at least 1".into(),
            });
        }
        if self.base_uri.is_none() && self.contract.trim().is_empty() {
            return Err(RarityError::Config {
                reason: "either base_uri or contract is required".into(),
            });
        }
        Ok(())
    }

    pub(crate) fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// A configured base URI wins over the on-chain lookup.
    pub(crate) fn token_uri_resolver(&self) -> Box<dyn TokenUriResolver> {
        match &self.base_uri {
            Some(base) => Box::new(TemplateTokenUri::new(base.clone())),
            None => Box::new(RpcTokenUri::new(
                self.rpc_url.clone(),
                self.contract.clone(),
                self.timeout(),
            )),
        }
    }

    pub(crate) fn metadata_source(&self) -> HttpMetadataSource {
        HttpMetadataSource::new(self.token_uri_resolver(), self.gateway.clone(), self.timeout())
    }
}
