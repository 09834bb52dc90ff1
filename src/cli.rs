use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::{ConfigOverrides, DEFAULT_CONFIG_FILE, DEFAULT_LOG_DIR};

#[derive(Parser)]
#[command(name = "nftrank")]
#[command(about = "Trait-frequency scoring and ranking for NFT collections", long_about = None)]
#[command(version)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Write a config file populated with the built-in defaults.
    Init {
        #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,
    },

    /// Fetch every token's metadata, score, rank, and write the document.
    Rank(RankArgs),

    /// Re-run scoring and ranking on a previously written document.
    Rescore {
        input: PathBuf,
        /// Output path (defaults to overwriting the input)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Print the top of the ranking stored in a document.
    Show {
        input: PathBuf,
        /// Number of entries
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,
        /// Output JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// List recent runs and the tokens they skipped.
    History {
        #[arg(long, default_value = DEFAULT_LOG_DIR)]
        log_dir: PathBuf,
        /// Number of runs
        #[arg(short = 'n', long, default_value_t = 5)]
        limit: usize,
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
pub(crate) struct RankArgs {
    /// Config file (missing file means defaults)
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    pub(crate) config: PathBuf,
    /// Collection total supply; token ids 1..=N are attempted
    #[arg(long)]
    pub(crate) supply: Option<u64>,
    /// ERC-721 contract address used for tokenURI lookups
    #[arg(long)]
    pub(crate) contract: Option<String>,
    /// Metadata base URI; token id is appended (skips the on-chain lookup)
    #[arg(long)]
    pub(crate) base_uri: Option<String>,
    /// JSON-RPC endpoint for tokenURI lookups
    #[arg(long)]
    pub(crate) rpc_url: Option<String>,
    /// HTTP gateway used for ipfs:// locators
    #[arg(long)]
    pub(crate) gateway: Option<String>,
    /// Maximum fetches in flight (1 = sequential)
    #[arg(short = 'j', long)]
    pub(crate) concurrency: Option<usize>,
    /// Per-request timeout (seconds)
    #[arg(long)]
    pub(crate) timeout_secs: Option<u64>,
    /// Output document path
    #[arg(short, long)]
    pub(crate) out: Option<PathBuf>,
    /// Directory for the per-run JSONL log
    #[arg(long)]
    pub(crate) log_dir: Option<PathBuf>,
}

impl RankArgs {
    pub(crate) fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            total_supply: self.supply,
            contract: self.contract.clone(),
            base_uri: self.base_uri.clone(),
            rpc_url: self.rpc_url.clone(),
            gateway: self.gateway.clone(),
            concurrency: self.concurrency,
            timeout_secs: self.timeout_secs,
            output: self.out.clone(),
            log_dir: self.log_dir.clone(),
        }
    }
}
