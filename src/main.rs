// Module declarations
mod acquire;
mod aggregate;
mod annotate;
mod chain;
mod cli;
mod config;
mod config_file;
mod error;
mod locator;
mod persist;
mod pipeline;
mod ranking;
mod report;
mod run_log;
mod scoring;
mod store;
mod types;
mod util;

// Every module's items are re-exported at the crate root so modules can refer
// to each other through `crate::`.
#[allow(unused_imports)]
pub(crate) use acquire::*;
#[allow(unused_imports)]
pub(crate) use aggregate::*;
#[allow(unused_imports)]
pub(crate) use annotate::*;
#[allow(unused_imports)]
pub(crate) use chain::*;
#[allow(unused_imports)]
pub(crate) use cli::*;
#[allow(unused_imports)]
pub(crate) use config::*;
#[allow(unused_imports)]
pub(crate) use config_file::*;
#[allow(unused_imports)]
pub(crate) use error::*;
#[allow(unused_imports)]
pub(crate) use locator::*;
#[allow(unused_imports)]
pub(crate) use persist::*;
#[allow(unused_imports)]
pub(crate) use pipeline::*;
#[allow(unused_imports)]
pub(crate) use ranking::*;
#[allow(unused_imports)]
pub(crate) use report::*;
#[allow(unused_imports)]
pub(crate) use run_log::*;
#[allow(unused_imports)]
pub(crate) use scoring::*;
#[allow(unused_imports)]
pub(crate) use store::*;
#[allow(unused_imports)]
pub(crate) use types::*;
#[allow(unused_imports)]
pub(crate) use util::*;

use chrono::Utc;
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("nftrank=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Init { config } => {
            if config.exists() {
                eprintln!("Refusing to overwrite existing file: {}", config.display());
                std::process::exit(2);
            }
            save_file_config(&config, &FileConfig::from(&RunConfig::default()))?;
            println!("Created {}", config.display());
            Ok(())
        }

        Command::Rank(args) => {
            let file = load_file_config(&args.config)?;
            let config = RunConfig::resolve(file, args.overrides())?;
            let source = config.metadata_source();
            let outcome = run_collection(&config, &source);

            let summary = write_document(&config.output, &outcome.document)?;
            let entry = RunLogEntry {
                ts_utc: Utc::now().timestamp(),
                total_supply: config.total_supply,
                acquired: outcome.document.metadata.len(),
                skipped: outcome.skipped.skipped.clone(),
                output: summary.path.display().to_string(),
                digest: Some(summary.digest.clone()),
            };
            if let Err(err) = append_run_log(&config.log_dir, &entry) {
                tracing::warn!(%err, "could not append run log");
            }

            println!(
                "Done: supply={} acquired={} skipped={} trait_types={}",
                config.total_supply,
                outcome.document.metadata.len(),
                outcome.skipped.len(),
                outcome.trait_stats.len()
            );
            println!(
                "Updated metadata and final ranking saved to {} ({} bytes)",
                summary.path.display(),
                summary.bytes
            );
            Ok(())
        }

        Command::Rescore { input, out } => {
            let (stats, summary) = rescore_document(&input, out.as_deref())?;
            println!(
                "Rescored: trait_types={} -> {}",
                stats.len(),
                summary.path.display()
            );
            Ok(())
        }

        Command::Show { input, limit, json } => {
            let document = load_document(&input)?;
            if json {
                let top: Vec<&RankEntry> = document.rarity.iter().take(limit).collect();
                println!("{}", serde_json::to_string_pretty(&top)?);
                return Ok(());
            }
            let lines = ranking_lines(&document, limit);
            if lines.is_empty() {
                println!("No ranked tokens.");
            }
            for line in lines {
                println!("{line}");
            }
            Ok(())
        }

        Command::History {
            log_dir,
            limit,
            json,
        } => {
            let runs = load_recent_runs(&log_dir, limit);
            if json {
                println!("{}", serde_json::to_string_pretty(&runs)?);
                return Ok(());
            }
            if runs.is_empty() {
                println!("No runs recorded in {}", log_dir.display());
            }
            for line in history_lines(&runs) {
                println!("{line}");
            }
            Ok(())
        }
    }
}
