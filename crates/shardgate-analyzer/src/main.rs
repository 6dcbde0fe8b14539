//! `hashing-distribution`: compare hash functions on the router's ring.
//!
//! # Usage
//!
//! ```text
//! hashing-distribution keys.txt                 # default 3 shards, 10 replicas
//! hashing-distribution keys.txt -r 160          # more virtual nodes per shard
//! hashing-distribution keys.txt -s a -s b -s c  # custom shard names
//! ```
//!
//! Each algorithm gets its own ring over the same shards, so the reports
//! differ only by hash function.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use shardgate_analyzer::{DEFAULT_REPLICAS, DistributionAnalyzer, default_shards, load_keys};
use shardgate_ring::HashAlgorithm;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "hashing-distribution",
    version,
    about = "Measure how evenly each hash function spreads keys across shards"
)]
struct Cli {
    /// File with one key per line.
    keys: PathBuf,

    /// Virtual nodes per shard.
    #[arg(short, long, default_value_t = DEFAULT_REPLICAS)]
    replicas: usize,

    /// Shard name. Can be repeated; defaults to shard01..shard03.
    #[arg(short, long = "shard")]
    shards: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let keys = load_keys(&cli.keys)
        .with_context(|| format!("cannot analyze {}", cli.keys.display()))?;
    let shards = if cli.shards.is_empty() {
        default_shards()
    } else {
        cli.shards
    };

    let analyzer = DistributionAnalyzer::new(cli.replicas, shards)?;
    info!(
        keys = keys.len(),
        replicas = analyzer.replicas(),
        shards = analyzer.shards().len(),
        "running analysis"
    );

    println!(
        "Analyzing {} keys over {} shards ({} replicas each)\n",
        keys.len(),
        analyzer.shards().len(),
        analyzer.replicas()
    );
    for result in analyzer.analyze_all(&keys, &HashAlgorithm::ALL)? {
        println!("{result}\n");
    }

    Ok(())
}
