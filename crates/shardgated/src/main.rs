//! `shardgated`: the shardgate daemon.
//!
//! Routes every HTTP request to one backend shard, chosen by hashing the value
//! of a configured request header onto a consistent hash ring.
//!
//! # Usage
//!
//! ```text
//! SHARD_01_URL=http://shard01:80 SHARD_02_URL=http://shard02:80 \
//!     shardgated --sharding-key id_client        # route on the id_client header
//! shardgated -c shardgate.toml                   # start with a config file
//! shardgated --port 9090 --hash-algorithm md5    # override port and hash
//! shardgated --replicas 160                      # more virtual nodes per shard
//! ```

mod config;
mod telemetry;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use shardgate_proxy::{ProxyConfig, ProxyMetrics, ProxyServer};
use shardgate_ring::HashFunction;
use shardgate_router::ShardRouter;
use tracing::info;

use config::{CliConfig, Settings};

// -----------------------------------------------------------------------
// CLI definition
// -----------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "shardgated",
    version,
    about = "Consistent-hash sharding reverse proxy"
)]
struct Cli {
    /// Path to TOML config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listen address (e.g. "127.0.0.1:8080").
    #[arg(short = 'l', long)]
    listen_addr: Option<String>,

    /// Override only the listen port.
    #[arg(long, env = "ROUTER_PORT")]
    port: Option<u16>,

    /// Request header carrying the routing key.
    #[arg(long, env = "SHARDING_KEY")]
    sharding_key: Option<String>,

    /// Hash algorithm: SHA512 (default), SHA256, SHA1, MD5 or MURMUR3.
    #[arg(long, env = "HASHING_ALGORITHM")]
    hash_algorithm: Option<String>,

    /// Virtual nodes per shard.
    #[arg(long)]
    replicas: Option<usize>,
}

impl Cli {
    /// Overlay command-line values onto the file config.
    fn apply(&self, config: &mut CliConfig) {
        if let Some(addr) = &self.listen_addr {
            config.server.listen_addr = addr.clone();
        }
        if let Some(port) = self.port {
            config.server.listen_addr = with_port(&config.server.listen_addr, port);
        }
        if let Some(key) = &self.sharding_key {
            config.router.sharding_key = key.clone();
        }
        if let Some(algorithm) = &self.hash_algorithm {
            config.ring.hash_algorithm = Some(algorithm.clone());
        }
        if let Some(replicas) = self.replicas {
            config.ring.replicas = Some(replicas);
        }
    }
}

/// Replace the port of a `host:port` address, keeping the host.
fn with_port(addr: &str, port: u16) -> String {
    let host = addr.rsplit_once(':').map_or(addr, |(host, _)| host);
    let host = if host.is_empty() { "0.0.0.0" } else { host };
    format!("{host}:{port}")
}

// -----------------------------------------------------------------------
// Entrypoint
// -----------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = CliConfig::load(cli.config.as_deref()).context("failed to load config")?;
    cli.apply(&mut config);

    telemetry::init(&config.log.level);

    let env = std::env::vars_os()
        .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)));
    let settings = Settings::initialize(&config, env).context("invalid configuration")?;

    let router = Arc::new(build_router(&settings)?);
    let metrics = Arc::new(ProxyMetrics::new().context("failed to register metrics")?);

    let server = ProxyServer::new(ProxyConfig {
        router,
        metrics,
        upstream_timeout: settings.upstream_timeout,
        body_limit: settings.body_limit,
    })
    .context("failed to create proxy")?;

    info!(addr = %settings.listen_addr, "starting shardgated");
    server
        .serve_with_shutdown(&settings.listen_addr, shutdown_signal())
        .await
        .with_context(|| format!("failed to serve on {}", settings.listen_addr))?;

    info!("shardgated stopped");
    Ok(())
}

/// Build and populate the router. The result is never mutated again.
fn build_router(settings: &Settings) -> Result<ShardRouter> {
    let hash_fn = HashFunction::resolve(settings.hash_algorithm.as_deref());

    let mut router =
        ShardRouter::new(&settings.sharding_key).context("invalid sharding key header")?;
    router.init_hash_ring(settings.replicas, hash_fn)?;
    for shard in &settings.shards {
        router
            .add_shard(&shard.url)
            .with_context(|| format!("failed to register {shard}"))?;
    }

    info!(
        algorithm = %hash_fn.algorithm(),
        replicas = settings.replicas,
        shards = settings.shards.len(),
        "hash ring ready"
    );
    Ok(router)
}

/// Resolve when the process receives Ctrl-C.
async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received, draining connections");
    }
}
