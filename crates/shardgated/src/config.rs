//! TOML configuration for the shardgate daemon.
//!
//! [`CliConfig`] mirrors the file layout and is overlaid with CLI flags.
//! [`Settings::initialize`] then validates it against the environment and
//! produces the immutable startup settings.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, bail};
use serde::Deserialize;
use shardgate_router::{Shard, discover_shards};
use tracing::{info, warn};

/// Top-level configuration, parsed from TOML.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Listener and upstream client.
    pub server: ServerSection,
    /// Request routing.
    pub router: RouterSection,
    /// Ring construction.
    pub ring: RingSection,
    /// Static shard list, used when no `SHARD_<N>_URL` variable is set.
    pub shards: ShardsSection,
    /// Logging configuration.
    pub log: LogSection,
}

/// `[server]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// Address the proxy listens on.
    pub listen_addr: String,
    /// Per-request timeout for forwarded requests, in seconds.
    pub upstream_timeout_secs: u64,
    /// Largest request body accepted for forwarding, in bytes.
    pub body_limit: usize,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            upstream_timeout_secs: shardgate_proxy::DEFAULT_UPSTREAM_TIMEOUT.as_secs(),
            body_limit: shardgate_proxy::DEFAULT_BODY_LIMIT,
        }
    }
}

/// `[router]` section.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RouterSection {
    /// Request header carrying the routing key. Required.
    pub sharding_key: String,
}

/// `[ring]` section.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RingSection {
    /// Hash algorithm identifier (`"SHA512"`, `"md5"`, ...). Absent means the
    /// default algorithm.
    pub hash_algorithm: Option<String>,
    /// Virtual nodes per shard. Defaults to the number of shards.
    pub replicas: Option<usize>,
}

/// `[shards]` section.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ShardsSection {
    /// Shard base URLs, e.g. `"http://shard01:80"`.
    pub urls: Vec<String>,
}

/// `[log]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LogSection {
    /// Log level filter (e.g. `"info"`, `"debug"`, `"warn"`).
    pub level: String,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl CliConfig {
    /// Load config from a TOML file, or use defaults if no path given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(p) => {
                let content = std::fs::read_to_string(p)
                    .with_context(|| format!("cannot read {}", p.display()))?;
                let config: CliConfig = toml::from_str(&content)?;
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }

    /// Parse config from a TOML string (used in tests).
    #[cfg(test)]
    pub fn from_toml(s: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(s)?)
    }
}

/// Validated startup settings, built once and never mutated.
#[derive(Debug, Clone)]
pub struct Settings {
    pub listen_addr: String,
    pub sharding_key: String,
    pub hash_algorithm: Option<String>,
    pub replicas: usize,
    pub shards: Vec<Shard>,
    pub upstream_timeout: Duration,
    pub body_limit: usize,
}

impl Settings {
    /// Validate `config` and discover shards from `env`.
    ///
    /// `SHARD_<N>_URL` variables win over `[shards] urls`. Fails when no shard
    /// is configured, the sharding key is empty or the replica count is 0.
    pub fn initialize<I, K, V>(config: &CliConfig, env: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let sharding_key = config.router.sharding_key.trim();
        if sharding_key.is_empty() {
            bail!("sharding key is not set (SHARDING_KEY or [router] sharding_key)");
        }

        let mut shards = discover_shards(env);
        if shards.is_empty() {
            shards = config
                .shards
                .urls
                .iter()
                .map(|url| url.trim())
                .filter(|url| !url.is_empty())
                .enumerate()
                .map(|(i, url)| Shard {
                    id: i as u32 + 1,
                    name: format!("SHARD_{}", i + 1),
                    url: url.to_string(),
                })
                .collect();
        }
        if shards.is_empty() {
            bail!("no shards configured (set SHARD_<N>_URL or [shards] urls)");
        }

        let replicas = config.ring.replicas.unwrap_or(shards.len());
        if replicas == 0 {
            bail!("replica count must be at least 1");
        }
        if config.ring.replicas.is_none() {
            warn!(
                replicas,
                "replica count not set, defaulting to the number of shards"
            );
        }

        let settings = Self {
            listen_addr: config.server.listen_addr.clone(),
            sharding_key: sharding_key.to_string(),
            hash_algorithm: config.ring.hash_algorithm.clone(),
            replicas,
            shards,
            upstream_timeout: Duration::from_secs(config.server.upstream_timeout_secs),
            body_limit: config.server.body_limit,
        };

        info!(
            listen = %settings.listen_addr,
            sharding_key = %settings.sharding_key,
            shards = settings.shards.len(),
            replicas = settings.replicas,
            "settings initialized"
        );
        Ok(settings)
    }
}
