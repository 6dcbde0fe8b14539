//! Request-to-shard routing.

use http::{HeaderMap, HeaderName};
use shardgate_ring::{ConsistentHashRing, HashFunction};
use tracing::{debug, info};

use crate::error::RouterError;

/// Maps inbound requests onto shard hosts.
///
/// Built in two steps at startup: [`init_hash_ring`](Self::init_hash_ring),
/// then one [`add_shard`](Self::add_shard) per backend. Afterwards the router
/// is typically moved into an `Arc` and only queried.
#[derive(Debug)]
pub struct ShardRouter {
    /// Header carrying the routing key.
    sharding_key: HeaderName,
    ring: Option<ConsistentHashRing>,
}

impl ShardRouter {
    /// Create a router that reads the routing key from header `sharding_key`.
    pub fn new(sharding_key: &str) -> Result<Self, RouterError> {
        let name = HeaderName::try_from(sharding_key.trim())
            .map_err(|_| RouterError::InvalidShardingKey(sharding_key.to_string()))?;
        Ok(Self {
            sharding_key: name,
            ring: None,
        })
    }

    /// The configured routing header.
    pub fn sharding_key_header(&self) -> &HeaderName {
        &self.sharding_key
    }

    /// Extract the routing key from request headers.
    ///
    /// Any UTF-8 value is a key, including non-ASCII tenant ids. Returns `""`
    /// when the header is missing or its bytes are not UTF-8; all such requests
    /// hash to the same ring position and therefore the same shard.
    pub fn sharding_key<'a>(&self, headers: &'a HeaderMap) -> &'a str {
        headers
            .get(&self.sharding_key)
            .and_then(|v| std::str::from_utf8(v.as_bytes()).ok())
            .unwrap_or("")
    }

    /// Build the hash ring. A second call is a no-op.
    pub fn init_hash_ring(
        &mut self,
        replicas: usize,
        hash_fn: HashFunction,
    ) -> Result<(), RouterError> {
        if self.ring.is_some() {
            debug!("hash ring already initialized");
            return Ok(());
        }

        self.ring = Some(ConsistentHashRing::new(replicas, hash_fn)?);
        info!(replicas, algorithm = %hash_fn.algorithm(), "hash ring initialized");
        Ok(())
    }

    /// Register a backend host on the ring.
    pub fn add_shard(&mut self, host: &str) -> Result<(), RouterError> {
        let ring = self.ring.as_mut().ok_or(RouterError::RingNotInitialized)?;
        ring.add_node(host);
        info!(shard = host, "added shard to hash ring");
        Ok(())
    }

    /// Resolve the shard host for `key`.
    ///
    /// `Ok(None)` means the ring has no shards and the request cannot be
    /// routed.
    pub fn shard_host(&self, key: &str) -> Result<Option<&str>, RouterError> {
        let ring = self.ring.as_ref().ok_or(RouterError::RingNotInitialized)?;
        let host = ring.get_node(key);
        debug!(key, host = host.unwrap_or(""), "resolved sharding key");
        Ok(host)
    }

    /// Whether `init_hash_ring` has run.
    pub fn is_initialized(&self) -> bool {
        self.ring.is_some()
    }

    /// The underlying ring, once initialized.
    pub fn ring(&self) -> Option<&ConsistentHashRing> {
        self.ring.as_ref()
    }
}
