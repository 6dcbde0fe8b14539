//! Error types for the shard router.

use shardgate_ring::RingError;

/// Errors returned by [`ShardRouter`](crate::ShardRouter).
///
/// Every variant is a setup or programming mistake. An empty ring is not an
/// error: lookups report it as `Ok(None)`.
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    /// The ring was used before `init_hash_ring`.
    #[error("hash ring not initialized: call init_hash_ring first")]
    RingNotInitialized,

    /// The sharding key is not a usable header name.
    #[error("invalid sharding key {0:?}: must be a non-empty HTTP header name")]
    InvalidShardingKey(String),

    /// Ring construction failed.
    #[error("ring error: {0}")]
    Ring(#[from] RingError),
}
