//! Consistent hashing ring implementation.

use std::collections::HashSet;

use tracing::debug;

use crate::error::RingError;
use crate::hash::{HashAlgorithm, HashFunction};

/// One replica of a shard on the ring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualNode {
    /// The shard this replica routes to.
    pub shard_id: String,
    /// Ring position.
    pub hash: u64,
}

/// Consistent hashing ring mapping keys onto shard identifiers.
///
/// Each shard is mapped to `replica_count` virtual nodes on a u64 ring. A key
/// belongs to the first virtual node whose position is at or after the key's
/// hash, wrapping around past `u64::MAX` back to the lowest position.
///
/// Mutation needs `&mut self` and lookups only `&self`, so a ring populated at
/// startup and then shared behind an `Arc` is safe to query concurrently.
#[derive(Debug, Clone)]
pub struct ConsistentHashRing {
    /// Virtual nodes, sorted ascending by `hash`.
    nodes: Vec<VirtualNode>,
    /// Virtual nodes created per shard.
    replica_count: usize,
    hash_fn: HashFunction,
}

impl ConsistentHashRing {
    /// Create an empty ring.
    ///
    /// Fails if `replica_count` is zero: a shard without virtual nodes could
    /// never receive traffic.
    pub fn new(replica_count: usize, hash_fn: HashFunction) -> Result<Self, RingError> {
        if replica_count == 0 {
            return Err(RingError::InvalidReplicaCount(replica_count));
        }
        Ok(Self {
            nodes: Vec::new(),
            replica_count,
            hash_fn,
        })
    }

    /// Add a shard to the ring.
    ///
    /// Places `replica_count` virtual nodes at `hash(shard_id ++ i)` for
    /// `i` in `0..replica_count`, then re-sorts the whole sequence. There is no
    /// removal; topology only grows.
    pub fn add_node(&mut self, shard_id: &str) {
        self.nodes.reserve(self.replica_count);
        for i in 0..self.replica_count {
            let hash = self.hash_fn.hash(&format!("{shard_id}{i}"));
            self.nodes.push(VirtualNode {
                shard_id: shard_id.to_string(),
                hash,
            });
        }
        // Stable sort: replicas colliding on the same position keep insertion order.
        self.nodes.sort_by_key(|n| n.hash);
        debug!(shard_id, replicas = self.replica_count, "added shard to ring");
    }

    /// Return the shard that owns `key`, or `None` if the ring is empty.
    ///
    /// Finds the first virtual node with `hash >= hash(key)`; if the key hashes
    /// past every node, wraps to the first one.
    pub fn get_node(&self, key: &str) -> Option<&str> {
        if self.nodes.is_empty() {
            return None;
        }

        let hash = self.hash_fn.hash(key);
        let idx = self.nodes.partition_point(|n| n.hash < hash);
        let node = self.nodes.get(idx).unwrap_or(&self.nodes[0]);
        Some(&node.shard_id)
    }

    /// Number of virtual nodes on the ring.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no shard has been added yet.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of distinct shards on the ring. A shard added twice counts once.
    pub fn shard_count(&self) -> usize {
        self.nodes
            .iter()
            .map(|n| n.shard_id.as_str())
            .collect::<HashSet<_>>()
            .len()
    }

    /// Virtual nodes created per shard.
    pub fn replica_count(&self) -> usize {
        self.replica_count
    }

    /// The hash algorithm placing nodes and keys.
    pub fn algorithm(&self) -> HashAlgorithm {
        self.hash_fn.algorithm()
    }

    /// The sorted virtual node sequence.
    pub fn nodes(&self) -> &[VirtualNode] {
        &self.nodes
    }
}
