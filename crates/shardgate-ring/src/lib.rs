//! Consistent hashing ring for deterministic request-to-shard routing.
//!
//! This crate provides:
//!
//! - [`HashAlgorithm`] / [`HashFunction`]: the hash function registry. Every
//!   supported algorithm maps a lower-cased string onto a `u64`.
//! - [`ConsistentHashRing`]: a sorted sequence of virtual nodes. Each shard is
//!   placed on the ring `replica_count` times at `hash(shard_id ++ i)`, and a key
//!   is served by the first virtual node at or after `hash(key)`, wrapping back
//!   to the start of the ring.
//!
//! The ring is populated once at startup and then only read, so it carries no
//! internal synchronization.

mod error;
mod hash;
mod ring;

pub use error::RingError;
pub use hash::{HashAlgorithm, HashFunction};
pub use ring::{ConsistentHashRing, VirtualNode};
