//! Error types for ring construction and hash selection.

/// Errors that can occur while building a ring.
#[derive(Debug, thiserror::Error)]
pub enum RingError {
    /// The identifier does not name a supported hash algorithm.
    #[error("unknown hash algorithm: {0}")]
    UnknownAlgorithm(String),

    /// A ring needs at least one virtual node per shard.
    #[error("invalid replica count {0}: must be at least 1")]
    InvalidReplicaCount(usize),
}
