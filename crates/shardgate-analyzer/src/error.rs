//! Error types for distribution analysis.

use std::path::PathBuf;

use shardgate_ring::RingError;

/// Errors that can occur while loading a corpus or running an analysis.
#[derive(Debug, thiserror::Error)]
pub enum AnalyzerError {
    /// The key file could not be opened or read.
    #[error("failed to read key file {path}: {source}")]
    Io {
        /// The file that failed.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The corpus had no usable keys.
    #[error("no keys found")]
    NoKeys,

    /// The analyzer was configured without shards.
    #[error("at least one shard is required")]
    NoShards,

    /// Ring construction failed.
    #[error("ring error: {0}")]
    Ring(#[from] RingError),
}
