//! Hash-function fairness analysis.
//!
//! This crate provides:
//! - [`DistributionAnalyzer`]: routes a key corpus through one private ring per
//!   hash algorithm and scores how evenly the keys spread across shards.
//! - [`DistributionResult`] / [`QualityBand`]: the per-algorithm report.
//! - [`load_keys`]: reads a corpus file with one key per line.

mod analyzer;
mod error;
mod keys;
mod report;

pub use analyzer::{
    DEFAULT_REPLICAS, DistributionAnalyzer, DistributionResult, QualityBand, default_shards,
};
pub use error::AnalyzerError;
pub use keys::{load_keys, parse_keys};
