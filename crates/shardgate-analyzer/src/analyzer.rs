//! Distribution analysis over private rings.

use std::collections::{BTreeMap, HashSet};
use std::time::{Duration, Instant};

use shardgate_ring::{ConsistentHashRing, HashAlgorithm, HashFunction};
use tracing::debug;

use crate::error::AnalyzerError;

/// Replica count used when none is given.
pub const DEFAULT_REPLICAS: usize = 10;

/// The three-shard topology analyzed by default.
pub fn default_shards() -> Vec<String> {
    ["shard01", "shard02", "shard03"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Ordinal verdict on how evenly keys were spread, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum QualityBand {
    /// Average deviation ≤ 5% of the expected share.
    Excellent,
    /// ≤ 10%.
    VeryGood,
    /// ≤ 15%.
    Good,
    /// ≤ 25%.
    Regular,
    /// Anything worse.
    Poor,
}

impl QualityBand {
    /// Classify an average deviation, as a percentage of the expected
    /// per-shard count.
    pub fn from_deviation_percent(percent: f64) -> Self {
        if percent <= 5.0 {
            Self::Excellent
        } else if percent <= 10.0 {
            Self::VeryGood
        } else if percent <= 15.0 {
            Self::Good
        } else if percent <= 25.0 {
            Self::Regular
        } else {
            Self::Poor
        }
    }
}

/// Outcome of routing one corpus with one algorithm.
#[derive(Debug, Clone)]
pub struct DistributionResult {
    pub algorithm: HashAlgorithm,
    /// Keys routed to each shard. Every analyzed shard is present, including
    /// those that received nothing.
    pub per_shard: BTreeMap<String, usize>,
    pub total_keys: usize,
    pub std_dev: f64,
    pub variance: f64,
    pub max_deviation: f64,
    pub min_deviation: f64,
    /// Mean absolute deviation as a percentage of [`expected`](Self::expected).
    pub average_deviation_percent: f64,
    pub quality: QualityBand,
    /// Wall time to build the ring and route every key.
    pub elapsed: Duration,
}

impl DistributionResult {
    /// Keys each shard would receive under a perfectly even split.
    pub fn expected(&self) -> f64 {
        self.total_keys as f64 / self.per_shard.len() as f64
    }

    /// Keys routed to `shard` (0 for unknown shards).
    pub fn count(&self, shard: &str) -> usize {
        self.per_shard.get(shard).copied().unwrap_or(0)
    }

    /// Share of all keys routed to `shard`, in percent.
    pub fn percentage(&self, shard: &str) -> f64 {
        self.count(shard) as f64 / self.total_keys as f64 * 100.0
    }

    /// Absolute distance of `shard`'s count from the expected count.
    pub fn deviation(&self, shard: &str) -> f64 {
        (self.count(shard) as f64 - self.expected()).abs()
    }
}

/// Aggregate deviation figures over per-shard counts.
#[derive(Debug, Clone, Copy, PartialEq)]
struct DeviationStats {
    variance: f64,
    max: f64,
    min: f64,
    mean: f64,
}

fn deviation_stats(counts: &[usize], expected: f64) -> DeviationStats {
    let deviations: Vec<f64> = counts
        .iter()
        .map(|&c| (c as f64 - expected).abs())
        .collect();
    let n = deviations.len() as f64;

    DeviationStats {
        variance: deviations.iter().map(|d| d * d).sum::<f64>() / n,
        max: deviations.iter().copied().fold(0.0, f64::max),
        min: deviations.iter().copied().fold(f64::INFINITY, f64::min),
        mean: deviations.iter().sum::<f64>() / n,
    }
}

/// Measures how fairly each hash algorithm spreads a key corpus.
///
/// Every analysis builds a fresh ring, so results for different algorithms
/// never share state.
#[derive(Debug, Clone)]
pub struct DistributionAnalyzer {
    replicas: usize,
    shards: Vec<String>,
}

impl DistributionAnalyzer {
    /// Create an analyzer over `shards`, each placed `replicas` times.
    ///
    /// Duplicate shard names are ignored.
    pub fn new(replicas: usize, shards: Vec<String>) -> Result<Self, AnalyzerError> {
        let mut seen = HashSet::new();
        let shards: Vec<String> = shards
            .into_iter()
            .filter(|s| seen.insert(s.clone()))
            .collect();

        if shards.is_empty() {
            return Err(AnalyzerError::NoShards);
        }
        // Rejects a zero replica count.
        ConsistentHashRing::new(replicas, HashFunction::default())?;

        Ok(Self { replicas, shards })
    }

    /// Virtual nodes per shard.
    pub fn replicas(&self) -> usize {
        self.replicas
    }

    /// Shards under test.
    pub fn shards(&self) -> &[String] {
        &self.shards
    }

    /// Route `keys` through a ring hashed with `algorithm`.
    pub fn analyze(
        &self,
        keys: &[String],
        algorithm: HashAlgorithm,
    ) -> Result<DistributionResult, AnalyzerError> {
        if keys.is_empty() {
            return Err(AnalyzerError::NoKeys);
        }

        let start = Instant::now();

        let mut ring = ConsistentHashRing::new(self.replicas, HashFunction::new(algorithm))?;
        for shard in &self.shards {
            ring.add_node(shard);
        }

        let mut per_shard: BTreeMap<String, usize> =
            self.shards.iter().map(|s| (s.clone(), 0)).collect();
        for key in keys {
            if let Some(count) = ring.get_node(key).and_then(|s| per_shard.get_mut(s)) {
                *count += 1;
            }
        }

        let elapsed = start.elapsed();

        let total_keys = keys.len();
        let expected = total_keys as f64 / self.shards.len() as f64;
        let counts: Vec<usize> = per_shard.values().copied().collect();
        let stats = deviation_stats(&counts, expected);
        let average_deviation_percent = stats.mean / expected * 100.0;

        debug!(%algorithm, total_keys, ?elapsed, "distribution analyzed");

        Ok(DistributionResult {
            algorithm,
            per_shard,
            total_keys,
            std_dev: stats.variance.sqrt(),
            variance: stats.variance,
            max_deviation: stats.max,
            min_deviation: stats.min,
            average_deviation_percent,
            quality: QualityBand::from_deviation_percent(average_deviation_percent),
            elapsed,
        })
    }

    /// Analyze `keys` once per algorithm, in the given order.
    pub fn analyze_all(
        &self,
        keys: &[String],
        algorithms: &[HashAlgorithm],
    ) -> Result<Vec<DistributionResult>, AnalyzerError> {
        algorithms
            .iter()
            .map(|&algorithm| self.analyze(keys, algorithm))
            .collect()
    }
}

impl Default for DistributionAnalyzer {
    fn default() -> Self {
        Self {
            replicas: DEFAULT_REPLICAS,
            shards: default_shards(),
        }
    }
}
