//! Integration test: end-to-end routing scenarios.
//!
//! Router setup, lookup and distribution analysis as a deployment would
//! drive them.

use std::io::Write;

use shardgate_analyzer::{DistributionAnalyzer, load_keys};
use shardgate_integration_tests::{shard_names, user_keys};
use shardgate_ring::{HashAlgorithm, HashFunction};
use shardgate_router::{RouterError, ShardRouter};

fn populated_router(hash_fn: HashFunction, replicas: usize, shards: &[String]) -> ShardRouter {
    let mut router = ShardRouter::new("id_client").unwrap();
    router.init_hash_ring(replicas, hash_fn).unwrap();
    for shard in shards {
        router.add_shard(shard).unwrap();
    }
    router
}

/// Three shards, 10 replicas, SHA-512: a key keeps resolving to one shard.
#[test]
fn test_stable_lookup() {
    let router = populated_router(HashFunction::new(HashAlgorithm::Sha512), 10, &shard_names(3));

    let first = router.shard_host("user123").unwrap();
    assert_eq!(first, Some("shard03"));
    for _ in 0..10 {
        assert_eq!(router.shard_host("user123").unwrap(), first);
    }
}

/// Every algorithm gives every shard at least one of `user0..user999`.
#[test]
fn test_distribution_over_user_keys() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    for key in user_keys(1000) {
        writeln!(file, "{key}").unwrap();
    }
    let keys = load_keys(file.path()).unwrap();
    assert_eq!(keys.len(), 1000);

    let results = DistributionAnalyzer::default()
        .analyze_all(&keys, &HashAlgorithm::ALL)
        .unwrap();
    assert_eq!(results.len(), HashAlgorithm::ALL.len());

    for result in results {
        assert_eq!(result.per_shard.len(), 3);
        for (shard, count) in &result.per_shard {
            assert!(*count > 0, "{}: {shard} empty", result.algorithm);
        }
    }
}

/// The analyzer sees the same placement the router serves with.
#[test]
fn test_analyzer_matches_router() {
    let keys = user_keys(300);
    let shards = shard_names(3);

    for algorithm in HashAlgorithm::ALL {
        let router = populated_router(HashFunction::new(algorithm), 10, &shards);
        let mut expected = std::collections::BTreeMap::new();
        for key in &keys {
            let shard = router.shard_host(key).unwrap().unwrap();
            *expected.entry(shard.to_string()).or_insert(0usize) += 1;
        }

        let result = DistributionAnalyzer::new(10, shards.clone())
            .unwrap()
            .analyze(&keys, algorithm)
            .unwrap();
        assert_eq!(result.per_shard, expected, "{algorithm}");
    }
}

/// Registering a shard before the ring exists fails fast.
#[test]
fn test_add_shard_before_init_fails() {
    let mut router = ShardRouter::new("id_client").unwrap();
    assert!(matches!(
        router.add_shard("shard01"),
        Err(RouterError::RingNotInitialized)
    ));
    assert!(matches!(
        router.shard_host("user123"),
        Err(RouterError::RingNotInitialized)
    ));
}

/// An initialized ring without shards reports no destination.
#[test]
fn test_empty_ring_has_no_destination() {
    let router = populated_router(HashFunction::default(), 10, &[]);
    assert_eq!(router.shard_host("user123").unwrap(), None);
}

/// Unknown and absent algorithm names both route like SHA-512.
#[test]
fn test_unresolved_algorithm_routes_like_default() {
    let shards = shard_names(3);
    let reference = populated_router(HashFunction::new(HashAlgorithm::Sha512), 10, &shards);
    let unknown = populated_router(HashFunction::resolve(Some("CRC32")), 10, &shards);
    let absent = populated_router(HashFunction::resolve(None), 10, &shards);

    for key in user_keys(200) {
        let expected = reference.shard_host(&key).unwrap();
        assert_eq!(unknown.shard_host(&key).unwrap(), expected);
        assert_eq!(absent.shard_host(&key).unwrap(), expected);
    }
}
