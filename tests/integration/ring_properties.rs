//! Integration test: statistical and structural ring properties.
//!
//! Exercises rings the way the router builds them, over realistic key
//! corpora rather than hand-picked keys.

use std::collections::HashMap;

use shardgate_integration_tests::{build_ring, random_keys, shard_names, shares, user_keys};
use shardgate_ring::HashAlgorithm;

/// 3 shards, 10,000 uniformly random keys per trial: every shard's share
/// stays within 25% of the ideal third in at least 95% of trials.
#[test]
fn test_fairness_bound_holds_across_trials() {
    let shards = shard_names(3);
    let ring = build_ring(HashAlgorithm::Sha512, 160, &shards);
    let ideal = 1.0 / 3.0;
    let mut rng = rand::rng();

    let trials = 20;
    let mut passed = 0;
    for _ in 0..trials {
        let keys = random_keys(&mut rng, 10_000);
        let fair = shares(&ring, &shards, &keys)
            .iter()
            .all(|share| (share - ideal).abs() <= ideal * 0.25);
        if fair {
            passed += 1;
        }
    }

    assert!(
        passed * 100 >= trials * 95,
        "only {passed}/{trials} trials within bound"
    );
}

/// Adding a shard only moves keys onto the new shard, never between the
/// existing ones.
#[test]
fn test_adding_shard_only_moves_keys_to_it() {
    let keys = user_keys(10_000);
    let before_shards = shard_names(3);
    let after_shards = shard_names(4);

    for algorithm in HashAlgorithm::ALL {
        let before = build_ring(algorithm, 160, &before_shards);
        let after = build_ring(algorithm, 160, &after_shards);

        let mut moved = 0;
        for key in &keys {
            let old = before.get_node(key).unwrap();
            let new = after.get_node(key).unwrap();
            if old != new {
                assert_eq!(new, "shard04", "{algorithm}: {key} moved {old} -> {new}");
                moved += 1;
            }
        }
        assert!(moved > 0, "{algorithm}: new shard received no keys");
        assert!(moved < keys.len() / 2, "{algorithm}: {moved} keys moved");
    }
}

/// Mapping depends only on the shard set, not on registration order.
#[test]
fn test_registration_order_is_irrelevant() {
    let keys = user_keys(2_000);
    let shards = shard_names(5);
    let mut reversed = shards.clone();
    reversed.reverse();

    for algorithm in HashAlgorithm::ALL {
        let a = build_ring(algorithm, 40, &shards);
        let b = build_ring(algorithm, 40, &reversed);
        assert_eq!(a.nodes(), b.nodes(), "{algorithm}: rings differ");
        for key in &keys {
            assert_eq!(a.get_node(key), b.get_node(key));
        }
    }
}

/// Keys differing only in case always share a shard.
#[test]
fn test_routing_ignores_key_case() {
    let shards = shard_names(3);
    for algorithm in HashAlgorithm::ALL {
        let ring = build_ring(algorithm, 10, &shards);
        for key in user_keys(200) {
            assert_eq!(ring.get_node(&key), ring.get_node(&key.to_uppercase()));
        }
    }
}

/// Every key lands on a registered shard and every shard gets some keys.
#[test]
fn test_all_shards_reachable() {
    let shards = shard_names(8);
    let keys = user_keys(5_000);

    for algorithm in HashAlgorithm::ALL {
        let ring = build_ring(algorithm, 160, &shards);
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for key in &keys {
            *counts.entry(ring.get_node(key).unwrap()).or_default() += 1;
        }
        assert_eq!(counts.len(), 8, "{algorithm}: {counts:?}");
    }
}
