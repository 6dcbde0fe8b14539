//! Integration test: proxy routing over real sockets.
//!
//! A proxy in front of three echo backends; every request must land on the
//! backend the router assigns to its key.

use shardgate_integration_tests::{ProxyHarness, user_keys};
use shardgate_ring::HashAlgorithm;

#[tokio::test]
async fn test_requests_reach_assigned_backend() {
    let h = ProxyHarness::start(3, HashAlgorithm::Sha512, 160).await;

    for key in user_keys(60) {
        let assigned = h.router.shard_host(&key).unwrap().unwrap().to_string();
        assert_eq!(h.served_by(&key).await, h.tag_of(&assigned), "key {key}");
    }
}

#[tokio::test]
async fn test_keys_spread_over_every_backend() {
    let h = ProxyHarness::start(3, HashAlgorithm::Sha512, 160).await;

    let mut seen = std::collections::HashSet::new();
    for key in user_keys(200) {
        seen.insert(h.served_by(&key).await);
    }
    assert_eq!(seen.len(), 3, "served by {seen:?}");
}

#[tokio::test]
async fn test_path_and_query_forwarded() {
    let h = ProxyHarness::start(2, HashAlgorithm::Md5, 10).await;

    let response = h.get("/v1/orders/7?expand=items", Some("user1")).await;
    assert!(response.status().is_success());
    let body = response.text().await.unwrap();
    assert!(
        body.ends_with("GET /v1/orders/7?expand=items"),
        "unexpected body {body}"
    );
}

#[tokio::test]
async fn test_keyless_requests_share_a_backend() {
    let h = ProxyHarness::start(3, HashAlgorithm::Murmur3, 10).await;

    let mut tags = std::collections::HashSet::new();
    for _ in 0..10 {
        let response = h.get("/", None).await;
        let tag = response.headers().get("x-backend").unwrap().clone();
        tags.insert(tag);
    }
    assert_eq!(tags.len(), 1);
}

#[tokio::test]
async fn test_metrics_count_every_forwarded_request() {
    let h = ProxyHarness::start(3, HashAlgorithm::Sha256, 40).await;

    for key in user_keys(30) {
        h.served_by(&key).await;
    }
    let total: u64 = h.backends.iter().map(|b| h.metrics.requests_for(b)).sum();
    assert_eq!(total, 30);

    let text = h.get("/metrics", None).await.text().await.unwrap();
    assert!(text.contains("shard_router_requests_total"));
    assert!(text.contains("shard_router_responses_total"));
}

#[tokio::test]
async fn test_healthz() {
    let h = ProxyHarness::start(1, HashAlgorithm::Sha1, 10).await;
    assert_eq!(h.get("/healthz", None).await.status(), reqwest::StatusCode::OK);
}
