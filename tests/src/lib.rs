//! Shared test harness for shardgate integration tests.
//!
//! Provides key corpora, ring builders and [`ProxyHarness`], a running proxy
//! in front of N echo backends on loopback ports.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{Method, StatusCode, Uri};
use rand::Rng;
use shardgate_proxy::{ProxyConfig, ProxyMetrics, ProxyServer};
use shardgate_ring::{ConsistentHashRing, HashAlgorithm, HashFunction};
use shardgate_router::ShardRouter;

/// Header the harness proxy routes on.
pub const KEY_HEADER: &str = "x-tenant-id";

/// Response header naming the backend that served a request.
pub const BACKEND_HEADER: &str = "x-backend";

// =========================================================================
// Corpora and rings
// =========================================================================

/// `user0`, `user1`, ... `user{n-1}`.
pub fn user_keys(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("user{i}")).collect()
}

/// `n` random keys drawn uniformly from the 64-bit space.
pub fn random_keys(rng: &mut impl Rng, n: usize) -> Vec<String> {
    (0..n).map(|_| format!("{:016x}", rng.random::<u64>())).collect()
}

/// `shard01`, `shard02`, ... up to `n`.
pub fn shard_names(n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("shard{i:02}")).collect()
}

/// A ring holding `shards`, each with `replicas` virtual nodes.
pub fn build_ring(
    algorithm: HashAlgorithm,
    replicas: usize,
    shards: &[String],
) -> ConsistentHashRing {
    let mut ring = ConsistentHashRing::new(replicas, HashFunction::new(algorithm)).unwrap();
    for shard in shards {
        ring.add_node(shard);
    }
    ring
}

/// Fraction of `keys` each shard receives, in `shards` order.
pub fn shares(ring: &ConsistentHashRing, shards: &[String], keys: &[String]) -> Vec<f64> {
    let mut counts = vec![0usize; shards.len()];
    for key in keys {
        let owner = ring.get_node(key).unwrap();
        let idx = shards.iter().position(|s| s == owner).unwrap();
        counts[idx] += 1;
    }
    counts
        .into_iter()
        .map(|c| c as f64 / keys.len() as f64)
        .collect()
}

// =========================================================================
// Proxy harness
// =========================================================================

/// Start an echo backend that tags every response with `tag`.
///
/// The body is `"{tag} {method} {uri}"`.
pub async fn spawn_backend(tag: String) -> String {
    let app = axum::Router::new().fallback(move |method: Method, uri: Uri| {
        let tag = tag.clone();
        async move {
            let body = format!("{tag} {method} {uri}");
            (StatusCode::OK, [(BACKEND_HEADER, tag)], body)
        }
    });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    format!("http://{addr}")
}

/// A proxy on a loopback port routing to `n` echo backends.
pub struct ProxyHarness {
    /// Proxy base URL.
    pub url: String,
    /// Backend base URLs; backend `i` tags responses with `"b{i}"`.
    pub backends: Vec<String>,
    /// The router the proxy was started with.
    pub router: Arc<ShardRouter>,
    pub metrics: Arc<ProxyMetrics>,
    client: reqwest::Client,
}

impl ProxyHarness {
    /// Start `n` backends and a proxy over them.
    pub async fn start(n: usize, algorithm: HashAlgorithm, replicas: usize) -> Self {
        let mut backends = Vec::with_capacity(n);
        for i in 0..n {
            backends.push(spawn_backend(format!("b{i}")).await);
        }

        let mut router = ShardRouter::new(KEY_HEADER).unwrap();
        router
            .init_hash_ring(replicas, HashFunction::new(algorithm))
            .unwrap();
        for backend in &backends {
            router.add_shard(backend).unwrap();
        }
        let router = Arc::new(router);
        let metrics = Arc::new(ProxyMetrics::new().unwrap());

        let app = ProxyServer::new(ProxyConfig::new(router.clone(), metrics.clone()))
            .unwrap()
            .into_router();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr: SocketAddr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self {
            url: format!("http://{addr}"),
            backends,
            router,
            metrics,
            client: reqwest::Client::new(),
        }
    }

    /// Backend tag for a backend URL.
    pub fn tag_of(&self, backend: &str) -> String {
        let idx = self.backends.iter().position(|b| b == backend).unwrap();
        format!("b{idx}")
    }

    /// Send `GET path` with an optional routing key.
    pub async fn get(&self, path: &str, key: Option<&str>) -> reqwest::Response {
        let mut request = self.client.get(format!("{}{path}", self.url));
        if let Some(key) = key {
            request = request.header(KEY_HEADER, key);
        }
        request.send().await.unwrap()
    }

    /// Tag of the backend that served `GET /` for `key`.
    pub async fn served_by(&self, key: &str) -> String {
        let response = self.get("/", Some(key)).await;
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        response
            .headers()
            .get(BACKEND_HEADER)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string()
    }
}
