//! Sharding HTTP reverse proxy.
//!
//! Provides a [`ProxyServer`] that exposes an axum-based HTTP API:
//!
//! - `GET /healthz`: liveness probe, always `200 OK`
//! - `GET /metrics`: Prometheus counters (`shard_router_requests_total`,
//!   `shard_router_responses_total`)
//! - anything else: forwarded to the shard that owns the request's routing
//!   key, with the upstream status, headers and body passed back unchanged
//!
//! ## Routing
//!
//! The routing key is read from the header configured on the
//! [`ShardRouter`]. Requests without it all land on one shard. When the ring
//! has no shards the proxy answers `503 Service Unavailable`; when the shard
//! cannot be reached it answers `502 Bad Gateway`.

mod error;
mod handlers;
mod metrics;


use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::get;
use shardgate_router::{RouterError, ShardRouter};

pub use error::ProxyError;
pub use metrics::ProxyMetrics;

/// Default upstream request timeout.
pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(30);

/// Default maximum request body buffered before forwarding (16 MiB).
pub const DEFAULT_BODY_LIMIT: usize = 16 * 1024 * 1024;

/// Shared application state for all handlers.
#[derive(Clone)]
pub(crate) struct AppState {
    /// Populated, read-only router.
    pub router: Arc<ShardRouter>,
    pub metrics: Arc<ProxyMetrics>,
    /// Outbound client, shared so connections to shards are pooled.
    pub client: reqwest::Client,
    pub body_limit: usize,
}

/// Configuration for creating a [`ProxyServer`].
pub struct ProxyConfig {
    /// A router whose ring has been initialized and populated.
    pub router: Arc<ShardRouter>,
    /// Counters exposed on `/metrics`.
    pub metrics: Arc<ProxyMetrics>,
    /// Timeout for each forwarded request.
    pub upstream_timeout: Duration,
    /// Maximum request body size in bytes.
    pub body_limit: usize,
}

impl ProxyConfig {
    /// Config with default timeout and body limit.
    pub fn new(router: Arc<ShardRouter>, metrics: Arc<ProxyMetrics>) -> Self {
        Self {
            router,
            metrics,
            upstream_timeout: DEFAULT_UPSTREAM_TIMEOUT,
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }
}

/// Sharding reverse proxy backed by a [`ShardRouter`].
pub struct ProxyServer {
    router: Router,
}

impl ProxyServer {
    /// Create a proxy server.
    ///
    /// Fails if the router's ring was never initialized: serving with it would
    /// reject every request.
    pub fn new(config: ProxyConfig) -> Result<Self, ProxyError> {
        if !config.router.is_initialized() {
            return Err(RouterError::RingNotInitialized.into());
        }

        let client = reqwest::Client::builder()
            .timeout(config.upstream_timeout)
            .build()?;

        let state = AppState {
            router: config.router,
            metrics: config.metrics,
            client,
            body_limit: config.body_limit,
        };

        Ok(Self {
            router: Self::build_router(state),
        })
    }

    /// Build the axum [`Router`].
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/healthz", get(handlers::healthz))
            .route("/metrics", get(handlers::metrics))
            .fallback(handlers::proxy)
            .with_state(state)
    }

    /// Return the inner [`Router`] (useful for testing with `tower::ServiceExt`).
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Serve on the given TCP address.
    pub async fn serve(self, addr: &str) -> Result<(), std::io::Error> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!(addr, "HTTP proxy listening");
        axum::serve(listener, self.router).await
    }

    /// Serve with graceful shutdown triggered by the given future.
    ///
    /// When `shutdown` completes, the server stops accepting new connections
    /// and waits for in-flight requests to finish.
    pub async fn serve_with_shutdown(
        self,
        addr: &str,
        shutdown: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> Result<(), std::io::Error> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!(addr, "HTTP proxy listening");
        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await
    }
}
