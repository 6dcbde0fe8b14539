//! Proxy error types and their HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use shardgate_router::RouterError;

/// Errors returned by the proxy server and its handlers.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// The ring has no shards, so the request cannot be routed.
    #[error("no shard available")]
    NoShardAvailable,

    /// The shard host and request path do not form a valid URL.
    #[error("invalid target url: {url}")]
    InvalidTarget {
        /// The rejected URL.
        url: String,
    },

    /// The inbound request body exceeds the configured limit.
    #[error("request body exceeds {limit} bytes")]
    PayloadTooLarge {
        /// The limit in bytes.
        limit: usize,
    },

    /// The inbound request body could not be read.
    #[error("failed to read request body: {message}")]
    Body {
        /// Description of the failure.
        message: String,
    },

    /// The shard did not answer.
    #[error("upstream {shard} failed: {message}")]
    Upstream {
        /// Shard host the request was forwarded to.
        shard: String,
        /// Description of the failure.
        message: String,
    },

    /// The router was not ready for lookups.
    #[error("router error: {0}")]
    Router(#[from] RouterError),

    /// The outbound HTTP client could not be built.
    #[error("http client error: {0}")]
    Client(#[from] reqwest::Error),

    /// Metric registration or encoding failed.
    #[error("metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}

impl ProxyError {
    /// Map to an HTTP status code.
    fn status_code(&self) -> StatusCode {
        match self {
            Self::NoShardAvailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::InvalidTarget { .. } => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Body { .. } => StatusCode::BAD_REQUEST,
            Self::Upstream { .. } => StatusCode::BAD_GATEWAY,
            Self::Router(_) | Self::Client(_) | Self::Metrics(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (self.status_code(), self.to_string()).into_response()
    }
}
