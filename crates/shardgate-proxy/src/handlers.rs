//! HTTP request handlers.

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::http::header::{self, HeaderMap, HeaderName};
use axum::response::{IntoResponse, Response};
use http_body_util::LengthLimitError;
use tracing::{debug, warn};

use crate::AppState;
use crate::error::ProxyError;

/// Connection-scoped headers that must not be forwarded in either direction.
const HOP_BY_HOP_HEADERS: [HeaderName; 7] = [
    header::CONNECTION,
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Drop hop-by-hop headers, including `keep-alive` and any header named in
/// `Connection`.
fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let named: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::try_from(name.trim()).ok())
        .collect();

    for name in HOP_BY_HOP_HEADERS.iter().chain(named.iter()) {
        headers.remove(name);
    }
    headers.remove("keep-alive");
}

/// Whether a body read failed because it exceeded the configured limit.
fn is_length_limit(err: &axum::Error) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(e) = source {
        if e.is::<LengthLimitError>() {
            return true;
        }
        source = e.source();
    }
    false
}

// -----------------------------------------------------------------------
// GET /healthz
// -----------------------------------------------------------------------

pub(crate) async fn healthz() -> StatusCode {
    StatusCode::OK
}

// -----------------------------------------------------------------------
// GET /metrics
// -----------------------------------------------------------------------

pub(crate) async fn metrics(State(state): State<AppState>) -> Result<Response, ProxyError> {
    let text = state.metrics.render()?;
    Ok(([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], text).into_response())
}

// -----------------------------------------------------------------------
// Everything else: forward to the owning shard
// -----------------------------------------------------------------------

/// Forward the request to the shard that owns its routing key.
pub(crate) async fn proxy(
    State(state): State<AppState>,
    request: Request,
) -> Result<Response, ProxyError> {
    let (parts, body) = request.into_parts();

    let key = state.router.sharding_key(&parts.headers);
    let shard = state
        .router
        .shard_host(key)?
        .ok_or(ProxyError::NoShardAvailable)?
        .to_string();

    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let target = format!("{}{}", shard.trim_end_matches('/'), path_and_query);
    let url = reqwest::Url::parse(&target).map_err(|_| ProxyError::InvalidTarget {
        url: target.clone(),
    })?;

    let body = axum::body::to_bytes(body, state.body_limit)
        .await
        .map_err(|e| {
            if is_length_limit(&e) {
                ProxyError::PayloadTooLarge {
                    limit: state.body_limit,
                }
            } else {
                ProxyError::Body {
                    message: e.to_string(),
                }
            }
        })?;

    debug!(key, %shard, %url, method = %parts.method, "forwarding request");
    state.metrics.record_request(&shard);

    let mut headers = parts.headers;
    strip_hop_by_hop(&mut headers);
    headers.remove(header::HOST);

    let upstream = state
        .client
        .request(parts.method, url)
        .headers(headers)
        .body(body)
        .send()
        .await
        .map_err(|e| {
            warn!(%shard, error = %e, "upstream request failed");
            ProxyError::Upstream {
                shard: shard.clone(),
                message: e.to_string(),
            }
        })?;

    let status = upstream.status();
    state.metrics.record_response(&shard, status.as_u16());

    let mut response_headers = upstream.headers().clone();
    strip_hop_by_hop(&mut response_headers);

    let bytes = upstream.bytes().await.map_err(|e| ProxyError::Upstream {
        shard: shard.clone(),
        message: e.to_string(),
    })?;

    let mut response = Response::new(Body::from(bytes));
    *response.status_mut() = status;
    *response.headers_mut() = response_headers;
    Ok(response)
}
