use std::sync::Arc;

use axum::body::Body;
use axum::extract::{OriginalUri, State};
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};

use vib3_shared::errors::{AppError, AppResult, ErrorCode};
use vib3_shared::middleware::{bearer_token, decode_access_token, jwt_secret};

use crate::config::Upstream;
use crate::AppState;

/// Path prefixes reachable without a token.
const PUBLIC_PREFIXES: &[&str] = &["/api/auth/"];

/// Headers that must not be forwarded (hop-by-hop).
const HOP_BY_HOP_HEADERS: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailers",
    "transfer-encoding",
    "upgrade",
    "host",
    "content-length",
];

/// Where a gateway path goes and the path the service sees.
#[derive(Debug, PartialEq, Eq)]
pub struct Route<'a> {
    pub upstream: Upstream,
    pub path: &'a str,
}

/// Maps `/api/<segment>/...` to its service by the first segment, dropping
/// the `/api` prefix: `/api/match/swipe` becomes `/match/swipe` on matching.
pub fn resolve(path: &str) -> Option<Route<'_>> {
    let upstream_path = path.strip_prefix("/api")?;
    // The upstream URL parser collapses dot segments, which would let a
    // public prefix reach a protected route.
    if upstream_path.split('/').any(is_dot_segment) {
        return None;
    }
    let segment = upstream_path.trim_start_matches('/').split('/').next()?;

    let upstream = match segment {
        "auth" | "user" => Upstream::User,
        "match" => Upstream::Matching,
        "chats" | "messages" | "chat" => Upstream::Messaging,
        _ => return None,
    };
    Some(Route { upstream, path: upstream_path })
}

fn is_dot_segment(segment: &str) -> bool {
    let decoded = segment.to_ascii_lowercase().replace("%2e", ".");
    decoded == "." || decoded == ".."
}

pub fn is_public(path: &str) -> bool {
    PUBLIC_PREFIXES.iter().any(|p| path.starts_with(p))
}

fn is_hop_by_hop(name: &str) -> bool {
    HOP_BY_HOP_HEADERS.iter().any(|h| name.eq_ignore_ascii_case(h))
}

/// Catch-all handler: resolve, authenticate, forward, relay.
pub async fn proxy_handler(
    State(state): State<Arc<AppState>>,
    OriginalUri(original_uri): OriginalUri,
    method: Method,
    headers: HeaderMap,
    body: Body,
) -> AppResult<Response> {
    let path = original_uri.path();
    let route = resolve(path).ok_or_else(|| AppError::not_found("no upstream service for this path"))?;

    // Services verify the token again; this rejects early and cheaply.
    if !is_public(path) {
        let claims = decode_access_token(bearer_token(&headers)?, &jwt_secret())?;
        tracing::debug!(user_id = %claims.sub, path, "request authenticated");
    }

    let base = state.config.base_url(route.upstream);
    let upstream_url = match original_uri.query() {
        Some(q) => format!("{base}{}?{q}", route.path),
        None => format!("{base}{}", route.path),
    };

    let max_body = state.config.max_body_bytes;
    let body_bytes = axum::body::to_bytes(body, max_body).await.map_err(|_| {
        AppError::new(
            ErrorCode::PayloadTooLarge,
            format!("request body too large (max {} MB)", max_body / (1024 * 1024)),
        )
    })?;

    let method = reqwest::Method::from_bytes(method.as_str().as_bytes())
        .map_err(|_| AppError::bad_request("unsupported method"))?;
    let mut upstream_req = state.http_client.request(method, &upstream_url).body(body_bytes);

    for (name, value) in headers.iter() {
        if is_hop_by_hop(name.as_str()) {
            continue;
        }
        upstream_req = upstream_req.header(name.as_str(), value.as_bytes());
    }

    let upstream_resp = upstream_req.send().await.map_err(|e| {
        tracing::error!(error = %e, upstream = route.upstream.name(), url = %upstream_url, "upstream request failed");
        metrics::counter!("gateway_upstream_errors_total", "upstream" => route.upstream.name()).increment(1);
        AppError::new(ErrorCode::ServiceUnavailable, "upstream service unavailable")
    })?;

    let status = StatusCode::from_u16(upstream_resp.status().as_u16())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let mut response_headers = HeaderMap::new();
    for (name, value) in upstream_resp.headers().iter() {
        if is_hop_by_hop(name.as_str()) {
            continue;
        }
        if let (Ok(hn), Ok(hv)) = (
            HeaderName::from_bytes(name.as_str().as_bytes()),
            HeaderValue::from_bytes(value.as_bytes()),
        ) {
            response_headers.append(hn, hv);
        }
    }

    let resp_body = upstream_resp.bytes().await.map_err(|e| {
        tracing::error!(error = %e, upstream = route.upstream.name(), "failed to read upstream response body");
        AppError::new(ErrorCode::ServiceUnavailable, "failed to read upstream response")
    })?;

    Ok((status, response_headers, resp_body).into_response())
}
