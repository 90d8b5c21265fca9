//! Pass-through proxy to the game-library backend.
//!
//! Requests under `/api/` that no local route handles are replayed against
//! the backend origin with the same method, path, query, headers and body.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    extract::State,
    http::{header, HeaderMap, HeaderName, Request, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use http_body_util::LengthLimitError;
use tracing::{debug, warn};

use super::ErrorResponse;
use crate::metrics::PROXY_REQUESTS_TOTAL;
use crate::state::AppState;

/// Largest request body forwarded to the backend.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Headers that describe a single connection and must not be forwarded.
fn is_hop_by_hop(name: &HeaderName) -> bool {
    matches!(
        name.as_str(),
        "connection"
            | "keep-alive"
            | "proxy-authenticate"
            | "proxy-authorization"
            | "te"
            | "trailer"
            | "transfer-encoding"
            | "upgrade"
    )
}

/// Copy end-to-end headers, leaving out those the client library recomputes.
fn forwardable_headers(headers: &HeaderMap, skip: &[HeaderName]) -> HeaderMap {
    let mut forwarded = HeaderMap::new();
    for (name, value) in headers {
        if is_hop_by_hop(name) || skip.contains(name) {
            continue;
        }
        forwarded.append(name.clone(), value.clone());
    }
    forwarded
}

/// 413 when the body hit the size cap, 400 for any other read failure.
fn body_error_status(err: &axum::Error) -> StatusCode {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(e) = source {
        if e.is::<LengthLimitError>() {
            return StatusCode::PAYLOAD_TOO_LARGE;
        }
        source = e.source();
    }
    StatusCode::BAD_REQUEST
}

fn error(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

/// Fallback handler forwarding `/api/*` to the backend.
pub async fn forward(State(state): State<Arc<AppState>>, request: Request<Body>) -> Response {
    if !request.uri().path().starts_with("/api/") {
        return error(StatusCode::NOT_FOUND, "Not found");
    }

    let path_and_query = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let target = format!("{}{}", state.backend_origin(), path_and_query);

    let (parts, body) = request.into_parts();
    let body = match to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => return error(body_error_status(&e), e.to_string()),
    };

    debug!(method = %parts.method, target = %target, "Forwarding to backend");

    // Host and length are set by the client for the new connection.
    let headers = forwardable_headers(&parts.headers, &[header::HOST, header::CONTENT_LENGTH]);
    let upstream = state
        .proxy_client()
        .request(parts.method, &target)
        .headers(headers)
        .body(body)
        .send()
        .await;

    let upstream = match upstream {
        Ok(response) => response,
        Err(e) => {
            warn!(target = %target, error = %e, "Backend unreachable");
            PROXY_REQUESTS_TOTAL.with_label_values(&["unreachable"]).inc();
            return error(StatusCode::BAD_GATEWAY, format!("Backend unreachable: {}", e));
        }
    };

    let status = upstream.status();
    // CORS is answered by this server; the backend's own headers would conflict.
    let mut headers = forwardable_headers(upstream.headers(), &[header::CONTENT_LENGTH]);
    strip_cors(&mut headers);

    let bytes = match upstream.bytes().await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(target = %target, error = %e, "Backend response interrupted");
            PROXY_REQUESTS_TOTAL.with_label_values(&["unreachable"]).inc();
            return error(StatusCode::BAD_GATEWAY, format!("Backend unreachable: {}", e));
        }
    };

    PROXY_REQUESTS_TOTAL.with_label_values(&["forwarded"]).inc();

    let mut response = Response::new(Body::from(bytes));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}

fn strip_cors(headers: &mut HeaderMap) {
    let cors: Vec<HeaderName> = headers
        .keys()
        .filter(|name| name.as_str().starts_with("access-control-"))
        .cloned()
        .collect();
    for name in cors {
        headers.remove(&name);
    }
}
