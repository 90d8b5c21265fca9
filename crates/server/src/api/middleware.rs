//! Session extraction and metrics middleware for API routes.

use axum::{
    body::Body,
    extract::FromRequestParts,
    http::{header, request::Parts, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use gamevault_core::{Session, SessionError};
use std::future::Future;
use std::time::Instant;

use super::ErrorResponse;
use crate::metrics::{
    normalize_path, AUTH_FAILURES_TOTAL, HTTP_REQUESTS_IN_FLIGHT, HTTP_REQUESTS_TOTAL,
    HTTP_REQUEST_DURATION,
};

/// Metrics middleware that tracks HTTP request duration and counts.
///
/// This middleware records:
/// - Request duration (histogram)
/// - Request count (counter)
/// - Requests in flight (gauge)
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = normalize_path(request.uri().path());

    HTTP_REQUESTS_IN_FLIGHT.inc();

    let response = next.run(request).await;

    HTTP_REQUESTS_IN_FLIGHT.dec();

    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    HTTP_REQUEST_DURATION
        .with_label_values(&[&method, &path, &status])
        .observe(duration);
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[&method, &path, &status])
        .inc();

    response
}

/// Record a rejected session under its reason label.
pub fn record_session_failure(error: &SessionError) {
    let reason = match error {
        SessionError::Missing => "missing",
        SessionError::Malformed(_) => "malformed",
        SessionError::Expired { .. } => "expired",
    };
    AUTH_FAILURES_TOTAL.with_label_values(&[reason]).inc();
}

/// Rejection for requests without a usable bearer token.
#[derive(Debug)]
pub struct SessionRejection(pub SessionError);

impl IntoResponse for SessionRejection {
    fn into_response(self) -> Response {
        record_session_failure(&self.0);
        (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

/// Extractor for the caller's backend session.
///
/// Reads `Authorization: Bearer <token>`. Expiry is checked by the library
/// service before it calls the backend, not here.
#[derive(Debug, Clone)]
pub struct BearerSession(pub Session);

impl<S> FromRequestParts<S> for BearerSession
where
    S: Send + Sync,
{
    type Rejection = SessionRejection;

    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        let header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok());
        let result = Session::from_authorization(header)
            .map(BearerSession)
            .map_err(SessionRejection);
        std::future::ready(result)
    }
}
