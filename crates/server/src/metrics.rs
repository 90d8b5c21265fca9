//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the gateway:
//! - HTTP request metrics (latency, counts, in flight)
//! - Backend proxy requests
//! - Search and relay metrics registered from the core crate

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use regex_lite::Regex;
use tracing::warn;

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "gamevault_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("gamevault_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "gamevault_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

/// Library requests rejected for a missing or expired session.
pub static AUTH_FAILURES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "gamevault_auth_failures_total",
            "Total library requests rejected for session problems",
        ),
        &["reason"], // "missing", "malformed", "expired"
    )
    .unwrap()
});

// =============================================================================
// Proxy Metrics
// =============================================================================

/// Requests forwarded to the backend.
pub static PROXY_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "gamevault_proxy_requests_total",
            "Requests forwarded to the backend",
        ),
        &["result"], // "forwarded", "unreachable"
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    // HTTP
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();
    registry
        .register(Box::new(AUTH_FAILURES_TOTAL.clone()))
        .unwrap();

    // Proxy
    registry
        .register(Box::new(PROXY_REQUESTS_TOTAL.clone()))
        .unwrap();

    // Core metrics (search, relays, cache write-back)
    for metric in gamevault_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        warn!(error = %e, "Failed to encode metrics");
    }
    String::from_utf8(buffer).unwrap_or_default()
}

static GUID_SEGMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"/\d+-\d+(/|$)").unwrap());
static NUMERIC_SEGMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"/\d+(/|$)").unwrap());

/// Normalize a path for metric labels (replace IDs with placeholders).
pub fn normalize_path(path: &str) -> String {
    let result = GUID_SEGMENT.replace_all(path, "/{guid}$1");
    // Adjacent ids share a slash, so a single pass can skip every other one.
    let result = NUMERIC_SEGMENT.replace_all(&result, "/{id}$1");
    let result = NUMERIC_SEGMENT.replace_all(&result, "/{id}$1");
    result.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_guid() {
        let path = "/api/games/3030-20541";
        assert_eq!(normalize_path(path), "/api/games/{guid}");
    }

    #[test]
    fn test_normalize_path_numeric() {
        let path = "/api/v1/library/42";
        assert_eq!(normalize_path(path), "/api/v1/library/{id}");
    }

    #[test]
    fn test_normalize_path_numeric_middle() {
        let path = "/api/users/7/games/12";
        assert_eq!(normalize_path(path), "/api/users/{id}/games/{id}");
    }

    #[test]
    fn test_normalize_path_adjacent_ids() {
        let path = "/api/platforms/3/4";
        assert_eq!(normalize_path(path), "/api/platforms/{id}/{id}");
    }

    #[test]
    fn test_normalize_path_no_ids() {
        let path = "/api/v1/health";
        assert_eq!(normalize_path(path), "/api/v1/health");
    }

    #[test]
    fn test_encode_metrics_returns_prometheus_format() {
        HTTP_REQUESTS_TOTAL
            .with_label_values(&["GET", "/test", "200"])
            .inc();

        let output = encode_metrics();
        assert!(output.contains("gamevault_http_requests_total"));
        assert!(output.contains("# HELP"));
        assert!(output.contains("# TYPE"));
    }

    #[test]
    fn test_registry_contains_core_metrics() {
        gamevault_core::metrics::SEARCHES_TOTAL
            .with_label_values(&["merged"])
            .inc();
        PROXY_REQUESTS_TOTAL.with_label_values(&["forwarded"]).inc();
        HTTP_REQUESTS_IN_FLIGHT.set(0);

        let output = encode_metrics();

        assert!(output.contains("gamevault_http_requests_in_flight"));
        assert!(output.contains("gamevault_proxy_requests_total"));
        assert!(output.contains("gamevault_searches_total"));
    }
}
