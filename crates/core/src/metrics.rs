//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Search aggregation (outcomes, result counts, duration)
//! - Relay chain (attempts per relay, attempt duration)
//! - Cache write-back

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts};

// =============================================================================
// Search Metrics
// =============================================================================

/// Searches total by outcome.
pub static SEARCHES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("gamevault_searches_total", "Total game searches"),
        &["outcome"], // "empty", "short_circuit", "merged", "degraded", "external_unavailable", "cancelled"
    )
    .unwrap()
});

/// Search duration in seconds.
pub static SEARCH_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new("gamevault_search_duration_seconds", "Duration of game searches")
            .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
        &[],
    )
    .unwrap()
});

/// Results returned per search by source.
pub static SEARCH_RESULTS: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "gamevault_search_results",
            "Number of search results returned per query",
        )
        .buckets(vec![0.0, 1.0, 5.0, 10.0, 20.0, 50.0, 100.0]),
        &["source"], // "local", "external", "merged"
    )
    .unwrap()
});

// =============================================================================
// Relay Metrics
// =============================================================================

/// Relay attempts total by relay and result.
pub static RELAY_ATTEMPTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("gamevault_relay_attempts_total", "Total catalog relay attempts"),
        &["relay", "result"], // result: "success", "timeout", "error"
    )
    .unwrap()
});

/// Relay attempt duration in seconds.
pub static RELAY_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "gamevault_relay_duration_seconds",
            "Duration of catalog relay attempts",
        )
        .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["relay"],
    )
    .unwrap()
});

// =============================================================================
// Cache Metrics
// =============================================================================

/// Cache write-backs total by result.
pub static CACHE_WRITEBACKS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "gamevault_cache_writebacks_total",
            "Total cache write-back batches",
        ),
        &["result"], // "success", "failed"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Search
        Box::new(SEARCHES_TOTAL.clone()),
        Box::new(SEARCH_DURATION.clone()),
        Box::new(SEARCH_RESULTS.clone()),
        // Relays
        Box::new(RELAY_ATTEMPTS.clone()),
        Box::new(RELAY_DURATION.clone()),
        // Cache
        Box::new(CACHE_WRITEBACKS.clone()),
    ]
}
