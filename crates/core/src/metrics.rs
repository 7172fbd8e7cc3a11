//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - External provider calls (app list, app detail)
//! - Cache effectiveness (hits/misses per key kind)
//! - Catalog promotions and merged-page composition

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// External Provider Metrics
// =============================================================================

/// Provider requests total by operation and status.
pub static PROVIDER_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "wishdeck_provider_requests_total",
            "Total external provider requests",
        ),
        &["operation", "status"], // operation: "app_list", "app_detail"; status: "success", "error"
    )
    .unwrap()
});

/// Provider request duration in seconds.
pub static PROVIDER_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "wishdeck_provider_request_duration_seconds",
            "Duration of external provider calls",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &["operation"],
    )
    .unwrap()
});

// =============================================================================
// Cache Metrics
// =============================================================================

/// Cache lookups total by key kind and outcome.
pub static CACHE_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("wishdeck_cache_requests_total", "Total cache lookups"),
        &["key_kind", "outcome"], // key_kind: "app_list", "app_detail", "filter_options"; outcome: "hit", "miss"
    )
    .unwrap()
});

// =============================================================================
// Catalog & Browse Metrics
// =============================================================================

/// Games promoted into the local catalog.
pub static GAMES_PROMOTED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "wishdeck_games_promoted_total",
        "Total games promoted from the external provider into the local catalog",
    )
    .unwrap()
});

/// External records accepted into merged listing pages.
pub static EXTERNAL_RESULTS_ACCEPTED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "wishdeck_external_results_accepted_total",
        "Total externally sourced records accepted into listing pages",
    )
    .unwrap()
});

/// Detail fetches issued per listing request.
pub static LISTING_DETAIL_FETCHES: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "wishdeck_listing_detail_fetches",
            "Number of detail fetches issued per listing request",
        )
        .buckets(vec![0.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0]),
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(PROVIDER_REQUESTS.clone()),
        Box::new(PROVIDER_REQUEST_DURATION.clone()),
        Box::new(CACHE_REQUESTS.clone()),
        Box::new(GAMES_PROMOTED.clone()),
        Box::new(EXTERNAL_RESULTS_ACCEPTED.clone()),
        Box::new(LISTING_DETAIL_FETCHES.clone()),
    ]
}
