//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Task admission and file accumulation
//! - Bundling runs and individual fetches

use once_cell::sync::Lazy;
use prometheus::core::Collector;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Task Metrics
// =============================================================================

/// Tasks created total.
pub static TASKS_CREATED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("linkpack_tasks_created_total", "Total tasks created").unwrap()
});

/// Task creations rejected by the admission ceiling.
pub static ADMISSIONS_DENIED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "linkpack_admissions_denied_total",
        "Total task creations rejected because too many tasks were active",
    )
    .unwrap()
});

/// Files accepted into tasks.
pub static FILES_ACCEPTED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "linkpack_files_accepted_total",
        "Total file URLs accepted into tasks",
    )
    .unwrap()
});

/// Files rejected by reason.
pub static FILES_REJECTED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("linkpack_files_rejected_total", "Total file URLs rejected"),
        &["reason"], // "not_found", "file_limit", "extension", "empty_url"
    )
    .unwrap()
});

// =============================================================================
// Bundling Metrics
// =============================================================================

/// Bundling runs finished by result.
pub static BUNDLES_FINISHED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("linkpack_bundles_finished_total", "Total bundling runs finished"),
        &["result"], // "done", "error"
    )
    .unwrap()
});

/// Bundling duration in seconds.
pub static BUNDLE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "linkpack_bundle_duration_seconds",
            "Duration of bundling runs",
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 300.0, 900.0]),
        &["result"],
    )
    .unwrap()
});

/// Individual fetches by result.
pub static FETCHES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("linkpack_fetches_total", "Total resource fetches"),
        &["result"], // "success", "failed"
    )
    .unwrap()
});

/// All core metrics, for registration in the server's registry.
pub fn all_metrics() -> Vec<Box<dyn Collector>> {
    vec![
        Box::new(TASKS_CREATED.clone()),
        Box::new(ADMISSIONS_DENIED.clone()),
        Box::new(FILES_ACCEPTED.clone()),
        Box::new(FILES_REJECTED.clone()),
        Box::new(BUNDLES_FINISHED.clone()),
        Box::new(BUNDLE_DURATION.clone()),
        Box::new(FETCHES.clone()),
    ]
}
