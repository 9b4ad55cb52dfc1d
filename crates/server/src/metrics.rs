//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the linkpack server:
//! - HTTP request metrics (latency, counts)
//! - Task counts by status (collected dynamically)
//! - Bundling pool load (collected dynamically)

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, IntGaugeVec, Opts,
    Registry, TextEncoder,
};
use regex_lite::Regex;

use linkpack_core::TaskStatus;

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
            "linkpack_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("linkpack_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "linkpack_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// Task Metrics (collected dynamically)
// =============================================================================

/// Tasks by current status.
pub static TASKS_BY_STATUS: Lazy<IntGaugeVec> = Lazy::new(|| {
    IntGaugeVec::new(
        Opts::new("linkpack_tasks_by_status", "Current task count by status"),
        &["status"],
    )
    .unwrap()
});

/// Tasks counted against the admission ceiling.
pub static ACTIVE_TASKS: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "linkpack_active_tasks",
        "Number of tasks that are pending or in progress",
    )
    .unwrap()
});

// =============================================================================
// Bundling Pool Metrics (collected dynamically)
// =============================================================================

/// Bundling jobs currently running.
pub static BUNDLE_POOL_ACTIVE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "linkpack_bundle_pool_active",
        "Number of bundling jobs currently running",
    )
    .unwrap()
});

/// Bundling jobs waiting for a free slot.
pub static BUNDLE_POOL_QUEUED: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "linkpack_bundle_pool_queued",
        "Number of bundling jobs waiting for a free slot",
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

    // Tasks
    registry
        .register(Box::new(TASKS_BY_STATUS.clone()))
        .unwrap();
    registry.register(Box::new(ACTIVE_TASKS.clone())).unwrap();

    // Pool
    registry
        .register(Box::new(BUNDLE_POOL_ACTIVE.clone()))
        .unwrap();
    registry
        .register(Box::new(BUNDLE_POOL_QUEUED.clone()))
        .unwrap();

    // Core metrics (admission, files, bundling runs, fetches)
    for metric in linkpack_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Collect dynamic metrics from current application state.
///
/// Called before encoding so gauges reflect the task table and pool load.
pub fn collect_dynamic_metrics(state: &crate::state::AppState) {
    let tasks = state.tasks();

    let counts = tasks.store().count_by_status();
    for status in TaskStatus::all() {
        let count = counts.get(&status).copied().unwrap_or(0);
        TASKS_BY_STATUS
            .with_label_values(&[status.as_str()])
            .set(count as i64);
    }
    ACTIVE_TASKS.set(tasks.active_tasks() as i64);

    let pool = tasks.pool_status();
    BUNDLE_POOL_ACTIVE.set(pool.active_jobs as i64);
    BUNDLE_POOL_QUEUED.set(pool.queued_jobs as i64);
}

static ID_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/[0-9a-fA-F]{12,32}(/|\.|$)").unwrap());

/// Normalize a path for metric labels (replace task IDs with a placeholder).
pub fn normalize_path(path: &str) -> String {
    ID_SEGMENT.replace_all(path, "/{id}$1").to_string()
}
