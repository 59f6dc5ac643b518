//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Admission gate (capacity, held permits)
//! - Item queues (depth)
//! - Drain runs (per-item outcomes, run states, durations)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, IntGauge, IntGaugeVec, Opts};

// =============================================================================
// Admission Gate Metrics
// =============================================================================

/// Configured gate capacity.
pub static GATE_CAPACITY: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "strmkit_gate_capacity",
        "Maximum number of extraction jobs allowed to run concurrently",
    )
    .unwrap()
});

/// Permits currently held by running jobs.
pub static GATE_PERMITS_HELD: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "strmkit_gate_permits_held",
        "Number of admission permits currently held",
    )
    .unwrap()
});

// =============================================================================
// Queue Metrics
// =============================================================================

/// Items waiting in each queue.
pub static QUEUE_DEPTH: Lazy<IntGaugeVec> = Lazy::new(|| {
    IntGaugeVec::new(
        Opts::new("strmkit_queue_depth", "Items waiting in each queue"),
        &["queue"],
    )
    .unwrap()
});

// =============================================================================
// Drain Metrics
// =============================================================================

/// Items processed by outcome.
pub static ITEMS_PROCESSED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "strmkit_items_processed_total",
            "Total items processed by drain runs",
        ),
        &["queue", "outcome"], // outcome: "succeeded", "failed", "cancelled"
    )
    .unwrap()
});

/// Drain runs by terminal state.
pub static DRAIN_RUNS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("strmkit_drain_runs_total", "Total drain runs"),
        &["queue", "state"], // state: "completed", "cancelled", "aborted"
    )
    .unwrap()
});

/// Drain run duration in seconds.
pub static DRAIN_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new("strmkit_drain_duration_seconds", "Duration of drain runs")
            .buckets(vec![
                0.1, 1.0, 5.0, 30.0, 60.0, 300.0, 900.0, 1800.0, 3600.0, 14400.0,
            ]),
        &["queue"],
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Gate
        Box::new(GATE_CAPACITY.clone()),
        Box::new(GATE_PERMITS_HELD.clone()),
        // Queues
        Box::new(QUEUE_DEPTH.clone()),
        // Drains
        Box::new(ITEMS_PROCESSED.clone()),
        Box::new(DRAIN_RUNS.clone()),
        Box::new(DRAIN_DURATION.clone()),
    ]
}
