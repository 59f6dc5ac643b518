//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the strmkit server:
//! - HTTP request metrics (latency, counts, in flight)
//! - Core gate, queue and drain metrics (registered from `strmkit_core`)

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use strmkit_core::metrics::{GATE_CAPACITY, GATE_PERMITS_HELD, QUEUE_DEPTH};
use strmkit_core::ServiceStatus;
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
            "strmkit_http_request_duration_seconds",
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
        Opts::new("strmkit_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "strmkit_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    let http: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(HTTP_REQUEST_DURATION.clone()),
        Box::new(HTTP_REQUESTS_TOTAL.clone()),
        Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()),
    ];

    for metric in http.into_iter().chain(strmkit_core::metrics::all_metrics()) {
        if let Err(e) = registry.register(metric) {
            warn!("Failed to register metric: {}", e);
        }
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        warn!("Failed to encode metrics: {}", e);
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

/// Refresh gate and queue gauges from a service snapshot.
pub fn collect_dynamic_metrics(status: &ServiceStatus) {
    GATE_CAPACITY.set(status.gate.capacity as i64);
    GATE_PERMITS_HELD.set(status.gate.held as i64);
    for queue in &status.queues {
        QUEUE_DEPTH
            .with_label_values(&[queue.queue.as_str()])
            .set(queue.depth as i64);
    }
}

/// Normalize a path for metric labels (replace IDs and keys with placeholders).
pub fn normalize_path(path: &str) -> String {
    let mut previous = "";
    let segments: Vec<&str> = path
        .split('/')
        .map(|segment| {
            let normalized = match previous {
                "queues" if !segment.is_empty() => "{queue}",
                "tasks" if !segment.is_empty() => "{key}",
                _ if !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()) => "{id}",
                _ => segment,
            };
            previous = segment;
            normalized
        })
        .collect();
    segments.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_queue() {
        let path = "/api/v1/queues/media_info/items";
        assert_eq!(normalize_path(path), "/api/v1/queues/{queue}/items");
    }

    #[test]
    fn test_normalize_path_task_key() {
        let path = "/api/v1/tasks/extract_intro_fingerprint/run";
        assert_eq!(normalize_path(path), "/api/v1/tasks/{key}/run");
    }

    #[test]
    fn test_normalize_path_numeric() {
        let path = "/api/v1/items/12345/season/2";
        assert_eq!(normalize_path(path), "/api/v1/items/{id}/season/{id}");
    }

    #[test]
    fn test_normalize_path_no_ids() {
        assert_eq!(normalize_path("/api/v1/health"), "/api/v1/health");
        assert_eq!(normalize_path("/api/v1/tasks"), "/api/v1/tasks");
    }

    #[test]
    fn test_encode_metrics_returns_prometheus_format() {
        HTTP_REQUESTS_TOTAL
            .with_label_values(&["GET", "/test", "200"])
            .inc();

        let output = encode_metrics();
        assert!(output.contains("strmkit_http_requests_total"));
        assert!(output.contains("# HELP"));
        assert!(output.contains("# TYPE"));
    }

    #[test]
    fn test_registry_contains_core_metrics() {
        HTTP_REQUEST_DURATION
            .with_label_values(&["GET", "/test", "200"])
            .observe(0.1);
        HTTP_REQUESTS_IN_FLIGHT.set(0);
        GATE_CAPACITY.set(2);
        QUEUE_DEPTH.with_label_values(&["media_info"]).set(0);

        let output = encode_metrics();

        assert!(output.contains("strmkit_http_request_duration_seconds"));
        assert!(output.contains("strmkit_http_requests_in_flight"));
        assert!(output.contains("strmkit_gate_capacity"));
        assert!(output.contains("strmkit_queue_depth"));
    }
}
