//! Prometheus metrics for observability.
//!
//! HTTP request metrics only: the gateway holds no domain state worth
//! gauging between requests.

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "debridge_http_request_duration_seconds",
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
        Opts::new("debridge_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "debridge_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

/// Resolve admissions rejected by the rate limiter.
pub static RATE_LIMITED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "debridge_rate_limited_total",
            "Requests rejected by the per-client rate limiter",
        ),
        &["path"],
    )
    .unwrap()
});

fn register_metrics(registry: &Registry) {
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
        .register(Box::new(RATE_LIMITED_TOTAL.clone()))
        .unwrap();
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}

/// Normalize a path for metric labels.
///
/// Config tokens, title ids and resolve parameters are user-controlled and
/// unbounded, so they are collapsed into placeholders to keep label
/// cardinality finite.
pub fn normalize_path(path: &str) -> String {
    let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();

    match segments.as_slice() {
        [""] => "/".to_string(),
        ["ping"] => "/ping".to_string(),
        ["metrics"] => "/metrics".to_string(),
        ["configure"] => "/configure".to_string(),
        ["manifest.json"] => "/manifest.json".to_string(),
        [_, "configure"] => "/{config}/configure".to_string(),
        [_, "manifest.json"] => "/{config}/manifest.json".to_string(),
        ["stream", title_type, ..] => format!("/stream/{}/{{id}}", title_label(title_type)),
        [_, "stream", title_type, ..] => {
            format!("/{{config}}/stream/{}/{{id}}", title_label(title_type))
        }
        ["resolve", ..] => "/resolve/{provider}/{ref}".to_string(),
        _ => "/{other}".to_string(),
    }
}

fn title_label(title_type: &str) -> &str {
    match title_type {
        "movie" | "series" => title_type,
        _ => "{type}",
    }
}
