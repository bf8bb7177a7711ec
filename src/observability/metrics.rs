//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_submissions_total` (counter): outcomes by result and failing stage
//! - `relay_node_requests_total` (counter): node calls by endpoint and status
//! - `relay_node_request_duration_seconds` (histogram): node call latency
//! - `relay_pow_iterations` (histogram): nonces hashed per solve
//! - `relay_pow_duration_seconds` (histogram): solve wall time

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::error::Stage;

/// Install the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_node_request(endpoint: &'static str, ok: bool, start: Instant) {
    let status = if ok { "ok" } else { "error" };
    metrics::counter!("relay_node_requests_total", "endpoint" => endpoint, "status" => status)
        .increment(1);
    metrics::histogram!("relay_node_request_duration_seconds", "endpoint" => endpoint)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_pow(difficulty: u32, iterations: u64, start: Instant) {
    metrics::histogram!("relay_pow_iterations", "difficulty" => difficulty.to_string())
        .record(iterations as f64);
    metrics::histogram!("relay_pow_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_submission_success() {
    metrics::counter!("relay_submissions_total", "result" => "accepted", "stage" => "none")
        .increment(1);
}

pub fn record_submission_failure(stage: Stage, kind: &'static str) {
    metrics::counter!(
        "relay_submissions_total",
        "result" => kind,
        "stage" => stage.as_str()
    )
    .increment(1);
}
