//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define front-door metrics (requests, latency, identity outcomes, fallbacks)
//! - Expose a Prometheus-compatible scrape endpoint
//!
//! # Metrics
//! - `deskgate_requests_total` (counter): requests by method, status
//! - `deskgate_request_duration_seconds` (histogram): latency distribution
//! - `deskgate_identity_resolutions_total` (counter): by source, authenticated
//! - `deskgate_fallbacks_total` (counter): failures caught by the fallback, by kind
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed, so tests need no setup

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, status: u16, start_time: Instant) {
    counter!(
        "deskgate_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(
        "deskgate_request_duration_seconds",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .record(start_time.elapsed().as_secs_f64());
}

pub fn record_resolution(source: &'static str, authenticated: bool) {
    counter!(
        "deskgate_identity_resolutions_total",
        "source" => source,
        "authenticated" => if authenticated { "true" } else { "false" }
    )
    .increment(1);
}

pub fn record_fallback(kind: &'static str) {
    counter!("deskgate_fallbacks_total", "kind" => kind).increment(1);
}
