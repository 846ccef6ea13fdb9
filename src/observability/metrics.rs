//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): requests by route, method, status
//! - `proxy_request_duration_seconds` (histogram): handler latency by route
//! - `proxy_upstream_requests_total` (counter): LibCal calls by outcome
//! - `proxy_upstream_duration_seconds` (histogram): LibCal call latency
//!
//! Without an installed recorder every call here is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a finished inbound request.
pub fn record_request(route: &str, method: &str, status: u16, start: Instant) {
    counter!(
        "proxy_requests_total",
        "route" => route.to_string(),
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("proxy_request_duration_seconds", "route" => route.to_string())
        .record(start.elapsed().as_secs_f64());
}

/// Record a finished call to LibCal.
pub fn record_upstream(outcome: &'static str, start: Instant) {
    counter!("proxy_upstream_requests_total", "outcome" => outcome).increment(1);
    histogram!("proxy_upstream_duration_seconds").record(start.elapsed().as_secs_f64());
}
