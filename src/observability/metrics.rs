//! Metrics collection and exposition.
//!
//! # Metrics
//! - `lab_routes_total` (counter): routed requests by source, status
//! - `lab_route_duration_seconds` (histogram): dispatch latency by source
//! - `lab_source_available` (gauge): 1=available, 0=unavailable
//! - `lab_source_switches_total` (counter): current-source changes
//! - `lab_verifications_total` (counter): checks by kind, outcome

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus recorder with an HTTP scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_route(source: &str, status: u16, start: Instant) {
    metrics::counter!(
        "lab_routes_total",
        "source" => source.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("lab_route_duration_seconds", "source" => source.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_source_available(source: &str, available: bool) {
    metrics::gauge!("lab_source_available", "source" => source.to_string())
        .set(if available { 1.0 } else { 0.0 });
}

pub fn record_source_switch(previous: &str, current: &str) {
    metrics::counter!(
        "lab_source_switches_total",
        "from" => previous.to_string(),
        "to" => current.to_string()
    )
    .increment(1);
}

pub fn record_verification(kind: &'static str, passed: bool) {
    let outcome = if passed { "pass" } else { "fail" };
    metrics::counter!("lab_verifications_total", "kind" => kind, "outcome" => outcome).increment(1);
}
