//! Metrics collection and exposition.
//!
//! # Metrics
//! - `httpcli_requests_total` (counter): finished requests by method, outcome
//! - `httpcli_request_duration_seconds` (histogram): start-to-finish latency
//! - `httpcli_failovers_total` (counter): candidate addresses abandoned, by stage
//! - `httpcli_in_flight_requests` (gauge): requests currently running

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and serve it on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint started"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request_started() {
    gauge!("httpcli_in_flight_requests").increment(1.0);
}

pub fn record_request_finished(method: &'static str, success: bool, elapsed: Duration) {
    let outcome = if success { "success" } else { "failure" };
    gauge!("httpcli_in_flight_requests").decrement(1.0);
    counter!("httpcli_requests_total", "method" => method, "outcome" => outcome).increment(1);
    histogram!("httpcli_request_duration_seconds", "method" => method).record(elapsed.as_secs_f64());
}

pub fn record_failover(stage: &'static str) {
    counter!("httpcli_failovers_total", "stage" => stage).increment(1);
}
