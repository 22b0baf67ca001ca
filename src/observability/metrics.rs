//! Metrics collection and exposition.
//!
//! # Metrics
//! - `ledger_dispatch_total` (counter): dispatched events by method, resource, status
//! - `ledger_dispatch_duration_seconds` (histogram): dispatch latency by method, resource
//! - `ledger_validation_rejections_total` (counter): 403s by rejecting section
//! - `ledger_unmapped_faults_total` (counter): faults handed back to the host, by kind
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed
//! - Labels use the resource template, never the concrete path, to bound cardinality

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with its own HTTP listener on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record the outcome of one dispatch.
pub fn record_dispatch(method: &str, resource: &str, status: u16, start: Instant) {
    counter!(
        "ledger_dispatch_total",
        "method" => method.to_string(),
        "resource" => resource.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    histogram!(
        "ledger_dispatch_duration_seconds",
        "method" => method.to_string(),
        "resource" => resource.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_validation_rejection(section: &'static str) {
    counter!("ledger_validation_rejections_total", "section" => section).increment(1);
}

pub fn record_unmapped_fault(kind: &'static str) {
    counter!("ledger_unmapped_faults_total", "kind" => kind).increment(1);
}
