//! Metrics collection and exposition.
//!
//! # Metrics
//! - `dispatch_requests_total` (counter): finished calls by method, outcome
//! - `dispatch_request_duration_seconds` (histogram): end-to-end latency, retries included
//! - `dispatch_retries_total` (counter): retry sleeps by method
//! - `dispatch_topology_updates_total` (counter): registry pushes by context id
//! - `gateway_queue_rejections_total` (counter): inbound requests refused on a full queue

use std::net::SocketAddr;
use std::time::Instant;

use hyper::Method;
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint started"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a finished dispatch call.
pub fn record_request(method: &Method, outcome: &'static str, start: Instant) {
    let method = method.to_string();
    ::metrics::counter!("dispatch_requests_total", "method" => method.clone(), "outcome" => outcome)
        .increment(1);
    ::metrics::histogram!("dispatch_request_duration_seconds", "method" => method)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_retry(method: &Method) {
    ::metrics::counter!("dispatch_retries_total", "method" => method.to_string()).increment(1);
}

pub fn record_topology_update(context_id: &str, instances: usize) {
    ::metrics::counter!("dispatch_topology_updates_total", "context_id" => context_id.to_string())
        .increment(1);
    ::metrics::gauge!("dispatch_topology_instances", "context_id" => context_id.to_string())
        .set(instances as f64);
}

pub fn record_queue_rejection() {
    ::metrics::counter!("gateway_queue_rejections_total").increment(1);
}
