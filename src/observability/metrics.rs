//! Metrics collection and exposition.
//!
//! # Metrics
//! - `pathway_requests_total` (counter): requests by method, status, route
//! - `pathway_request_duration_seconds` (histogram): latency distribution
//! - `pathway_not_found_total` (counter): 404s no fallback route handled
//! - `pathway_routes` (gauge): size of the live route table
//!
//! # Design Decisions
//! - Recording without an installed exporter is a no-op
//! - Route label is the matched template, never the raw path

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape listener on `addr`.
///
/// Must be called from within a tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_request(method: &str, status: u16, route: &str, start: Instant) {
    let status = status.to_string();
    counter!(
        "pathway_requests_total",
        "method" => method.to_string(),
        "status" => status.clone(),
        "route" => route.to_string()
    )
    .increment(1);
    histogram!(
        "pathway_request_duration_seconds",
        "method" => method.to_string(),
        "status" => status,
        "route" => route.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_not_found(method: &str) {
    counter!("pathway_not_found_total", "method" => method.to_string()).increment(1);
}

pub fn record_route_table_size(routes: usize) {
    gauge!("pathway_routes").set(routes as f64);
}
