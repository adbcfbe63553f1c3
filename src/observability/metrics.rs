//! Metrics collection.
//!
//! # Metrics
//! - `restlink_requests_total` (counter): requests by method, status
//! - `restlink_request_duration_seconds` (histogram): call latency by server
//! - `restlink_transport_failures_total` (counter): failures by server
//! - `restlink_cache_lookups_total` (counter): etag lookups by result
//! - `restlink_server_active` (gauge): 1=active, 0=disabled

use std::time::Instant;

pub fn record_request(method: &str, status: u16, server: &str, start: Instant) {
    metrics::counter!(
        "restlink_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!(
        "restlink_request_duration_seconds",
        "server" => server.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_transport_failure(server: &str) {
    metrics::counter!("restlink_transport_failures_total", "server" => server.to_string())
        .increment(1);
}

pub fn record_cache_lookup(hit: bool) {
    let result = if hit { "hit" } else { "miss" };
    metrics::counter!("restlink_cache_lookups_total", "result" => result).increment(1);
}

pub fn record_server_health(server: &str, active: bool) {
    metrics::gauge!("restlink_server_active", "server" => server.to_string())
        .set(if active { 1.0 } else { 0.0 });
}
