//! Prometheus metrics.
//!
//! The exporter is only installed when `METRICS_BIND` is set; without it the
//! recording functions are no-ops.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use tourney_server::metrics;
//! use std::net::SocketAddr;
//!
//! let addr: SocketAddr = "127.0.0.1:9090".parse().unwrap();
//! metrics::init_metrics(addr).unwrap();
//!
//! metrics::http_requests_total("POST", "/api/v1/matches/{match_id}/complete", 200);
//! metrics::matches_completed_total();
//! ```

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Install the Prometheus exporter with its own HTTP listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

// ============================================================================
// HTTP Metrics
// ============================================================================

/// Increments the request counter. `path` is the matched route template, not
/// the raw URI, to keep label cardinality bounded.
pub fn http_requests_total(method: &str, path: &str, status: u16) {
    metrics::counter!("http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record HTTP request duration in milliseconds.
pub fn http_request_duration_ms(method: &str, path: &str, duration_ms: f64) {
    metrics::histogram!("http_request_duration_ms",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_ms);
}

// ============================================================================
// Competition Metrics
// ============================================================================

pub fn matches_completed_total() {
    metrics::counter!("matches_completed_total").increment(1);
}

pub fn standings_recomputed_total() {
    metrics::counter!("standings_recomputed_total").increment(1);
}

/// Registrations by resulting status (`pending`, `approved`, `rejected`)
pub fn registrations_total(status: &str) {
    metrics::counter!("registrations_total", "status" => status.to_string()).increment(1);
}

/// Roster changes by kind (`added`, `removed`, `jersey`)
pub fn roster_changes_total(kind: &'static str) {
    metrics::counter!("roster_changes_total", "kind" => kind).increment(1);
}

/// Failed calls by error kind
pub fn errors_total(kind: &str) {
    metrics::counter!("errors_total", "kind" => kind.to_string()).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_without_exporter_is_noop() {
        http_requests_total("GET", "/health", 200);
        http_request_duration_ms("GET", "/health", 1.5);
        matches_completed_total();
        standings_recomputed_total();
        registrations_total("pending");
        roster_changes_total("added");
        errors_total("not_found");
    }
}
