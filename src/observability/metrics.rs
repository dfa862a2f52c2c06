//! Metrics collection and exposition.
//!
//! # Metrics
//! - `cache_headers_responses_total` (counter): normalized responses, labelled
//!   by the resulting `cache_control` source (`preserved`, `no-cache`, `no-store`)
//! - `cache_headers_removed_total` (counter): headers removed, labelled by `header`
//!
//! Recording is a no-op until a recorder is installed.

use std::net::SocketAddr;

use metrics::counter;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::headers::Normalization;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint started");
    Ok(())
}

/// Record the outcome of one normalization pass.
pub fn record_normalization(report: &Normalization) {
    let outcome = report
        .default_applied
        .map(|d| d.as_str())
        .unwrap_or("preserved");
    counter!("cache_headers_responses_total", "cache_control" => outcome).increment(1);

    let removed = [
        ("cache-control", report.cleared_cache_control),
        ("last-modified", report.removed_last_modified),
        ("expires", report.removed_expires),
        ("pragma", report.removed_pragma),
    ];
    for (header, hit) in removed {
        if hit {
            counter!("cache_headers_removed_total", "header" => header).increment(1);
        }
    }
}
