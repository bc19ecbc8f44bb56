//! Metrics collection and exposition.
//!
//! # Metrics
//! - `prism_publish_total` (counter): publish attempts by outcome
//! - `prism_tx_submitted_total` (counter): transactions accepted by the wallet
//! - `prism_indexer_polls_total` (counter): indexer lookups by result

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record the end of a publish run (`completed`, `error`, `rejected`).
pub fn record_publish(outcome: &'static str) {
    ::metrics::counter!("prism_publish_total", "outcome" => outcome).increment(1);
}

pub fn record_tx_submitted() {
    ::metrics::counter!("prism_tx_submitted_total").increment(1);
}

/// Record one indexer lookup (`confirmed`, `pending`, `transient`, `rejected`).
pub fn record_indexer_poll(result: &'static str) {
    ::metrics::counter!("prism_indexer_polls_total", "result" => result).increment(1);
}
