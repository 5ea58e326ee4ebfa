//! Prometheus metrics for monitoring
//!
//! Exposes metrics for:
//! - Node and explorer request counts
//! - Transaction submission outcomes
//! - Last observed block height
//!
//! The library does not bind a listening socket; embedders call [`render`]
//! from their own metrics endpoint.

use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec, register_gauge, register_int_counter, CounterVec, Encoder, Gauge,
    IntCounter, TextEncoder,
};

lazy_static! {
    // Request metrics
    pub static ref NODE_REQUESTS: CounterVec = register_counter_vec!(
        "amoveo_node_requests_total",
        "Total node API requests by command",
        &["command"]
    ).unwrap();

    pub static ref EXPLORER_REQUESTS: IntCounter = register_int_counter!(
        "amoveo_explorer_requests_total",
        "Total explorer lookups"
    ).unwrap();

    // Transaction metrics
    pub static ref TX_PREPARED: IntCounter = register_int_counter!(
        "amoveo_transactions_prepared_total",
        "Total transactions prepared"
    ).unwrap();

    pub static ref TX_SUBMITTED: IntCounter = register_int_counter!(
        "amoveo_transactions_submitted_total",
        "Total transactions accepted by the node"
    ).unwrap();

    pub static ref TX_REJECTED: IntCounter = register_int_counter!(
        "amoveo_transactions_rejected_total",
        "Total transactions refused by the node"
    ).unwrap();

    // Chain metrics
    pub static ref LAST_BLOCK_HEIGHT: Gauge = register_gauge!(
        "amoveo_last_block_height",
        "Most recently observed chain height"
    ).unwrap();
}

/// Render all registered metrics in the Prometheus text format
pub fn render() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .unwrap_or_default();
    String::from_utf8(buffer).unwrap_or_default()
}

// Helper functions to record metrics

pub fn record_node_request(command: &str) {
    NODE_REQUESTS.with_label_values(&[command]).inc();
}

pub fn record_explorer_request() {
    EXPLORER_REQUESTS.inc();
}

pub fn record_tx_prepared() {
    TX_PREPARED.inc();
}

pub fn record_tx_submitted() {
    TX_SUBMITTED.inc();
}

pub fn record_tx_rejected() {
    TX_REJECTED.inc();
}

pub fn record_block_height(height: u64) {
    LAST_BLOCK_HEIGHT.set(height as f64);
}
