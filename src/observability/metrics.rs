//! Metrics collection and exposition.
//!
//! # Metrics
//! - `login_attempts_total` (counter): login attempts by outcome
//! - `login_bans_total` (counter): bans started
//! - `login_evicted_entries_total` (counter): stale entries swept
//! - `login_tracked_keys` (gauge): entries currently held by the tracker
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op, which keeps tests free of setup
//! - The Prometheus exporter is only installed when enabled in config

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_login_attempt(outcome: &'static str) {
    counter!("login_attempts_total", "outcome" => outcome).increment(1);
}

pub fn record_ban() {
    counter!("login_bans_total").increment(1);
}

pub fn record_evicted(count: usize) {
    counter!("login_evicted_entries_total").increment(count as u64);
}

pub fn record_tracked_keys(count: usize) {
    gauge!("login_tracked_keys").set(count as f64);
}
