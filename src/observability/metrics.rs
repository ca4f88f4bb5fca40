//! Metrics collection and exposition.
//!
//! # Metrics
//! - `controller_signals_total` (counter): OS signals observed, by signal
//! - `controller_shutdowns_total` (counter): shutdown transitions (0 or 1 per process)
//! - `controller_lifecycle_state` (gauge): 0=running, 1=shutting down, 2=stopped
//!
//! # Design Decisions
//! - Recorded through the `metrics` facade; without an installed recorder
//!   every call is a no-op
//! - Prometheus exporter is opt-in (`observability.metrics_enabled`)

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape endpoint.
///
/// Must run inside a Tokio runtime; the HTTP listener is spawned on it.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_signal(signal: &'static str) {
    counter!("controller_signals_total", "signal" => signal).increment(1);
}

pub fn record_shutdown() {
    counter!("controller_shutdowns_total").increment(1);
}

pub fn record_lifecycle_state(state: u8) {
    gauge!("controller_lifecycle_state").set(f64::from(state));
}
