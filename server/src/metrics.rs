//! Business metrics for the travel agency.
//!
//! # Exported Metrics
//!
//! ## Counters
//! - `agency_registrations_total{outcome}` - Registration attempts by outcome
//!   (registered, capacity_exceeded, conflict, not_found, unavailable)
//! - `agency_unregistrations_total{outcome}` - Cancellations by outcome
//!   (unregistered, not_found, unavailable)
//! - `agency_clients_created_total` - Clients created

use metrics::describe_counter;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;

/// Register all business metric descriptions.
///
/// Call once at startup, after the recorder is installed.
pub fn register_business_metrics() {
    describe_counter!(
        "agency_registrations_total",
        "Registration attempts by outcome (registered, capacity_exceeded, conflict, not_found, unavailable)"
    );
    describe_counter!(
        "agency_unregistrations_total",
        "Registration cancellations by outcome (unregistered, not_found, unavailable)"
    );
    describe_counter!(
        "agency_clients_created_total",
        "Total number of clients created"
    );

    tracing::debug!("Business metrics registered");
}

/// Install the Prometheus recorder and serve `/metrics` on `addr`.
///
/// # Errors
///
/// Returns [`BuildError`] if a recorder is already installed or the listener
/// cannot be set up.
pub fn install_exporter(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    register_business_metrics();
    tracing::info!(%addr, "Metrics available at http://{addr}/metrics");
    Ok(())
}
