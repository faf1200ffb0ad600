use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::error::{Result, TelemetryError};

/// Install a Prometheus scrape endpoint for the `metrics` facade.
///
/// Must be called from within a Tokio runtime.
pub fn install_prometheus_exporter(listen_address: SocketAddr) -> Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(listen_address)
        .install()
        .map_err(|e| TelemetryError::ExporterError(e.to_string()))?;

    tracing::info!(address = %listen_address, "Prometheus exporter listening");
    Ok(())
}
