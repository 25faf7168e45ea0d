//! Metrics collection and Prometheus export.
//!
//! Installs the exporter once and renders it for the /metrics endpoint.

use metrics::counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use service_core::error::AppError;
use std::sync::{Mutex, OnceLock};

/// Global handle to the Prometheus recorder.
pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

// Serializes installation; the recorder can only be set once per process.
static INIT_LOCK: Mutex<()> = Mutex::new(());

/// Install the Prometheus recorder. Later and concurrent calls are no-ops.
pub fn init_metrics() -> Result<(), AppError> {
    let _guard = INIT_LOCK.lock().map_err(|e| {
        AppError::ConfigError(anyhow::anyhow!("metrics init lock poisoned: {}", e))
    })?;
    if METRICS_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new().install_recorder().map_err(|e| {
        AppError::ConfigError(anyhow::anyhow!(
            "failed to install Prometheus recorder: {}",
            e
        ))
    })?;
    METRICS_HANDLE.set(handle).map_err(|_| {
        AppError::ConfigError(anyhow::anyhow!("metrics handle already initialized"))
    })?;
    Ok(())
}

/// Get the current metrics in Prometheus text format.
pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized".to_string())
}

pub fn record_store_operation(operation: &'static str, succeeded: bool) {
    let outcome = if succeeded { "ok" } else { "error" };
    counter!(
        "spv_store_operations_total",
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);
}
