use service_core::error::AppError;
use service_core::observability::init_tracing;
use spv_service::config::SpvConfig;
use spv_service::services::init_metrics;
use spv_service::Application;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Load configuration - fail fast if invalid
    let config = SpvConfig::load()?;

    init_tracing(
        &config.service_name,
        &config.log_level,
        config.otlp_endpoint.as_deref(),
    )?;

    // Must be installed before any metrics are recorded
    init_metrics()?;

    tracing::info!(
        service = %config.service_name,
        version = env!("CARGO_PKG_VERSION"),
        environment = ?config.environment,
        store = ?config.store.backend,
        "Starting spv service"
    );

    // Store unreachable at startup aborts the process
    let application = Application::build(config).await?;
    application.run_until_stopped().await?;

    Ok(())
}
