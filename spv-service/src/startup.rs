//! Application startup and lifecycle management.

use crate::config::{SpvConfig, StoreBackend, StoreConfig};
use crate::handlers;
use crate::services::{MemoryStore, MongoStore, SpvStore};
use axum::{middleware::from_fn, routing::get, Router};
use service_core::error::AppError;
use service_core::middleware::{
    cors::cors_middleware, metrics::metrics_middleware, tracing::request_id_middleware,
    tracing::REQUEST_ID_HEADER,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;

/// Shared application state. The store handle is the only thing handlers share.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SpvStore>,
}

/// Open the configured backend. A MongoDB store must answer a ping before
/// the service starts accepting requests.
pub async fn connect_store(config: &StoreConfig) -> Result<Arc<dyn SpvStore>, AppError> {
    match config.backend {
        StoreBackend::Mongo => {
            let store = MongoStore::connect(config).await?;
            store.ping().await.map_err(|e| {
                tracing::error!("MongoDB did not answer ping at startup: {}", e);
                e
            })?;
            tracing::info!("Pinged MongoDB deployment successfully");
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store - documents will not survive a restart");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::greeting))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics))
        .route(
            "/spv",
            get(handlers::list_documents).post(handlers::create_document),
        )
        .route(
            "/spv/:id",
            get(handlers::get_document).put(handlers::update_document),
        )
        .with_state(state)
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        // Outermost so OPTIONS never reaches routing.
        .layer(from_fn(cors_middleware))
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Connect the store from configuration and bind the listener.
    pub async fn build(config: SpvConfig) -> Result<Self, AppError> {
        let store = connect_store(&config.store).await?;
        Self::build_with_store(config, store).await
    }

    /// Bind the listener around an already opened store (port 0 = random port).
    pub async fn build_with_store(
        config: SpvConfig,
        store: Arc<dyn SpvStore>,
    ) -> Result<Self, AppError> {
        let addr = config.common.socket_addr();
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on port {}", port);

        Ok(Self {
            port,
            listener,
            state: AppState { store },
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Serve until SIGINT/SIGTERM, then drain in-flight requests.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = build_router(self.state);
        axum::serve(self.listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
