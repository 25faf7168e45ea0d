#![allow(dead_code)]

use secrecy::Secret;
use service_core::config::Config as CoreConfig;
use spv_service::config::{Environment, SpvConfig, StoreBackend, StoreConfig};
use spv_service::services::{MemoryStore, SpvStore};
use spv_service::startup::{connect_store, Application};
use std::sync::Arc;
use uuid::Uuid;

pub const KNOWN_ID: &str = "507f1f77bcf86cd799439011";

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub store: Arc<dyn SpvStore>,
    pub client: reqwest::Client,
    pub db_name: String,
}

pub fn mongodb_uri() -> String {
    std::env::var("MONGODB_URI").unwrap_or_else(|_| "mongodb://localhost:27017".to_string())
}

pub fn test_config() -> SpvConfig {
    SpvConfig {
        common: CoreConfig { port: 0 }, // Random port for testing
        environment: Environment::Dev,
        service_name: "spv-service".to_string(),
        log_level: "error".to_string(),
        otlp_endpoint: None,
        store: StoreConfig {
            backend: StoreBackend::Memory,
            uri: Secret::new(String::new()),
            database: "spv_test".to_string(),
            collection: "spv".to_string(),
        },
    }
}

impl TestApp {
    pub async fn spawn() -> Self {
        let store: Arc<dyn SpvStore> = Arc::new(MemoryStore::new());
        Self::spawn_with(test_config(), store).await
    }

    /// Spawn against a real MongoDB, one throwaway database per test.
    pub async fn spawn_mongo() -> Self {
        let mut config = test_config();
        config.store.backend = StoreBackend::Mongo;
        config.store.uri = Secret::new(mongodb_uri());
        config.store.database = format!("spv_test_{}", Uuid::new_v4().simple());

        let store = connect_store(&config.store)
            .await
            .expect("Failed to connect to MongoDB");
        Self::spawn_with(config, store).await
    }

    async fn spawn_with(config: SpvConfig, store: Arc<dyn SpvStore>) -> Self {
        let db_name = config.store.database.clone();
        let app = Application::build_with_store(config, store.clone())
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to answer on its greeting route
        let client = reqwest::Client::new();
        for _ in 0..50 {
            if client.get(&address).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(20)).await;
        }

        TestApp {
            address,
            port,
            store,
            client,
            db_name,
        }
    }

    /// Drop the per-test database.
    pub async fn cleanup(&self) {
        if let Ok(client) = mongodb::Client::with_uri_str(mongodb_uri()).await {
            let _ = client.database(&self.db_name).drop(None).await;
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn create(&self, body: serde_json::Value) -> reqwest::Response {
        self.client
            .post(self.url("/spv"))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to execute request")
    }
}
