use crate::config::StoreConfig;
use crate::models::{WriteOutcome, ID_FIELD};
use crate::services::SpvStore;
use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, Document},
    options::{ClientOptions, ReplaceOptions, ServerApi, ServerApiVersion},
    Client as MongoClient, Collection,
};
use secrecy::ExposeSecret;
use service_core::error::AppError;

#[derive(Clone)]
pub struct MongoStore {
    client: MongoClient,
    collection: Collection<Document>,
}

impl MongoStore {
    pub async fn connect(config: &StoreConfig) -> Result<Self, AppError> {
        tracing::info!(
            database = %config.database,
            collection = %config.collection,
            "Connecting to MongoDB"
        );

        let mut client_options = ClientOptions::parse(config.uri.expose_secret())
            .await
            .map_err(|e| {
                tracing::error!("Failed to parse MongoDB connection string: {}", e);
                AppError::store("Database error", e)
            })?;
        client_options.app_name = Some("spv-service".to_string());
        client_options.server_api =
            Some(ServerApi::builder().version(ServerApiVersion::V1).build());

        let client = MongoClient::with_options(client_options).map_err(|e| {
            tracing::error!("Failed to create MongoDB client: {}", e);
            AppError::from(e)
        })?;
        let collection = client
            .database(&config.database)
            .collection::<Document>(&config.collection);

        tracing::info!(
            database = %config.database,
            collection = %config.collection,
            "MongoDB collection assigned"
        );
        Ok(Self { client, collection })
    }
}

#[async_trait]
impl SpvStore for MongoStore {
    async fn ping(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB ping failed: {}", e);
                AppError::store("Store unavailable", e)
            })?;
        Ok(())
    }

    async fn upsert(&self, document: Document) -> Result<WriteOutcome, AppError> {
        let id = document
            .get(ID_FIELD)
            .cloned()
            .ok_or_else(|| AppError::validation("Missing _id field for upsert"))?;

        let options = ReplaceOptions::builder().upsert(true).build();
        let result = self
            .collection
            .replace_one(doc! { "_id": id }, document, options)
            .await
            .map_err(|e| AppError::store("Upsert failed", e))?;

        Ok(WriteOutcome::from(result))
    }

    async fn merge(&self, id: ObjectId, fields: Document) -> Result<WriteOutcome, AppError> {
        let result = self
            .collection
            .update_one(doc! { "_id": id }, doc! { "$set": fields }, None)
            .await
            .map_err(|e| AppError::store("Update failed", e))?;

        Ok(WriteOutcome::from(result))
    }

    async fn list(&self) -> Result<Vec<Document>, AppError> {
        let cursor = self
            .collection
            .find(doc! {}, None)
            .await
            .map_err(|e| AppError::store("Failed to fetch", e))?;

        cursor
            .try_collect::<Vec<Document>>()
            .await
            .map_err(|e| AppError::store("Decoding failed", e))
    }

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Document>, AppError> {
        self.collection
            .find_one(doc! { "_id": id }, None)
            .await
            .map_err(|e| AppError::store("Failed to fetch", e))
    }
}
