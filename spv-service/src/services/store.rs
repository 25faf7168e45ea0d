use crate::models::WriteOutcome;
use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, Document};
use service_core::error::AppError;

/// The one collection the gateway reads and writes.
///
/// Every method is a single store round trip. Failures come back as
/// `AppError::StoreError` carrying the message the client should see.
#[async_trait]
pub trait SpvStore: Send + Sync {
    async fn ping(&self) -> Result<(), AppError>;

    /// Replace the document whose `_id` matches, inserting it when none does.
    async fn upsert(&self, document: Document) -> Result<WriteOutcome, AppError>;

    /// Set the given top-level fields on the document with this identifier.
    /// A missing document is not an error; `matched_count` is 0.
    async fn merge(&self, id: ObjectId, fields: Document) -> Result<WriteOutcome, AppError>;

    async fn list(&self) -> Result<Vec<Document>, AppError>;

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Document>, AppError>;
}
