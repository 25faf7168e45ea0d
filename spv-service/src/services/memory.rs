use crate::models::{WriteOutcome, ID_FIELD};
use crate::services::SpvStore;
use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, Bson, Document};
use service_core::error::AppError;
use std::sync::{Mutex, MutexGuard};

/// Process-local collection with the same observable semantics as MongoDB.
/// Backs `STORE_BACKEND=memory` and the test suite.
pub struct MemoryStore {
    documents: Mutex<Vec<Document>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            documents: Mutex::new(Vec::new()),
        }
    }

    fn lock(&self, message: &str) -> Result<MutexGuard<'_, Vec<Document>>, AppError> {
        self.documents.lock().map_err(|e| {
            AppError::store(
                message,
                anyhow::anyhow!("Memory store mutex poisoned: {}", e),
            )
        })
    }
}

fn position(documents: &[Document], id: &Bson) -> Option<usize> {
    documents.iter().position(|doc| doc.get(ID_FIELD) == Some(id))
}

#[async_trait]
impl SpvStore for MemoryStore {
    async fn ping(&self) -> Result<(), AppError> {
        let _guard = self.lock("Store unavailable")?;
        Ok(())
    }

    async fn upsert(&self, document: Document) -> Result<WriteOutcome, AppError> {
        let id = document
            .get(ID_FIELD)
            .cloned()
            .ok_or_else(|| AppError::validation("Missing _id field for upsert"))?;

        let mut documents = self.lock("Upsert failed")?;
        match position(&documents, &id) {
            Some(index) => {
                let modified = documents[index] != document;
                documents[index] = document;
                Ok(WriteOutcome::matched(modified))
            }
            None => {
                documents.push(document);
                Ok(WriteOutcome::upserted(id))
            }
        }
    }

    async fn merge(&self, id: ObjectId, fields: Document) -> Result<WriteOutcome, AppError> {
        let mut documents = self.lock("Update failed")?;
        let Some(index) = position(&documents, &Bson::ObjectId(id)) else {
            return Ok(WriteOutcome::unmatched());
        };

        let target = &mut documents[index];
        let mut modified = false;
        for (key, value) in fields {
            if target.get(&key) != Some(&value) {
                target.insert(key, value);
                modified = true;
            }
        }
        Ok(WriteOutcome::matched(modified))
    }

    async fn list(&self) -> Result<Vec<Document>, AppError> {
        Ok(self.lock("Failed to fetch")?.clone())
    }

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Document>, AppError> {
        let documents = self.lock("Failed to fetch")?;
        Ok(position(&documents, &Bson::ObjectId(id)).map(|index| documents[index].clone()))
    }
}
