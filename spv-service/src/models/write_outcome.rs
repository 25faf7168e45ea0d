use mongodb::bson::Bson;
use mongodb::results::UpdateResult;
use serde::Serialize;
use serde_json::Value;

use super::bson_to_json;

/// Result of a create-or-replace, serialized with the store driver's field names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WriteOutcome {
    #[serde(rename = "MatchedCount")]
    pub matched_count: u64,
    #[serde(rename = "ModifiedCount")]
    pub modified_count: u64,
    #[serde(rename = "UpsertedCount")]
    pub upserted_count: u64,
    #[serde(rename = "UpsertedID")]
    pub upserted_id: Option<Value>,
}

impl WriteOutcome {
    pub fn matched(modified: bool) -> Self {
        Self {
            matched_count: 1,
            modified_count: u64::from(modified),
            upserted_count: 0,
            upserted_id: None,
        }
    }

    pub fn unmatched() -> Self {
        Self {
            matched_count: 0,
            modified_count: 0,
            upserted_count: 0,
            upserted_id: None,
        }
    }

    pub fn upserted(id: Bson) -> Self {
        Self {
            matched_count: 0,
            modified_count: 0,
            upserted_count: 1,
            upserted_id: Some(bson_to_json(id)),
        }
    }
}

impl From<UpdateResult> for WriteOutcome {
    fn from(result: UpdateResult) -> Self {
        Self {
            matched_count: result.matched_count,
            modified_count: result.modified_count,
            upserted_count: u64::from(result.upserted_id.is_some()),
            upserted_id: result.upserted_id.map(bson_to_json),
        }
    }
}
