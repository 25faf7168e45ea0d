pub mod document;
pub mod write_outcome;

pub use document::{
    bson_to_json, from_store_document, into_merge_fields, into_store_document, json_to_bson,
    parse_object_id, SpvDocument, ID_FIELD,
};
pub use write_outcome::WriteOutcome;
