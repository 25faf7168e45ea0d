//! Schema-less documents and the identifier rules shared by every handler.
//!
//! Clients speak JSON objects; the store speaks BSON. Conversions in both
//! directions live here so the handlers and backends never disagree about
//! how an `_id` looks.

use mongodb::bson::{oid::ObjectId, Bson, Document as BsonDocument};
use serde_json::{Map, Number, Value};
use service_core::error::AppError;

/// An open-ended JSON object. Key-ordered.
pub type SpvDocument = Map<String, Value>;

pub const ID_FIELD: &str = "_id";

/// Parse a path identifier. Anything but 24 hex characters is rejected.
pub fn parse_object_id(raw: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(raw).map_err(|_| AppError::validation("Invalid ID"))
}

/// Prepare a create payload for the store.
///
/// `_id` must be present and non-null. A string `_id` that is a valid object
/// identifier is stored as an `ObjectId` so it is reachable through
/// `/spv/:id`; any other value is kept as given.
pub fn into_store_document(document: SpvDocument) -> Result<BsonDocument, AppError> {
    match document.get(ID_FIELD) {
        None | Some(Value::Null) => {
            return Err(AppError::validation("Missing _id field for upsert"));
        }
        _ => {}
    }

    let mut converted = to_bson_document(document);
    if let Some(Bson::String(raw)) = converted.get(ID_FIELD) {
        if let Ok(oid) = ObjectId::parse_str(raw) {
            converted.insert(ID_FIELD, oid);
        }
    }
    Ok(converted)
}

/// Prepare an update payload: identity is immutable, so `_id` is dropped.
pub fn into_merge_fields(mut fields: SpvDocument) -> BsonDocument {
    fields.remove(ID_FIELD);
    to_bson_document(fields)
}

fn to_bson_document(document: SpvDocument) -> BsonDocument {
    document
        .into_iter()
        .map(|(key, value)| (key, json_to_bson(value)))
        .collect()
}

/// Convert a client value for storage. Every JSON value has a BSON shape:
/// integers outside `i64` are stored as doubles.
pub fn json_to_bson(value: Value) -> Bson {
    match value {
        Value::Null => Bson::Null,
        Value::Bool(b) => Bson::Boolean(b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Bson::Int64(i),
            None => Bson::Double(n.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(s) => Bson::String(s),
        Value::Array(items) => Bson::Array(items.into_iter().map(json_to_bson).collect()),
        Value::Object(map) => Bson::Document(to_bson_document(map)),
    }
}

pub fn from_store_document(document: BsonDocument) -> SpvDocument {
    document
        .into_iter()
        .map(|(key, value)| (key, bson_to_json(value)))
        .collect()
}

/// Render a stored value as plain JSON.
///
/// Identifiers become hex strings and date-times RFC 3339 strings; types
/// JSON has no shape for fall back to relaxed extended JSON.
pub fn bson_to_json(value: Bson) -> Value {
    match value {
        Bson::Null | Bson::Undefined => Value::Null,
        Bson::Boolean(b) => Value::Bool(b),
        Bson::Int32(n) => Value::Number(n.into()),
        Bson::Int64(n) => Value::Number(n.into()),
        Bson::Double(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        Bson::String(s) => Value::String(s),
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::DateTime(dt) => match dt.try_to_rfc3339_string() {
            Ok(s) => Value::String(s),
            Err(_) => Value::Number(dt.timestamp_millis().into()),
        },
        Bson::Array(items) => Value::Array(items.into_iter().map(bson_to_json).collect()),
        Bson::Document(doc) => Value::Object(from_store_document(doc)),
        other => other.into_relaxed_extjson(),
    }
}
