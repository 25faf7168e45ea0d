//! The `/spv` collection endpoints. Each handler is one store call.

use crate::models::{
    from_store_document, into_merge_fields, into_store_document, parse_object_id, SpvDocument,
    WriteOutcome,
};
use crate::services::record_store_operation;
use crate::startup::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use axum_extra::extract::WithRejection;
use serde_json::{json, Value};
use service_core::error::AppError;

/// Create-or-replace keyed on the payload's `_id`.
pub async fn create_document(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<SpvDocument>, AppError>,
) -> Result<Json<WriteOutcome>, AppError> {
    let document = into_store_document(payload)?;

    let result = state.store.upsert(document).await;
    record_store_operation("upsert", result.is_ok());
    let outcome = result?;

    tracing::info!(
        matched = outcome.matched_count,
        modified = outcome.modified_count,
        upserted = outcome.upserted_count,
        "Document upserted"
    );

    Ok(Json(outcome))
}

/// Merge the payload's fields into the document at `:id`. `_id` in the
/// payload is ignored.
///
/// The identifier is validated before the body is looked at.
pub async fn update_document(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<String>, AppError>,
    payload: Result<Json<SpvDocument>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let id = parse_object_id(&id)?;
    let Json(payload) = payload?;
    let fields = into_merge_fields(payload);

    let result = state.store.merge(id, fields).await;
    record_store_operation("merge", result.is_ok());
    let outcome = result?;

    // Reported as updated either way; callers cannot tell a miss from a hit.
    if outcome.matched_count == 0 {
        tracing::warn!(document_id = %id, "Update matched no document");
    } else {
        tracing::info!(
            document_id = %id,
            modified = outcome.modified_count,
            "Document updated"
        );
    }

    Ok(Json(json!({ "status": "updated" })))
}

pub async fn list_documents(
    State(state): State<AppState>,
) -> Result<Json<Vec<SpvDocument>>, AppError> {
    let result = state.store.list().await;
    record_store_operation("list", result.is_ok());
    let documents: Vec<SpvDocument> = result?.into_iter().map(from_store_document).collect();

    tracing::debug!(count = documents.len(), "Listed documents");

    Ok(Json(documents))
}

pub async fn get_document(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<String>, AppError>,
) -> Result<Json<SpvDocument>, AppError> {
    let id = parse_object_id(&id)?;

    let result = state.store.find_by_id(id).await;
    record_store_operation("find_by_id", result.is_ok());

    // Any failure to produce the document is reported as a miss.
    let document = result
        .map_err(|e| {
            tracing::warn!(document_id = %id, error = %e, "Document lookup failed");
            AppError::not_found("Not found")
        })?
        .ok_or_else(|| AppError::not_found("Not found"))?;

    Ok(Json(from_store_document(document)))
}
