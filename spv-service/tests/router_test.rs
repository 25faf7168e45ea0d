//! Router-level tests against a store that records calls and can be told to fail.

mod common;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use mongodb::bson::{oid::ObjectId, Document};
use serde_json::{json, Value};
use service_core::error::AppError;
use spv_service::models::WriteOutcome;
use spv_service::services::SpvStore;
use spv_service::{build_router, AppState};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::util::ServiceExt;

#[derive(Default)]
struct FailingStore {
    calls: AtomicUsize,
}

impl FailingStore {
    fn fail(&self, message: &str) -> AppError {
        self.calls.fetch_add(1, Ordering::SeqCst);
        AppError::store(message, anyhow::anyhow!("server selection timeout"))
    }
}

#[async_trait]
impl SpvStore for FailingStore {
    async fn ping(&self) -> Result<(), AppError> {
        Err(self.fail("Store unavailable"))
    }

    async fn upsert(&self, _document: Document) -> Result<WriteOutcome, AppError> {
        Err(self.fail("Upsert failed"))
    }

    async fn merge(&self, _id: ObjectId, _fields: Document) -> Result<WriteOutcome, AppError> {
        Err(self.fail("Update failed"))
    }

    async fn list(&self) -> Result<Vec<Document>, AppError> {
        Err(self.fail("Failed to fetch"))
    }

    async fn find_by_id(&self, _id: ObjectId) -> Result<Option<Document>, AppError> {
        Err(self.fail("Failed to fetch"))
    }
}

fn app(store: Arc<FailingStore>) -> axum::Router {
    build_router(AppState { store })
}

async fn send(store: Arc<FailingStore>, request: Request<Body>) -> (StatusCode, Value) {
    let response = app(store).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn invalid_id_never_reaches_the_store() {
    let store = Arc::new(FailingStore::default());

    let (status, body) = send(
        store.clone(),
        Request::builder()
            .uri("/spv/xyz")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Invalid ID" }));

    let (status, _) = send(
        store.clone(),
        json_request("PUT", "/spv/xyz", json!({ "name": "B" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(store.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn undecodable_path_segment_is_a_json_error() {
    let store = Arc::new(FailingStore::default());

    let (status, body) = send(
        store.clone(),
        Request::builder()
            .uri("/spv/%FF")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
    assert_eq!(store.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn update_checks_the_id_before_the_body() {
    let store = Arc::new(FailingStore::default());

    let (status, body) = send(
        store.clone(),
        Request::builder()
            .method("PUT")
            .uri("/spv/xyz")
            .header("content-type", "application/json")
            .body(Body::from("{"))
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Invalid ID" }));
    assert_eq!(store.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn missing_id_never_reaches_the_store() {
    let store = Arc::new(FailingStore::default());

    let (status, _) = send(
        store.clone(),
        json_request("POST", "/spv", json!({ "name": "A" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(store.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn upsert_failure_is_internal_error() {
    let store = Arc::new(FailingStore::default());

    let (status, body) = send(
        store.clone(),
        json_request("POST", "/spv", json!({ "_id": common::KNOWN_ID, "name": "A" })),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Upsert failed" }));
    assert_eq!(store.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn update_failure_is_internal_error() {
    let store = Arc::new(FailingStore::default());

    let (status, body) = send(
        store,
        json_request(
            "PUT",
            &format!("/spv/{}", common::KNOWN_ID),
            json!({ "name": "B" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Update failed" }));
}

#[tokio::test]
async fn list_failure_is_internal_error() {
    let store = Arc::new(FailingStore::default());

    let (status, body) = send(
        store,
        Request::builder().uri("/spv").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to fetch" }));
}

#[tokio::test]
async fn lookup_failure_is_reported_as_not_found() {
    let store = Arc::new(FailingStore::default());

    let (status, body) = send(
        store,
        Request::builder()
            .uri(format!("/spv/{}", common::KNOWN_ID))
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Not found" }));
}

#[tokio::test]
async fn readiness_reports_unavailable_store() {
    let store = Arc::new(FailingStore::default());

    let (status, body) = send(
        store,
        Request::builder().uri("/ready").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "unavailable");
}

#[tokio::test]
async fn options_short_circuits_before_the_store() {
    let store = Arc::new(FailingStore::default());

    let (status, body) = send(
        store.clone(),
        Request::builder()
            .method("OPTIONS")
            .uri("/spv")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);
    assert_eq!(store.calls.load(Ordering::SeqCst), 0);
}
