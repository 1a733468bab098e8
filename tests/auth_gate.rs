mod common;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::read_json;
use croplink::app::{build_router, AppState};
use croplink::auth::verifier::StaticTokenVerifier;
use croplink::model::Interest;
use croplink::store::memory::InMemoryStore;
use croplink::store::{CropStore, DeleteOutcome, InsertOutcome, StoreError, StoreResult};
use http_helpers::{authed_request, get_request, json_request, plain_request, TEST_TOKEN};
use mongodb::bson::oid::ObjectId;
use mongodb::bson::Document;
use std::sync::Arc;
use tower::ServiceExt;

fn test_app() -> axum::Router {
    build_router(AppState {
        store: Arc::new(InMemoryStore::new()),
        verifier: Arc::new(StaticTokenVerifier::new(TEST_TOKEN)),
    })
}

/// Store whose every operation fails; proves the gate rejects before any
/// store access (a gated request that reached the store would 500).
struct FailingStore;

fn unavailable() -> StoreError {
    StoreError::Unexpected(anyhow::anyhow!("store must not be reached"))
}

#[async_trait]
impl CropStore for FailingStore {
    async fn list_crops(&self) -> StoreResult<Vec<Document>> {
        Err(unavailable())
    }
    async fn get_crop(&self, _id: ObjectId) -> StoreResult<Option<Document>> {
        Err(unavailable())
    }
    async fn insert_crop(&self, _crop: Document) -> StoreResult<InsertOutcome> {
        Err(unavailable())
    }
    async fn latest_crops(&self, _limit: i64) -> StoreResult<Vec<Document>> {
        Err(unavailable())
    }
    async fn crops_by_owner(&self, _owner_email: &str) -> StoreResult<Vec<Document>> {
        Err(unavailable())
    }
    async fn crops_with_interest_from(&self, _user_email: &str) -> StoreResult<Vec<Document>> {
        Err(unavailable())
    }
    async fn search_crops_by_name(&self, _text: &str) -> StoreResult<Vec<Document>> {
        Err(unavailable())
    }
    async fn delete_crop(&self, _id: ObjectId) -> StoreResult<DeleteOutcome> {
        Err(unavailable())
    }
    async fn find_interest(
        &self,
        _crop_id: ObjectId,
        _user_email: &str,
    ) -> StoreResult<Option<Interest>> {
        Err(unavailable())
    }
    async fn insert_interest(&self, _interest: &Interest) -> StoreResult<InsertOutcome> {
        Err(unavailable())
    }
    async fn append_crop_interest(
        &self,
        _crop_id: ObjectId,
        _interest: &Interest,
    ) -> StoreResult<()> {
        Err(unavailable())
    }
    async fn health_check(&self) -> StoreResult<()> {
        Err(unavailable())
    }
    fn is_durable(&self) -> bool {
        false
    }
    fn backend_name(&self) -> &'static str {
        "failing"
    }
}

fn gated_uris() -> Vec<String> {
    vec![
        format!("/crops/{}", ObjectId::new().to_hex()),
        "/my-interests?email=a@x.com".to_string(),
        "/my-posts?email=a@x.com".to_string(),
    ]
}

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let app = test_app();
    for uri in gated_uris() {
        let response = app.clone().oneshot(get_request(&uri)).await.expect("get");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
        let payload = read_json(response).await;
        assert_eq!(payload["message"], "unauthorized access. Token not found!");
    }
}

#[tokio::test]
async fn invalid_token_is_unauthorized() {
    let app = test_app();
    for uri in gated_uris() {
        let request = Request::builder()
            .uri(&uri)
            .header("authorization", "Bearer wrong-token")
            .body(Body::empty())
            .expect("request");
        let response = app.clone().oneshot(request).await.expect("get");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
        let payload = read_json(response).await;
        assert_eq!(payload["message"], "Unauthorized access");
    }
}

#[tokio::test]
async fn non_bearer_scheme_is_unauthorized() {
    let app = test_app();
    let request = Request::builder()
        .uri("/my-posts?email=a@x.com")
        .header("authorization", format!("Basic {TEST_TOKEN}"))
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("get");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn gate_rejects_before_store_access() {
    let app = build_router(AppState {
        store: Arc::new(FailingStore),
        verifier: Arc::new(StaticTokenVerifier::new(TEST_TOKEN)),
    });
    for uri in gated_uris() {
        let response = app.clone().oneshot(get_request(&uri)).await.expect("get");
        // 401, not the 500 every store call would produce.
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
    }
}

#[tokio::test]
async fn valid_token_passes_the_gate() {
    let app = test_app();
    for uri in gated_uris() {
        let response = app
            .clone()
            .oneshot(authed_request("GET", &uri))
            .await
            .expect("get");
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
    }
}

#[tokio::test]
async fn open_routes_need_no_token() {
    let app = test_app();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/crops",
            serde_json::json!({ "name": "Wheat" }),
        ))
        .await
        .expect("create");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json(response).await;
    let id = payload["result"]["insertedId"]
        .as_str()
        .expect("inserted id")
        .to_string();

    for uri in ["/crops", "/latest-crops", "/search?search=wheat"] {
        let response = app.clone().oneshot(get_request(uri)).await.expect("get");
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
    }

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/interests/{id}"),
            serde_json::json!({ "userEmail": "b@x.com", "quantity": 1 }),
        ))
        .await
        .expect("interest");
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(plain_request("DELETE", &format!("/my-posts/{id}")))
        .await
        .expect("delete");
    assert_eq!(response.status(), StatusCode::OK);
}
