mod common;

use axum::http::StatusCode;
use common::read_json;
use croplink::app::{build_router, AppState};
use croplink::auth::verifier::StaticTokenVerifier;
use croplink::store::memory::InMemoryStore;
use http_helpers::{authed_request, json_request, TEST_TOKEN};
use mongodb::bson::oid::ObjectId;
use std::sync::Arc;
use tower::ServiceExt;

fn test_app() -> axum::Router {
    build_router(AppState {
        store: Arc::new(InMemoryStore::new()),
        verifier: Arc::new(StaticTokenVerifier::new(TEST_TOKEN)),
    })
}

async fn create_crop(app: &axum::Router, name: &str) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/crops",
            serde_json::json!({ "name": name, "owner": { "ownerEmail": "farmer@x.com" } }),
        ))
        .await
        .expect("create crop");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json(response).await;
    payload["result"]["insertedId"]
        .as_str()
        .expect("inserted id")
        .to_string()
}

fn interest_body(email: &str) -> serde_json::Value {
    serde_json::json!({
        "userEmail": email,
        "userName": "Buyer",
        "quantity": 25,
        "message": "Interested in this harvest",
        "status": "pending"
    })
}

#[tokio::test]
async fn interest_create_then_duplicate_then_views() {
    let app = test_app();
    let crop_id = create_crop(&app, "Wheat").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/interests/{crop_id}"),
            interest_body("b@x.com"),
        ))
        .await
        .expect("interest");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json(response).await;
    assert_eq!(payload["success"], true);
    assert_eq!(payload["message"], "Interest added successfully");
    assert!(payload["interestResult"]["insertedId"].is_string());

    // Same buyer, same listing: business conflict, no second write.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/interests/{crop_id}"),
            interest_body("b@x.com"),
        ))
        .await
        .expect("duplicate");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json(response).await;
    assert_eq!(payload["success"], false);
    assert_eq!(
        payload["message"],
        "You already submitted interest for this crop."
    );

    // The listing's embedded copy has exactly one entry for the buyer.
    let response = app
        .clone()
        .oneshot(authed_request("GET", &format!("/crops/{crop_id}")))
        .await
        .expect("fetch");
    let payload = read_json(response).await;
    let embedded = payload["result"]["interests"].as_array().expect("array");
    assert_eq!(embedded.len(), 1);
    assert_eq!(embedded[0]["userEmail"], "b@x.com");
    assert_eq!(embedded[0]["userName"], "Buyer");
    assert_eq!(embedded[0]["quantity"], 25);
    assert!(embedded[0]["_id"].is_object());

    // A different buyer on the same listing is fine.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/interests/{crop_id}"),
            interest_body("c@x.com"),
        ))
        .await
        .expect("second buyer");
    assert_eq!(response.status(), StatusCode::OK);

    // My-interests reads the denormalized copy inside listings.
    let response = app
        .clone()
        .oneshot(authed_request("GET", "/my-interests?email=b@x.com"))
        .await
        .expect("my interests");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json(response).await;
    let listings = payload.as_array().expect("array");
    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0]["name"], "Wheat");

    let response = app
        .oneshot(authed_request("GET", "/my-interests?email=nobody@x.com"))
        .await
        .expect("my interests");
    let payload = read_json(response).await;
    assert!(payload.as_array().expect("array").is_empty());
}

#[tokio::test]
async fn same_buyer_on_two_listings_is_allowed() {
    let app = test_app();
    let first = create_crop(&app, "Wheat").await;
    let second = create_crop(&app, "Rice").await;

    for crop_id in [&first, &second] {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                &format!("/interests/{crop_id}"),
                interest_body("b@x.com"),
            ))
            .await
            .expect("interest");
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .oneshot(authed_request("GET", "/my-interests?email=b@x.com"))
        .await
        .expect("my interests");
    let payload = read_json(response).await;
    assert_eq!(payload.as_array().expect("array").len(), 2);
}

#[tokio::test]
async fn malformed_listing_id_is_a_structured_bad_request() {
    let app = test_app();
    let response = app
        .oneshot(json_request(
            "POST",
            "/interests/not-an-id",
            interest_body("b@x.com"),
        ))
        .await
        .expect("interest");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json(response).await;
    assert_eq!(payload["success"], false);
}

#[tokio::test]
async fn interest_for_missing_listing_is_a_server_error() {
    let app = test_app();
    let ghost = ObjectId::new().to_hex();
    let response = app
        .oneshot(json_request(
            "POST",
            &format!("/interests/{ghost}"),
            interest_body("b@x.com"),
        ))
        .await
        .expect("interest");
    // The interest insert succeeds but the embedded append finds no parent;
    // the route maps that to its generic server error.
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let payload = read_json(response).await;
    assert_eq!(payload["success"], false);
    assert_eq!(payload["message"], "Server Error");
}
