//! Marketplace HTTP application wiring.
//!
//! # Purpose
//! Builds the Axum router, configures middleware, and defines the shared
//! application state injected into handlers.
//!
//! # Notes
//! This module centralizes route composition to keep `main` small and
//! testable. The auth asymmetry is deliberate and documented: only
//! get-by-id, my-interests, and my-posts are gated; creation, deletion,
//! latest, and search are open.
use crate::api;
use crate::api::openapi::ApiDoc;
use crate::auth::verifier::TokenVerifier;
use crate::store::CropStore;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CropStore>,
    pub verifier: Arc<dyn TokenVerifier>,
}

pub fn build_router(state: AppState) -> Router {
    let trace_layer =
        TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
            tracing::info_span!(
                "http.request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version()
            )
        });

    Router::new()
        .route("/", axum::routing::get(api::system::root))
        .route("/health", axum::routing::get(api::system::health))
        .route(
            "/crops",
            axum::routing::get(api::crops::list_crops).post(api::crops::create_crop),
        )
        .route("/crops/{id}", axum::routing::get(api::crops::get_crop))
        .route(
            "/interests/{id}",
            axum::routing::post(api::interests::create_interest),
        )
        .route(
            "/my-interests",
            axum::routing::get(api::interests::my_interests),
        )
        .route(
            "/latest-crops",
            axum::routing::get(api::crops::latest_crops),
        )
        .route("/my-posts", axum::routing::get(api::crops::my_posts))
        .route("/search", axum::routing::get(api::crops::search_crops))
        .route(
            "/my-posts/{id}",
            axum::routing::delete(api::crops::delete_crop),
        )
        .merge(
            utoipa_swagger_ui::SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()),
        )
        .layer(CorsLayer::permissive())
        .layer(trace_layer)
        .with_state(state)
}
