//! System/health API handlers.
//!
//! # Purpose and responsibility
//! Provides the liveness banner and a store-backed health probe.
//!
//! # Key invariants and assumptions
//! - The root banner is static text and never touches the store.
//! - The health check must be fast and side-effect free.
use crate::api::error::{api_internal, ApiError};
use crate::api::types::HealthStatus;
use crate::app::AppState;
use axum::extract::State;
use axum::Json;

#[utoipa::path(
    get,
    path = "/",
    tag = "system",
    responses(
        (status = 200, description = "Liveness banner")
    )
)]
/// Root liveness text.
pub(crate) async fn root() -> &'static str {
    "croplink server is running"
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses(
        (status = 200, description = "Service health", body = HealthStatus),
        (status = 500, description = "Store unavailable", body = crate::api::types::FailureResponse)
    )
)]
/// Store-backed health probe.
///
/// # Errors
/// - Returns 500 if the store health check fails.
pub(crate) async fn health(State(state): State<AppState>) -> Result<Json<HealthStatus>, ApiError> {
    if let Err(err) = state.store.health_check().await {
        return Err(api_internal("storage unavailable", &err));
    }
    Ok(Json(HealthStatus {
        status: "ok".to_string(),
    }))
}
