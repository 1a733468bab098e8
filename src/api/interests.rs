//! Interest API handlers.
//!
//! # Purpose and responsibility
//! Implements interest creation with duplicate suppression and denormalized
//! propagation into the parent listing, plus the buyer's "my interests" view.
//!
//! # Key invariants and assumptions
//! - At most one interest per (listing, buyer email). The pre-insert check
//!   gives the friendly error; the store's conflict signal is authoritative
//!   when two requests race.
//! - The interest insert and the embedded append are two independent writes
//!   with no rollback: if the append fails, the interest exists in its
//!   collection but not in the listing's embedded copy. Accepted window.
use crate::api::error::{
    api_duplicate_interest, api_internal, api_invalid_identifier, ApiError,
};
use crate::api::types::{InterestCreateRequest, InterestCreatedResponse};
use crate::app::AppState;
use crate::auth::gate::require_identity;
use crate::model::Interest;
use crate::store::StoreError;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{DateTime, Document};
use std::collections::HashMap;

#[utoipa::path(
    post,
    path = "/interests/{id}",
    tag = "interests",
    params(
        ("id" = String, Path, description = "Target crop listing identifier")
    ),
    request_body = InterestCreateRequest,
    responses(
        (status = 200, description = "Interest recorded", body = InterestCreatedResponse),
        (status = 400, description = "Malformed identifier or duplicate interest", body = crate::api::types::FailureResponse),
        (status = 500, description = "Store failure", body = crate::api::types::FailureResponse)
    )
)]
/// Record a buyer's interest in a listing.
///
/// # What it does
/// Checks for an existing interest from the same email on the same listing,
/// inserts a new interest with a server-assigned timestamp, then appends a
/// denormalized copy (with its assigned id) into the listing's `interests`
/// array.
///
/// # Errors
/// - 400 when the listing id is malformed or the interest already exists.
/// - 500 with a generic message on any store failure.
pub(crate) async fn create_interest(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Json(body): Json<InterestCreateRequest>,
) -> Result<Json<InterestCreatedResponse>, ApiError> {
    let crop_id: ObjectId = id.parse().map_err(|_| api_invalid_identifier())?;

    let existing = state
        .store
        .find_interest(crop_id, &body.user_email)
        .await
        .map_err(|err| api_internal("failed to check for existing interest", &err))?;
    if existing.is_some() {
        return Err(api_duplicate_interest());
    }

    let mut interest = Interest {
        id: None,
        crop_id,
        user_email: body.user_email,
        user_name: body.user_name,
        quantity: body.quantity,
        message: body.message,
        status: body.status,
        created_at: DateTime::now(),
    };
    let result = match state.store.insert_interest(&interest).await {
        Ok(result) => result,
        // A concurrent request won the race past the pre-check; the store's
        // uniqueness guard is the authoritative signal.
        Err(StoreError::Conflict(_)) => return Err(api_duplicate_interest()),
        Err(err) => return Err(api_internal("failed to insert interest", &err)),
    };

    interest.id = Some(result.inserted_id);
    state
        .store
        .append_crop_interest(crop_id, &interest)
        .await
        .map_err(|err| api_internal("failed to embed interest into crop", &err))?;

    Ok(Json(InterestCreatedResponse {
        success: true,
        message: "Interest added successfully".to_string(),
        interest_result: result,
    }))
}

#[utoipa::path(
    get,
    path = "/my-interests",
    tag = "interests",
    params(
        ("email" = String, Query, description = "Buyer email to filter by")
    ),
    responses(
        (status = 200, description = "Listings with an embedded interest from the email"),
        (status = 401, description = "Missing or invalid bearer token", body = crate::api::types::MessageResponse)
    )
)]
/// Listings a buyer has expressed interest in.
///
/// # What it does
/// Requires a verified bearer, then returns listings whose embedded
/// `interests` array contains an entry with the given email. This reads the
/// denormalized copy inside listings, not the interest collection, so it can
/// lag behind a partially-failed interest creation.
///
/// # Errors
/// - 401 before any store access when the bearer is missing or invalid.
/// - 500 if the store scan fails.
pub(crate) async fn my_interests(
    Query(params): Query<HashMap<String, String>>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Document>>, ApiError> {
    require_identity(&state, &headers).await?;
    let email = params.get("email").map(String::as_str).unwrap_or_default();
    let crops = state
        .store
        .crops_with_interest_from(email)
        .await
        .map_err(|err| api_internal("failed to load interests", &err))?;
    Ok(Json(crops))
}
