//! Crop listing API handlers.
//!
//! # Purpose and responsibility
//! Implements listing CRUD plus the derived views (latest, owner-filtered,
//! search) over the schema-free crop collection.
//!
//! # Key invariants and assumptions
//! - Listings are inserted as the caller supplied them; the only server-side
//!   touch is stamping `created_at` when absent, so the latest view sorts on
//!   a field that is actually populated.
//! - Get-by-id and the owner views require a verified bearer; list-all,
//!   create, latest, search, and delete are open by design.
//! - Deletion has no ownership check and reports a zero count for missing
//!   ids rather than failing.
use crate::api::error::{api_internal, api_invalid_identifier, ApiError};
use crate::api::types::{CropEnvelope, DeleteEnvelope, InsertEnvelope};
use crate::app::AppState;
use crate::auth::gate::require_identity;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{DateTime, Document};
use std::collections::HashMap;

/// Maximum number of listings returned by the latest view.
const LATEST_LIMIT: i64 = 6;

fn parse_object_id(id: &str) -> Result<ObjectId, ApiError> {
    id.parse().map_err(|_| api_invalid_identifier())
}

#[utoipa::path(
    get,
    path = "/crops",
    tag = "crops",
    responses(
        (status = 200, description = "All crop listings, as stored")
    )
)]
/// List every crop listing.
///
/// # What it does
/// Unconditional scan of the crop collection, no filter, no pagination.
///
/// # Errors
/// - Returns 500 if the store scan fails.
pub(crate) async fn list_crops(
    State(state): State<AppState>,
) -> Result<Json<Vec<Document>>, ApiError> {
    let crops = state
        .store
        .list_crops()
        .await
        .map_err(|err| api_internal("failed to list crops", &err))?;
    Ok(Json(crops))
}

#[utoipa::path(
    get,
    path = "/crops/{id}",
    tag = "crops",
    params(
        ("id" = String, Path, description = "Crop listing identifier")
    ),
    responses(
        (status = 200, description = "Lookup result; `result` is null when no listing matches", body = CropEnvelope),
        (status = 400, description = "Malformed identifier", body = crate::api::types::FailureResponse),
        (status = 401, description = "Missing or invalid bearer token", body = crate::api::types::MessageResponse)
    )
)]
/// Fetch a single listing by id.
///
/// # What it does
/// Requires a verified bearer, then returns `{success, result}` where a miss
/// yields a null result rather than a 404 (success-envelope-always policy).
///
/// # Errors
/// - 401 before any store access when the bearer is missing or invalid.
/// - 400 when the id does not parse as an ObjectId.
/// - 500 if the store lookup fails.
pub(crate) async fn get_crop(
    Path(id): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<CropEnvelope>, ApiError> {
    require_identity(&state, &headers).await?;
    let id = parse_object_id(&id)?;
    let result = state
        .store
        .get_crop(id)
        .await
        .map_err(|err| api_internal("failed to fetch crop", &err))?;
    Ok(Json(CropEnvelope {
        success: true,
        result,
    }))
}

#[utoipa::path(
    post,
    path = "/crops",
    tag = "crops",
    responses(
        (status = 200, description = "Listing created", body = InsertEnvelope)
    )
)]
/// Create a listing from an arbitrary JSON object.
///
/// # What it does
/// Inserts the payload as-is (no schema validation) and returns the assigned
/// id. Stamps `created_at` when the payload does not carry one, so the
/// latest view has a sort key to work with.
///
/// # Errors
/// - Returns 500 if the store insert fails.
pub(crate) async fn create_crop(
    State(state): State<AppState>,
    Json(mut crop): Json<Document>,
) -> Result<Json<InsertEnvelope>, ApiError> {
    if !crop.contains_key("created_at") {
        crop.insert("created_at", DateTime::now());
    }
    let result = state
        .store
        .insert_crop(crop)
        .await
        .map_err(|err| api_internal("failed to create crop", &err))?;
    Ok(Json(InsertEnvelope {
        success: true,
        result,
    }))
}

#[utoipa::path(
    get,
    path = "/latest-crops",
    tag = "crops",
    responses(
        (status = 200, description = "At most six listings, newest first")
    )
)]
/// Most recent listings.
///
/// # What it does
/// Sorts by `created_at` descending and returns at most six listings.
///
/// # Errors
/// - Returns 500 if the store scan fails.
pub(crate) async fn latest_crops(
    State(state): State<AppState>,
) -> Result<Json<Vec<Document>>, ApiError> {
    let crops = state
        .store
        .latest_crops(LATEST_LIMIT)
        .await
        .map_err(|err| api_internal("failed to load latest crops", &err))?;
    Ok(Json(crops))
}

#[utoipa::path(
    get,
    path = "/my-posts",
    tag = "crops",
    params(
        ("email" = String, Query, description = "Owner email to filter by")
    ),
    responses(
        (status = 200, description = "Listings owned by the given email"),
        (status = 401, description = "Missing or invalid bearer token", body = crate::api::types::MessageResponse)
    )
)]
/// Listings owned by an email.
///
/// # What it does
/// Requires a verified bearer, then filters on an exact `owner.ownerEmail`
/// match. The email is an untyped query parameter with no format validation.
///
/// # Errors
/// - 401 before any store access when the bearer is missing or invalid.
/// - 500 if the store scan fails.
pub(crate) async fn my_posts(
    Query(params): Query<HashMap<String, String>>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Document>>, ApiError> {
    require_identity(&state, &headers).await?;
    let email = params.get("email").map(String::as_str).unwrap_or_default();
    let crops = state
        .store
        .crops_by_owner(email)
        .await
        .map_err(|err| api_internal("failed to load posts", &err))?;
    Ok(Json(crops))
}

#[utoipa::path(
    get,
    path = "/search",
    tag = "crops",
    params(
        ("search" = String, Query, description = "Text to match against listing names")
    ),
    responses(
        (status = 200, description = "Listings whose name contains the text, case-insensitive")
    )
)]
/// Search listings by name.
///
/// # What it does
/// Case-insensitive substring match against the `name` field. The input is
/// matched literally; the store escapes it before any regex construction.
///
/// # Errors
/// - Returns 500 if the store scan fails.
pub(crate) async fn search_crops(
    Query(params): Query<HashMap<String, String>>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Document>>, ApiError> {
    let text = params.get("search").map(String::as_str).unwrap_or_default();
    let crops = state
        .store
        .search_crops_by_name(text)
        .await
        .map_err(|err| api_internal("failed to search crops", &err))?;
    Ok(Json(crops))
}

#[utoipa::path(
    delete,
    path = "/my-posts/{id}",
    tag = "crops",
    params(
        ("id" = String, Path, description = "Crop listing identifier")
    ),
    responses(
        (status = 200, description = "Deletion outcome; `deletedCount` is 0 for a missing id", body = DeleteEnvelope),
        (status = 400, description = "Malformed identifier", body = crate::api::types::FailureResponse)
    )
)]
/// Delete a listing by id.
///
/// # What it does
/// Deletes the matching listing. No auth and no ownership check, matching
/// the documented access policy. A nonexistent id is still a success with a
/// zero count. Interests are never cascaded.
///
/// # Errors
/// - 400 when the id does not parse as an ObjectId.
/// - 500 if the store delete fails.
pub(crate) async fn delete_crop(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<DeleteEnvelope>, ApiError> {
    let id = parse_object_id(&id)?;
    let result = state
        .store
        .delete_crop(id)
        .await
        .map_err(|err| api_internal("failed to delete crop", &err))?;
    Ok(Json(DeleteEnvelope {
        success: true,
        result,
    }))
}
