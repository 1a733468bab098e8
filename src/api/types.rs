//! HTTP API request/response types.
//!
//! # Purpose
//! Defines the payload shapes of the marketplace REST API and the OpenAPI
//! schema for them. Listing reads keep the original wire contract: bare JSON
//! arrays for collection scans and a `{success, result}` envelope for
//! point operations.
use crate::store::{DeleteOutcome, InsertOutcome};
use mongodb::bson::{Bson, Document};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// `{success, result}` envelope for the single-listing lookup.
///
/// A miss is not a 404: `result` is `null` and `success` stays `true`.
#[derive(Debug, Serialize, ToSchema)]
pub struct CropEnvelope {
    pub success: bool,
    #[schema(value_type = Object, nullable)]
    pub result: Option<Document>,
}

/// `{success, result: {insertedId}}` envelope for listing creation.
#[derive(Debug, Serialize, ToSchema)]
pub struct InsertEnvelope {
    pub success: bool,
    pub result: InsertOutcome,
}

/// `{success, result: {deletedCount}}` envelope for listing deletion.
#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteEnvelope {
    pub success: bool,
    pub result: DeleteOutcome,
}

/// Body of `POST /interests/{id}`.
///
/// `quantity` is caller-typed and stored as given; `status` is a free string
/// with no enforced enumeration.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InterestCreateRequest {
    pub user_email: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default = "bson_null")]
    #[schema(value_type = Object)]
    pub quantity: Bson,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: String,
}

/// Success response of `POST /interests/{id}`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InterestCreatedResponse {
    pub success: bool,
    pub message: String,
    pub interest_result: InsertOutcome,
}

/// `{message}` body used by 401 responses.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// `{success:false, message}` body used by 400/500 responses.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FailureResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthStatus {
    pub status: String,
}

fn bson_null() -> Bson {
    Bson::Null
}
