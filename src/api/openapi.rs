//! OpenAPI schema aggregation for the marketplace API.
//!
//! # Purpose
//! Collects all routes and schema types into a single OpenAPI document for
//! docs and client generation.
use crate::api::{
    crops, interests, system,
    types::{
        CropEnvelope, DeleteEnvelope, FailureResponse, HealthStatus, InsertEnvelope,
        InterestCreateRequest, InterestCreatedResponse, MessageResponse,
    },
};
use crate::store::{DeleteOutcome, InsertOutcome};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "croplink",
        version = "v1",
        description = "Crop listing marketplace HTTP API"
    ),
    paths(
        system::root,
        system::health,
        crops::list_crops,
        crops::get_crop,
        crops::create_crop,
        crops::latest_crops,
        crops::my_posts,
        crops::search_crops,
        crops::delete_crop,
        interests::create_interest,
        interests::my_interests
    ),
    components(schemas(
        CropEnvelope,
        InsertEnvelope,
        DeleteEnvelope,
        InsertOutcome,
        DeleteOutcome,
        InterestCreateRequest,
        InterestCreatedResponse,
        MessageResponse,
        FailureResponse,
        HealthStatus
    )),
    tags(
        (name = "system", description = "Liveness and health endpoints"),
        (name = "crops", description = "Crop listing management"),
        (name = "interests", description = "Buyer interest management")
    )
)]
pub struct ApiDoc;
