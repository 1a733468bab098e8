//! API error types and helpers.
//!
//! # Purpose and responsibility
//! Centralizes HTTP error response construction so the two error body shapes
//! the API uses stay uniform: `{message}` for 401s and
//! `{success:false, message}` for client/server failures.
//!
//! # Key invariants and assumptions
//! - Status codes must align with the error category.
//! - Store failures log details server-side but return a generic message.
use crate::api::types::{FailureResponse, MessageResponse};
use crate::store::StoreError;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

pub(crate) const DUPLICATE_INTEREST_MESSAGE: &str =
    "You already submitted interest for this crop.";
pub(crate) const SERVER_ERROR_MESSAGE: &str = "Server Error";

/// Structured API error returned by handlers.
///
/// Couples an HTTP status code with one of the two JSON error bodies and
/// implements `IntoResponse` for Axum.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ErrorBody {
    Message(MessageResponse),
    Failure(FailureResponse),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Build a 401 Unauthorized error with a `{message}` body.
pub fn api_unauthorized(message: &str) -> ApiError {
    ApiError {
        status: StatusCode::UNAUTHORIZED,
        body: ErrorBody::Message(MessageResponse {
            message: message.to_string(),
        }),
    }
}

/// Build a 400 Bad Request for a path id that does not parse as an ObjectId.
pub fn api_invalid_identifier() -> ApiError {
    ApiError {
        status: StatusCode::BAD_REQUEST,
        body: ErrorBody::Failure(FailureResponse {
            success: false,
            message: "invalid crop id".to_string(),
        }),
    }
}

/// Build the 400 duplicate-interest business conflict.
pub fn api_duplicate_interest() -> ApiError {
    ApiError {
        status: StatusCode::BAD_REQUEST,
        body: ErrorBody::Failure(FailureResponse {
            success: false,
            message: DUPLICATE_INTEREST_MESSAGE.to_string(),
        }),
    }
}

/// Build a 500 Internal Server Error from a store error.
///
/// Logs the store error server-side; the client sees only a generic message.
pub fn api_internal(context: &str, err: &StoreError) -> ApiError {
    tracing::error!(error = ?err, "{context}");
    ApiError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        body: ErrorBody::Failure(FailureResponse {
            success: false,
            message: SERVER_ERROR_MESSAGE.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_uses_message_only_body() {
        let err = api_unauthorized("nope");
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        let body = serde_json::to_value(&err.body).expect("json");
        assert_eq!(body, serde_json::json!({ "message": "nope" }));
    }

    #[test]
    fn invalid_identifier_is_structured_bad_request() {
        let err = api_invalid_identifier();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        let body = serde_json::to_value(&err.body).expect("json");
        assert_eq!(body["success"], serde_json::json!(false));
    }

    #[test]
    fn duplicate_interest_carries_business_message() {
        let err = api_duplicate_interest();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        let body = serde_json::to_value(&err.body).expect("json");
        assert_eq!(body["message"], DUPLICATE_INTEREST_MESSAGE);
    }

    #[test]
    fn internal_wraps_store_error_with_generic_message() {
        let err = api_internal(
            "storage failed",
            &StoreError::Unexpected(anyhow::anyhow!("boom")),
        );
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        let body = serde_json::to_value(&err.body).expect("json");
        assert_eq!(body["message"], SERVER_ERROR_MESSAGE);
    }
}
