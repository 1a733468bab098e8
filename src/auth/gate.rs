//! Bearer-token gate for protected handlers.
//!
//! # Purpose
//! Extracts the `Authorization: Bearer <token>` credential and delegates a
//! single verification attempt to the configured `TokenVerifier`. Protected
//! handlers call [`require_identity`] before touching the store, so an
//! unauthenticated request is rejected without any store access.
use crate::api::error::{api_unauthorized, ApiError};
use crate::app::AppState;
use crate::auth::verifier::VerifiedIdentity;
use axum::http::HeaderMap;

/// Gate a request on a valid bearer credential.
///
/// # Errors
/// - 401 with `{message}` when the header is absent.
/// - 401 with `{message}` when verification fails (expired, malformed,
///   revoked). No retries; one verification call per request.
pub async fn require_identity(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<VerifiedIdentity, ApiError> {
    let bearer = extract_bearer(headers)
        .ok_or_else(|| api_unauthorized("unauthorized access. Token not found!"))?;
    state
        .verifier
        .verify(bearer)
        .await
        .map_err(|err| {
            tracing::debug!(error = %err, "bearer token rejected");
            api_unauthorized("Unauthorized access")
        })
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(axum::http::header::AUTHORIZATION)?;
    let value = value.to_str().ok()?;
    value.strip_prefix("Bearer ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::AUTHORIZATION;

    #[test]
    fn extract_bearer_requires_scheme_prefix() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, "Bearer abc123".parse().expect("header"));
        assert_eq!(extract_bearer(&headers), Some("abc123"));

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, "Basic abc123".parse().expect("header"));
        assert_eq!(extract_bearer(&headers), None);

        assert_eq!(extract_bearer(&HeaderMap::new()), None);
    }
}
