//! Token verifier abstraction.
//!
//! # Purpose
//! Defines the `TokenVerifier` trait the auth gate delegates to, the verified
//! identity it yields, and the shared error taxonomy. Production wires in the
//! Firebase verifier; tests and local development use `StaticTokenVerifier`.
use async_trait::async_trait;
use thiserror::Error;

/// Identity claims derived from a verified bearer token.
///
/// Handlers currently use this only for gating; the fields are carried so an
/// ownership check can consume them without another verification pass.
#[derive(Debug, Clone)]
pub struct VerifiedIdentity {
    pub subject: String,
    pub email: Option<String>,
}

/// Errors returned during bearer-token verification.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("unsupported algorithm")]
    UnsupportedAlgorithm,
    #[error("missing key id")]
    MissingKeyId,
    #[error("signing key not found")]
    KeyNotFound,
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("jwt error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("invalid claim: {0}")]
    InvalidClaim(String),
    #[error("invalid token")]
    InvalidToken,
}

/// Single-attempt verification of an external bearer credential.
///
/// One call per request; the gate never retries.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, AuthError>;
}

/// Shared-secret verifier for local development and tests.
///
/// Accepts exactly one token value. Not for production use.
#[derive(Debug, Clone)]
pub struct StaticTokenVerifier {
    token: String,
}

impl StaticTokenVerifier {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenVerifier for StaticTokenVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, AuthError> {
        if token == self.token {
            Ok(VerifiedIdentity {
                subject: "static".to_string(),
                email: None,
            })
        } else {
            Err(AuthError::InvalidToken)
        }
    }
}
