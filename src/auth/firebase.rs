//! Firebase ID token verification with cached JWKS fetching.
//!
//! # Purpose
//! Validate inbound Firebase bearer tokens (RS256 JWTs minted by the Google
//! secure-token service) against the published signing keys, with a TTL-bound
//! JWKS cache so steady-state verification needs no network round trip.
//!
//! # Key invariants
//! - Only RS256 is accepted; Firebase signs all ID tokens with it.
//! - Issuer and audience are pinned to the configured project.
//! - JWKS is cached with a TTL and refreshed once on a key-id miss to handle
//!   rotation.
//!
//! # Concurrency model
//! The cache is a `DashMap` shared across async tasks; concurrent refreshes
//! are harmless (last write wins).
//!
//! # Security boundary
//! This module is the boundary between external credentials and the service.
//! Claims are only trusted after signature verification; error values never
//! carry token contents.
use crate::auth::verifier::{AuthError, TokenVerifier, VerifiedIdentity};
use async_trait::async_trait;
use dashmap::DashMap;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// JWKS endpoint for the Google secure-token signing keys.
const FIREBASE_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwks/securetoken@system.gserviceaccount.com";

/// Verifier for Firebase ID tokens.
///
/// Construct with [`FirebaseTokenVerifier::new`] and the Firebase project id;
/// the expected issuer and audience are derived from it.
#[derive(Debug, Clone)]
pub struct FirebaseTokenVerifier {
    client: reqwest::Client,
    project_id: String,
    issuer: String,
    jwks_url: String,
    jwks_cache: Arc<DashMap<String, CachedJwks>>,
    jwks_ttl: Duration,
    clock_skew_seconds: u64,
}

#[derive(Debug, Clone)]
struct CachedJwks {
    jwks: JwkSet,
    expires_at: Instant,
}

impl FirebaseTokenVerifier {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self::with_jwks_url(project_id, FIREBASE_JWKS_URL)
    }

    /// Override the JWKS endpoint; used by tests that stub the key server.
    pub fn with_jwks_url(project_id: impl Into<String>, jwks_url: impl Into<String>) -> Self {
        let project_id = project_id.into();
        Self {
            client: reqwest::Client::new(),
            issuer: format!("https://securetoken.google.com/{project_id}"),
            project_id,
            jwks_url: jwks_url.into(),
            jwks_cache: Arc::new(DashMap::new()),
            jwks_ttl: Duration::from_secs(3600),
            clock_skew_seconds: 60,
        }
    }

    async fn verify_token(&self, token: &str) -> Result<VerifiedIdentity, AuthError> {
        // Check the header algorithm before any network work.
        let header = decode_header(token)?;
        if header.alg != Algorithm::RS256 {
            return Err(AuthError::UnsupportedAlgorithm);
        }
        let kid = header.kid.as_deref().ok_or(AuthError::MissingKeyId)?;

        // Resolve the signing key, refreshing once on a miss to cover rotation.
        let jwks = self.get_jwks().await?;
        let decoding_key = match find_jwk(&jwks, kid) {
            Some(key) => DecodingKey::from_jwk(key)?,
            None => {
                let refreshed = self.refresh_jwks().await?;
                let key = find_jwk(&refreshed, kid).ok_or(AuthError::KeyNotFound)?;
                DecodingKey::from_jwk(key)?
            }
        };

        // Issuer and audience are pinned to the configured project.
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_audience(&[self.project_id.as_str()]);
        validation
            .required_spec_claims
            .extend(["iss".to_string(), "aud".to_string()]);
        validation.leeway = self.clock_skew_seconds;

        let token = decode::<Value>(token, &decoding_key, &validation)?;
        let subject = token
            .claims
            .get("sub")
            .and_then(Value::as_str)
            .filter(|sub| !sub.is_empty())
            .ok_or_else(|| AuthError::InvalidClaim("sub".to_string()))?
            .to_string();
        let email = token
            .claims
            .get("email")
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(VerifiedIdentity { subject, email })
    }

    async fn get_jwks(&self) -> Result<JwkSet, AuthError> {
        if let Some(entry) = self.jwks_cache.get(&self.jwks_url) {
            if entry.expires_at > Instant::now() {
                return Ok(entry.jwks.clone());
            }
        }
        self.refresh_jwks().await
    }

    async fn refresh_jwks(&self) -> Result<JwkSet, AuthError> {
        let jwks: JwkSet = self.client.get(&self.jwks_url).send().await?.json().await?;
        self.jwks_cache.insert(
            self.jwks_url.clone(),
            CachedJwks {
                jwks: jwks.clone(),
                expires_at: Instant::now() + self.jwks_ttl,
            },
        );
        Ok(jwks)
    }
}

fn find_jwk<'a>(jwks: &'a JwkSet, kid: &str) -> Option<&'a jsonwebtoken::jwk::Jwk> {
    jwks.keys
        .iter()
        .find(|key| key.common.key_id.as_deref() == Some(kid))
}

#[async_trait]
impl TokenVerifier for FirebaseTokenVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, AuthError> {
        self.verify_token(token).await
    }
}
