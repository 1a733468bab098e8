//! Storage abstraction over the crop and interest collections.
//!
//! # Purpose
//! Defines the `CropStore` trait consumed by every HTTP handler, plus the
//! outcome types and error taxonomy shared by the in-memory and MongoDB
//! backends. Handlers never hold a concrete backend; they receive an
//! `Arc<dyn CropStore>` through application state so tests can substitute
//! the in-memory implementation.
use crate::model::Interest;
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::Document;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

pub mod memory;
pub mod mongo;

/// Outcome of a single-document insert.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InsertOutcome {
    /// Store-assigned identifier, rendered as a hex string.
    #[serde(serialize_with = "mongodb::bson::serde_helpers::serialize_object_id_as_hex_string")]
    #[schema(value_type = String)]
    pub inserted_id: ObjectId,
}

/// Outcome of a single-document delete; `deleted_count` is 0 or 1.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOutcome {
    pub deleted_count: u64,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Operations the HTTP layer needs over the two collections.
///
/// Crop listings are schema-free `Document`s; interests are typed. Each
/// method maps to one store round trip and is atomic on its own, but the
/// trait offers no multi-operation transactions: the interest insert and the
/// subsequent `append_crop_interest` are two independent writes, and a
/// failure between them leaves the embedded copy behind the collection of
/// record (accepted; see the interest handler).
#[async_trait]
pub trait CropStore: Send + Sync {
    /// Full scan of the crop collection in stored order.
    async fn list_crops(&self) -> StoreResult<Vec<Document>>;
    /// Point lookup by id; `Ok(None)` when no listing matches.
    async fn get_crop(&self, id: ObjectId) -> StoreResult<Option<Document>>;
    /// Insert a caller-supplied listing document as-is and assign an id.
    async fn insert_crop(&self, crop: Document) -> StoreResult<InsertOutcome>;
    /// Most recent listings by `created_at` descending, at most `limit`.
    async fn latest_crops(&self, limit: i64) -> StoreResult<Vec<Document>>;
    /// Listings whose `owner.ownerEmail` matches exactly.
    async fn crops_by_owner(&self, owner_email: &str) -> StoreResult<Vec<Document>>;
    /// Listings with at least one embedded interest from `user_email`.
    ///
    /// Queries the denormalized `interests` array inside listings, not the
    /// interest collection.
    async fn crops_with_interest_from(&self, user_email: &str) -> StoreResult<Vec<Document>>;
    /// Case-insensitive substring match against the listing `name` field.
    /// The input is treated as literal text, never as a pattern.
    async fn search_crops_by_name(&self, text: &str) -> StoreResult<Vec<Document>>;
    /// Delete a listing by id. Deleting a nonexistent id is not an error;
    /// the outcome reports a zero count.
    async fn delete_crop(&self, id: ObjectId) -> StoreResult<DeleteOutcome>;

    /// Existing interest for (`crop_id`, `user_email`), if any.
    async fn find_interest(
        &self,
        crop_id: ObjectId,
        user_email: &str,
    ) -> StoreResult<Option<Interest>>;
    /// Insert an interest record.
    ///
    /// Returns `StoreError::Conflict` when an interest for the same
    /// (`crop_id`, `user_email`) pair already exists. This is the
    /// authoritative duplicate guard; callers may pre-check with
    /// `find_interest` for a friendlier error path, but only this method is
    /// race-free.
    async fn insert_interest(&self, interest: &Interest) -> StoreResult<InsertOutcome>;
    /// Append a denormalized interest snapshot to the parent listing's
    /// `interests` array in a single atomic update keyed by listing id.
    async fn append_crop_interest(&self, crop_id: ObjectId, interest: &Interest)
        -> StoreResult<()>;

    async fn health_check(&self) -> StoreResult<()>;
    fn is_durable(&self) -> bool;
    fn backend_name(&self) -> &'static str;
}
