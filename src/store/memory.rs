//! In-memory implementation of the crop store.
//!
//! # Purpose
//! This store implements the `CropStore` trait entirely in memory using
//! `Vec`s guarded by `tokio::sync::RwLock`. It exists for:
//! - local development and tests (no external dependencies)
//! - an injectable fake behind the same trait as the MongoDB backend
//!
//! # Durability and consistency
//! - **Not durable**: all state is lost on process restart.
//! - **Single-process consistency**: reads take read locks, mutations take
//!   write locks, so the duplicate-interest check inside `insert_interest`
//!   is race-free within one process. This is stronger than the MongoDB
//!   backend's behavior, which relies on a unique index for the same guard.
//!
//! # Ordering
//! Crops are kept in insertion order; the full scan returns them as stored,
//! matching the natural-order scan of the durable backend.
use super::{CropStore, DeleteOutcome, InsertOutcome, StoreError, StoreResult};
use crate::model::Interest;
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{Bson, Document};
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory crop store.
///
/// Authoritative state lives in two `Vec`s wrapped in `Arc<RwLock<...>>` so
/// the store can be shared across async request handlers. Scans are linear,
/// which is acceptable for dev/test workloads.
#[derive(Default)]
pub struct InMemoryStore {
    /// Crop listing documents in insertion order; each carries its `_id`.
    crops: Arc<RwLock<Vec<Document>>>,
    /// Interest records in insertion order.
    interests: Arc<RwLock<Vec<Interest>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Millisecond timestamp of a listing's `created_at`, if it is a BSON
/// datetime. Listings without one sort as oldest.
fn created_at_millis(doc: &Document) -> Option<i64> {
    match doc.get("created_at") {
        Some(Bson::DateTime(value)) => Some(value.timestamp_millis()),
        _ => None,
    }
}

fn doc_id(doc: &Document) -> Option<ObjectId> {
    doc.get_object_id("_id").ok()
}

fn owner_email(doc: &Document) -> Option<&str> {
    doc.get_document("owner")
        .ok()
        .and_then(|owner| owner.get_str("ownerEmail").ok())
}

fn has_interest_from(doc: &Document, user_email: &str) -> bool {
    let Ok(entries) = doc.get_array("interests") else {
        return false;
    };
    entries.iter().any(|entry| {
        entry
            .as_document()
            .and_then(|interest| interest.get_str("userEmail").ok())
            == Some(user_email)
    })
}

#[async_trait]
impl CropStore for InMemoryStore {
    async fn list_crops(&self) -> StoreResult<Vec<Document>> {
        Ok(self.crops.read().await.clone())
    }

    async fn get_crop(&self, id: ObjectId) -> StoreResult<Option<Document>> {
        let crops = self.crops.read().await;
        Ok(crops.iter().find(|doc| doc_id(doc) == Some(id)).cloned())
    }

    async fn insert_crop(&self, crop: Document) -> StoreResult<InsertOutcome> {
        let id = ObjectId::new();
        let mut doc = Document::new();
        // Keep `_id` first, as the durable backend stores it.
        doc.insert("_id", id);
        doc.extend(crop);
        self.crops.write().await.push(doc);
        Ok(InsertOutcome { inserted_id: id })
    }

    async fn latest_crops(&self, limit: i64) -> StoreResult<Vec<Document>> {
        let crops = self.crops.read().await;
        let mut sorted: Vec<Document> = crops.clone();
        // Stable sort: listings without a creation timestamp keep their
        // stored order at the tail.
        sorted.sort_by_key(|doc| std::cmp::Reverse(created_at_millis(doc)));
        sorted.truncate(limit.max(0) as usize);
        Ok(sorted)
    }

    async fn crops_by_owner(&self, email: &str) -> StoreResult<Vec<Document>> {
        let crops = self.crops.read().await;
        Ok(crops
            .iter()
            .filter(|doc| owner_email(doc) == Some(email))
            .cloned()
            .collect())
    }

    async fn crops_with_interest_from(&self, user_email: &str) -> StoreResult<Vec<Document>> {
        let crops = self.crops.read().await;
        Ok(crops
            .iter()
            .filter(|doc| has_interest_from(doc, user_email))
            .cloned()
            .collect())
    }

    async fn search_crops_by_name(&self, text: &str) -> StoreResult<Vec<Document>> {
        let needle = text.to_lowercase();
        let crops = self.crops.read().await;
        Ok(crops
            .iter()
            .filter(|doc| {
                doc.get_str("name")
                    .map(|name| name.to_lowercase().contains(&needle))
                    .unwrap_or(false)
            })
            .cloned()
            .collect())
    }

    async fn delete_crop(&self, id: ObjectId) -> StoreResult<DeleteOutcome> {
        let mut crops = self.crops.write().await;
        let before = crops.len();
        crops.retain(|doc| doc_id(doc) != Some(id));
        Ok(DeleteOutcome {
            deleted_count: (before - crops.len()) as u64,
        })
    }

    async fn find_interest(
        &self,
        crop_id: ObjectId,
        user_email: &str,
    ) -> StoreResult<Option<Interest>> {
        let interests = self.interests.read().await;
        Ok(interests
            .iter()
            .find(|interest| interest.crop_id == crop_id && interest.user_email == user_email)
            .cloned())
    }

    async fn insert_interest(&self, interest: &Interest) -> StoreResult<InsertOutcome> {
        // Check-then-insert under one write lock, so two concurrent requests
        // for the same (crop, email) pair cannot both pass the check.
        let mut interests = self.interests.write().await;
        if interests.iter().any(|existing| {
            existing.crop_id == interest.crop_id && existing.user_email == interest.user_email
        }) {
            return Err(StoreError::Conflict("interest exists".into()));
        }
        let id = ObjectId::new();
        let mut record = interest.clone();
        record.id = Some(id);
        interests.push(record);
        Ok(InsertOutcome { inserted_id: id })
    }

    async fn append_crop_interest(
        &self,
        crop_id: ObjectId,
        interest: &Interest,
    ) -> StoreResult<()> {
        let snapshot = mongodb::bson::to_bson(interest)
            .map_err(|err| StoreError::Unexpected(err.into()))?;
        let mut crops = self.crops.write().await;
        let Some(doc) = crops.iter_mut().find(|doc| doc_id(doc) == Some(crop_id)) else {
            return Err(StoreError::NotFound("crop".into()));
        };
        match doc.get_array_mut("interests") {
            Ok(entries) => entries.push(snapshot),
            Err(_) => {
                doc.insert("interests", vec![snapshot]);
            }
        }
        Ok(())
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }

    fn is_durable(&self) -> bool {
        false
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
