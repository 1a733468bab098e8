//! MongoDB-backed implementation of the crop store.
//!
//! # What this module is
//! Implements the `CropStore` trait over two collections, `crops` and
//! `interests`, in the configured database. Crops are stored exactly as the
//! caller supplied them (schema-free documents); interests are typed.
//!
//! # Key invariants
//! - A unique compound index on `(cropId, userEmail)` in the `interests`
//!   collection is created at connect time. A duplicate-key write maps to
//!   `StoreError::Conflict`, which is the authoritative duplicate-interest
//!   signal; the service-layer pre-check exists only for the friendly error
//!   path and is inherently racy on its own.
//! - Each method is a single driver call and therefore atomic per document.
//!   There is no transactional coupling between the interest insert and the
//!   `$push` into the parent listing; a failure between the two leaves the
//!   embedded copy lagging the collection of record.
//!
//! # Concurrency model
//! One `Client` is shared across async handlers; the driver multiplexes
//! operations over its own connection pool.
//!
//! # Security notes
//! - Connection URLs may contain credentials; they are never logged.
//! - Search input is escaped before it is used in a `$regex` filter, so user
//!   text is matched literally.
use super::{CropStore, DeleteOutcome, InsertOutcome, StoreError, StoreResult};
use crate::config::MongoConfig;
use crate::model::Interest;
use anyhow::Context;
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{doc, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::IndexOptions;
use mongodb::{Client, Collection, IndexModel};

const CROPS_COLLECTION: &str = "crops";
const INTERESTS_COLLECTION: &str = "interests";

/// MongoDB duplicate-key error code.
const DUPLICATE_KEY: i32 = 11000;

/// Durable crop store backed by MongoDB.
pub struct MongoStore {
    crops: Collection<Document>,
    interests: Collection<Interest>,
    database: mongodb::Database,
}

impl MongoStore {
    /// Connect to MongoDB and prepare the collections.
    ///
    /// Creates the unique `(cropId, userEmail)` index on the interests
    /// collection so the duplicate-interest invariant holds under concurrent
    /// requests, not just sequential ones.
    pub async fn connect(config: &MongoConfig) -> anyhow::Result<Self> {
        let client = Client::with_uri_str(&config.url)
            .await
            .with_context(|| "connect to mongodb")?;
        let database = client.database(&config.database);
        let crops = database.collection::<Document>(CROPS_COLLECTION);
        let interests = database.collection::<Interest>(INTERESTS_COLLECTION);

        let index = IndexModel::builder()
            .keys(doc! { "cropId": 1, "userEmail": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        interests
            .create_index(index)
            .await
            .with_context(|| "create unique interest index")?;

        Ok(Self {
            crops,
            interests,
            database,
        })
    }
}

fn unexpected(err: mongodb::error::Error) -> StoreError {
    StoreError::Unexpected(err.into())
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match &*err.kind {
        ErrorKind::Write(WriteFailure::WriteError(write)) => write.code == DUPLICATE_KEY,
        _ => false,
    }
}

/// Escape regex metacharacters so user search input matches literally.
fn escape_regex(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(
            ch,
            '.' | '^' | '$' | '*' | '+' | '?' | '(' | ')' | '[' | ']' | '{' | '}' | '|' | '\\'
                | '/' | '-'
        ) {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[async_trait]
impl CropStore for MongoStore {
    async fn list_crops(&self) -> StoreResult<Vec<Document>> {
        let cursor = self.crops.find(doc! {}).await.map_err(unexpected)?;
        cursor.try_collect().await.map_err(unexpected)
    }

    async fn get_crop(&self, id: ObjectId) -> StoreResult<Option<Document>> {
        self.crops
            .find_one(doc! { "_id": id })
            .await
            .map_err(unexpected)
    }

    async fn insert_crop(&self, crop: Document) -> StoreResult<InsertOutcome> {
        let result = self.crops.insert_one(crop).await.map_err(unexpected)?;
        let inserted_id = result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| StoreError::Unexpected(anyhow::anyhow!("non-ObjectId insert result")))?;
        Ok(InsertOutcome { inserted_id })
    }

    async fn latest_crops(&self, limit: i64) -> StoreResult<Vec<Document>> {
        let cursor = self
            .crops
            .find(doc! {})
            .sort(doc! { "created_at": -1 })
            .limit(limit)
            .await
            .map_err(unexpected)?;
        cursor.try_collect().await.map_err(unexpected)
    }

    async fn crops_by_owner(&self, owner_email: &str) -> StoreResult<Vec<Document>> {
        let cursor = self
            .crops
            .find(doc! { "owner.ownerEmail": owner_email })
            .await
            .map_err(unexpected)?;
        cursor.try_collect().await.map_err(unexpected)
    }

    async fn crops_with_interest_from(&self, user_email: &str) -> StoreResult<Vec<Document>> {
        let cursor = self
            .crops
            .find(doc! { "interests.userEmail": user_email })
            .await
            .map_err(unexpected)?;
        cursor.try_collect().await.map_err(unexpected)
    }

    async fn search_crops_by_name(&self, text: &str) -> StoreResult<Vec<Document>> {
        let pattern = escape_regex(text);
        let cursor = self
            .crops
            .find(doc! { "name": { "$regex": pattern, "$options": "i" } })
            .await
            .map_err(unexpected)?;
        cursor.try_collect().await.map_err(unexpected)
    }

    async fn delete_crop(&self, id: ObjectId) -> StoreResult<DeleteOutcome> {
        let result = self
            .crops
            .delete_one(doc! { "_id": id })
            .await
            .map_err(unexpected)?;
        Ok(DeleteOutcome {
            deleted_count: result.deleted_count,
        })
    }

    async fn find_interest(
        &self,
        crop_id: ObjectId,
        user_email: &str,
    ) -> StoreResult<Option<Interest>> {
        self.interests
            .find_one(doc! { "cropId": crop_id, "userEmail": user_email })
            .await
            .map_err(unexpected)
    }

    async fn insert_interest(&self, interest: &Interest) -> StoreResult<InsertOutcome> {
        let result = match self.interests.insert_one(interest).await {
            Ok(result) => result,
            Err(err) if is_duplicate_key(&err) => {
                return Err(StoreError::Conflict("interest exists".into()));
            }
            Err(err) => return Err(unexpected(err)),
        };
        let inserted_id = result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| StoreError::Unexpected(anyhow::anyhow!("non-ObjectId insert result")))?;
        Ok(InsertOutcome { inserted_id })
    }

    async fn append_crop_interest(
        &self,
        crop_id: ObjectId,
        interest: &Interest,
    ) -> StoreResult<()> {
        let snapshot = mongodb::bson::to_bson(interest)
            .map_err(|err| StoreError::Unexpected(err.into()))?;
        let result = self
            .crops
            .update_one(
                doc! { "_id": crop_id },
                doc! { "$push": { "interests": snapshot } },
            )
            .await
            .map_err(unexpected)?;
        if result.matched_count == 0 {
            return Err(StoreError::NotFound("crop".into()));
        }
        Ok(())
    }

    async fn health_check(&self) -> StoreResult<()> {
        self.database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    fn is_durable(&self) -> bool {
        true
    }

    fn backend_name(&self) -> &'static str {
        "mongodb"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_regex_neutralizes_metacharacters() {
        assert_eq!(escape_regex("wheat"), "wheat");
        assert_eq!(escape_regex(".*"), "\\.\\*");
        assert_eq!(escape_regex("a+b(c)"), "a\\+b\\(c\\)");
        assert_eq!(escape_regex("x|y"), "x\\|y");
    }
}
