//! Interest model definition.
//!
//! # Purpose
//! Defines the buyer-interest document stored in the `interests` collection
//! and embedded, denormalized, inside the parent crop listing.
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{Bson, DateTime};
use serde::{Deserialize, Serialize};

/// A buyer's expressed interest in a crop listing.
///
/// Wire and storage field names are camelCase (`cropId`, `userEmail`, ...)
/// to match the persisted layout. `id` is `None` until the store assigns one
/// on insert; the copy embedded in the listing always carries the assigned id.
///
/// At most one interest may exist per (`crop_id`, `user_email`) pair. The
/// store backends enforce this; see `store::CropStore::insert_interest`.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Interest {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub crop_id: ObjectId,
    pub user_email: String,
    #[serde(default)]
    pub user_name: String,
    /// Caller-typed quantity, stored as given (number or string).
    #[serde(default = "bson_null")]
    pub quantity: Bson,
    #[serde(default)]
    pub message: String,
    /// Free-form status string; no enforced enumeration.
    #[serde(default)]
    pub status: String,
    /// Server-assigned at insert time.
    pub created_at: DateTime,
}

fn bson_null() -> Bson {
    Bson::Null
}
