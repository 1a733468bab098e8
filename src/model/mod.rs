//! Croplink data model module.
//!
//! # Purpose
//! Re-exports the typed interest document shared by the API and store layers.
//! Crop listings themselves are schema-free `bson::Document`s; only the fields
//! the service itself reads (`name`, `owner.ownerEmail`, `created_at`,
//! `interests`) are fixed by convention.
mod interest;

pub use interest::Interest;
