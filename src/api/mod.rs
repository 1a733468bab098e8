//! Marketplace HTTP API module.
//!
//! # Purpose
//! Exposes the route handler modules and shared error helpers.
pub mod crops;
pub mod error;
pub mod interests;
pub mod openapi;
pub mod system;
pub mod types;
