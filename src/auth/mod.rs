//! Authentication modules.
//!
//! # Purpose
//! Groups the bearer-token gate used by protected handlers and the token
//! verifier implementations (Firebase for production, static for dev/tests).
pub mod firebase;
pub mod gate;
pub mod verifier;
