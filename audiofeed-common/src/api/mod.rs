//! Shared HTTP API primitives
//!
//! Pure functions and database helpers only; the server wraps these with
//! axum middleware.

pub mod auth;

pub use auth::{
    calculate_hash, initialize_shared_secret, load_shared_secret, sign_body, validate_hash,
    validate_timestamp, ApiAuthError,
};
