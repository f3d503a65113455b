//! Signature check for protected routes
//!
//! Protected bodies are JSON objects that carry `timestamp` and `hash` next
//! to the request fields (see `audiofeed_common::api::auth`). The body is
//! buffered once, checked, and handed to the handler unchanged. With a
//! shared secret of 0 nothing is checked.

use audiofeed_common::api::auth::{validate_hash, validate_timestamp, ApiAuthError};
use axum::{
    body::{Body, Bytes},
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::AppState;

/// Largest body accepted on protected routes (transcripts included)
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// The two fields every signed body must carry
#[derive(Debug, Deserialize)]
struct Signature {
    timestamp: i64,
    hash: String,
}

/// Why a protected request was turned away
#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    #[error("Request body too large")]
    BodyTooLarge,
    #[error("Request body is not JSON: {0}")]
    NotJson(String),
    #[error("Request is not signed: {0}")]
    Unsigned(String),
    #[error("Stale or future timestamp: {0}")]
    Expired(String),
    #[error("Invalid hash")]
    BadHash,
    #[error("Signature check failed: {0}")]
    Internal(String),
}

impl SignatureError {
    fn status(&self) -> StatusCode {
        match self {
            SignatureError::BodyTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            SignatureError::NotJson(_) | SignatureError::Unsigned(_) => StatusCode::BAD_REQUEST,
            SignatureError::Expired(_) | SignatureError::BadHash => StatusCode::UNAUTHORIZED,
            SignatureError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for SignatureError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Check the signature on a buffered body
fn verify(body: &Bytes, shared_secret: i64) -> Result<(), SignatureError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| SignatureError::NotJson(e.to_string()))?;
    let signature = Signature::deserialize(&value).map_err(|e| SignatureError::Unsigned(e.to_string()))?;

    validate_timestamp(signature.timestamp).map_err(|e| match e {
        ApiAuthError::InvalidTimestamp { reason, .. } => SignatureError::Expired(reason),
        other => SignatureError::Internal(other.to_string()),
    })?;

    validate_hash(&signature.hash, &value, shared_secret).map_err(|e| match e {
        ApiAuthError::InvalidHash { provided, calculated } => {
            warn!("Hash mismatch: provided={} expected={}", provided, calculated);
            SignatureError::BadHash
        }
        other => SignatureError::Internal(other.to_string()),
    })
}

/// Middleware for the protected router
pub async fn auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, SignatureError> {
    if state.shared_secret == 0 {
        return Ok(next.run(request).await);
    }

    let (parts, body) = request.into_parts();
    let bytes = axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|_| SignatureError::BodyTooLarge)?;

    if let Err(e) = verify(&bytes, state.shared_secret) {
        warn!("Rejected {} {}: {}", parts.method, parts.uri.path(), e);
        return Err(e);
    }

    Ok(next.run(Request::from_parts(parts, Body::from(bytes))).await)
}
