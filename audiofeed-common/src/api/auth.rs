//! Signed request validation
//!
//! Mutating requests carry two extra JSON fields:
//! - `timestamp`: Unix epoch milliseconds, at most 1000ms old and 1ms ahead
//! - `hash`: SHA-256 (64 hex chars) of the canonical body with `hash`
//!   replaced by 64 zeros, followed by the shared secret in decimal
//!
//! The shared secret lives in the `settings` table under
//! `api_shared_secret`. A secret of 0 disables signature checking.
//!
//! This module has no HTTP framework dependencies; the server wraps it in
//! axum middleware.

use chrono::Utc;
use rand::Rng;
use serde_json::Value;
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use thiserror::Error;

/// Settings key holding the shared secret
pub const SHARED_SECRET_KEY: &str = "api_shared_secret";

/// Oldest acceptable timestamp relative to now
pub const MAX_PAST_SKEW_MS: i64 = 1000;

/// Furthest acceptable timestamp into the future (clock drift only)
pub const MAX_FUTURE_SKEW_MS: i64 = 1;

const ZERO_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

#[derive(Error, Debug, Clone)]
pub enum ApiAuthError {
    #[error("Invalid timestamp: {reason}")]
    InvalidTimestamp { timestamp: i64, now: i64, reason: String },

    #[error("Invalid hash")]
    InvalidHash { provided: String, calculated: String },

    #[error("Database error: {0}")]
    DatabaseError(String),
}

// ========================================
// Shared Secret Management
// ========================================

/// Load the shared secret, generating one on first use
pub async fn load_shared_secret(db: &SqlitePool) -> Result<i64, ApiAuthError> {
    let stored: Option<(Option<String>,)> =
        sqlx::query_as("SELECT value FROM settings WHERE key = ?")
            .bind(SHARED_SECRET_KEY)
            .fetch_optional(db)
            .await
            .map_err(|e| ApiAuthError::DatabaseError(e.to_string()))?;

    match stored {
        Some((Some(value),)) => value
            .trim()
            .parse::<i64>()
            .map_err(|e| ApiAuthError::DatabaseError(format!("Invalid i64 secret: {}", e))),
        _ => initialize_shared_secret(db).await,
    }
}

/// Generate and store a random non-zero secret
pub async fn initialize_shared_secret(db: &SqlitePool) -> Result<i64, ApiAuthError> {
    let secret: i64 = {
        let mut rng = rand::thread_rng();
        loop {
            let candidate = rng.gen::<i64>();
            if candidate != 0 {
                break candidate;
            }
        }
    };

    store_shared_secret(db, secret).await?;
    Ok(secret)
}

/// Overwrite the shared secret (0 disables signature checking)
pub async fn store_shared_secret(db: &SqlitePool, secret: i64) -> Result<(), ApiAuthError> {
    sqlx::query("INSERT OR REPLACE INTO settings (key, value) VALUES (?, ?)")
        .bind(SHARED_SECRET_KEY)
        .bind(secret.to_string())
        .execute(db)
        .await
        .map_err(|e| ApiAuthError::DatabaseError(e.to_string()))?;

    Ok(())
}

// ========================================
// Timestamp Validation
// ========================================

/// Current time in epoch milliseconds
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Validate a request timestamp against the current clock
///
/// ```
/// use audiofeed_common::api::auth::{now_millis, validate_timestamp};
///
/// let now = now_millis();
/// assert!(validate_timestamp(now - 500).is_ok());
/// assert!(validate_timestamp(now - 5000).is_err());
/// ```
pub fn validate_timestamp(timestamp: i64) -> Result<(), ApiAuthError> {
    validate_timestamp_at(timestamp, now_millis())
}

/// Validate a timestamp against an explicit `now`
pub fn validate_timestamp_at(timestamp: i64, now: i64) -> Result<(), ApiAuthError> {
    let age = now - timestamp;

    if age > MAX_PAST_SKEW_MS {
        return Err(ApiAuthError::InvalidTimestamp {
            timestamp,
            now,
            reason: format!("Timestamp {}ms too old (max {}ms past)", age, MAX_PAST_SKEW_MS),
        });
    }

    if -age > MAX_FUTURE_SKEW_MS {
        return Err(ApiAuthError::InvalidTimestamp {
            timestamp,
            now,
            reason: format!(
                "Timestamp {}ms in future (max {}ms future)",
                -age, MAX_FUTURE_SKEW_MS
            ),
        });
    }

    Ok(())
}

// ========================================
// Hash Calculation and Validation
// ========================================

/// Calculate the request hash for a JSON body
///
/// ```
/// use audiofeed_common::api::auth::calculate_hash;
/// use serde_json::json;
///
/// let body = json!({"audio_id": "a1", "timestamp": 1730000000000i64, "hash": ""});
/// assert_eq!(calculate_hash(&body, 42).len(), 64);
/// ```
pub fn calculate_hash(body: &Value, shared_secret: i64) -> String {
    let mut value = body.clone();
    if let Some(obj) = value.as_object_mut() {
        obj.insert("hash".to_string(), Value::String(ZERO_HASH.to_string()));
    }

    let mut hasher = Sha256::new();
    hasher.update(to_canonical_json(&value).as_bytes());
    hasher.update(shared_secret.to_string().as_bytes());

    format!("{:x}", hasher.finalize())
}

/// Serialize JSON with sorted object keys and no whitespace
pub fn to_canonical_json(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let mut pairs: Vec<_> = map.iter().collect();
            pairs.sort_by_key(|(k, _)| *k);
            let items: Vec<String> = pairs
                .into_iter()
                .map(|(k, v)| format!("{}:{}", Value::String(k.clone()), to_canonical_json(v)))
                .collect();
            format!("{{{}}}", items.join(","))
        }
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(to_canonical_json).collect();
            format!("[{}]", items.join(","))
        }
        // serde_json escapes scalars consistently
        other => other.to_string(),
    }
}

/// Compare a provided hash against the calculated one
pub fn validate_hash(provided: &str, body: &Value, shared_secret: i64) -> Result<(), ApiAuthError> {
    let calculated = calculate_hash(body, shared_secret);

    if !provided.eq_ignore_ascii_case(&calculated) {
        return Err(ApiAuthError::InvalidHash {
            provided: provided.to_string(),
            calculated,
        });
    }

    Ok(())
}

/// Stamp `timestamp` and `hash` onto a JSON object body
///
/// Client-side counterpart of [`validate_timestamp`] + [`validate_hash`].
pub fn sign_body(body: &mut Value, shared_secret: i64, timestamp: i64) {
    if let Some(obj) = body.as_object_mut() {
        obj.insert("timestamp".to_string(), Value::from(timestamp));
        obj.insert("hash".to_string(), Value::String(ZERO_HASH.to_string()));
    }
    let hash = calculate_hash(body, shared_secret);
    if let Some(obj) = body.as_object_mut() {
        obj.insert("hash".to_string(), Value::String(hash));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_timestamp_window() {
        let now = 1_730_000_000_000;
        assert!(validate_timestamp_at(now, now).is_ok());
        assert!(validate_timestamp_at(now - 1000, now).is_ok());
        assert!(validate_timestamp_at(now + 1, now).is_ok());

        assert!(validate_timestamp_at(now - 1001, now).is_err());
        assert!(validate_timestamp_at(now + 2, now).is_err());
    }

    #[test]
    fn test_timestamp_error_reason() {
        let now = 1_730_000_000_000;
        match validate_timestamp_at(now - 5000, now) {
            Err(ApiAuthError::InvalidTimestamp { reason, .. }) => {
                assert!(reason.contains("too old"));
            }
            other => panic!("expected InvalidTimestamp, got {:?}", other),
        }
    }

    #[test]
    fn test_hash_ignores_existing_hash_field() {
        let a = json!({"audio_id": "a1", "timestamp": 1, "hash": "whatever"});
        let b = json!({"audio_id": "a1", "timestamp": 1, "hash": "something else"});
        assert_eq!(calculate_hash(&a, 7), calculate_hash(&b, 7));
        assert_ne!(calculate_hash(&a, 7), calculate_hash(&a, 8));
    }

    #[test]
    fn test_canonical_json_sorted_and_compact() {
        let value = json!({"z": 1, "a": {"y": [1, 2], "b": "q\"uote"}, "m": null});
        assert_eq!(
            to_canonical_json(&value),
            r#"{"a":{"b":"q\"uote","y":[1,2]},"m":null,"z":1}"#
        );
    }

    #[test]
    fn test_sign_body_round_trip() {
        let mut body = json!({"wallet_address": "0xabc", "audio_id": "a1"});
        sign_body(&mut body, 12345, 1_730_000_000_000);

        let hash = body["hash"].as_str().unwrap().to_string();
        assert!(validate_hash(&hash, &body, 12345).is_ok());
        assert!(validate_hash(&hash, &body, 54321).is_err());

        body["audio_id"] = json!("a2");
        assert!(validate_hash(&hash, &body, 12345).is_err());
    }
}
