//! Shared helpers for audiofeed-server integration tests

#![allow(dead_code)]

use std::sync::Arc;

use audiofeed_common::db::init::init_database;
use audiofeed_common::feed::{FixedRandom, RandomSource};
use audiofeed_common::models::{AudioItem, Language, Style};
use audiofeed_server::db::audios::{self, NewAudio};
use audiofeed_server::{build_router, AppState};
use axum::{
    body::Body,
    http::{Request, Response},
};
use serde_json::Value;
use sqlx::SqlitePool;
use tempfile::TempDir;

pub const FRONTEND: &str = "https://feed.example";
pub const ADMIN_WALLET: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
pub const VIEWER_WALLET: &str = "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";

/// Temp database; keep the TempDir alive for the test's duration
pub async fn setup_test_db() -> (TempDir, SqlitePool) {
    let dir = TempDir::new().expect("temp dir");
    let pool = init_database(&dir.path().join("audiofeed.db"))
        .await
        .expect("Should initialize test database");
    (dir, pool)
}

/// Router with signing disabled and a fixed feed cut point
pub fn setup_app(db: SqlitePool, cut: f64) -> axum::Router {
    setup_app_with_secret(db, cut, 0)
}

pub fn setup_app_with_secret(db: SqlitePool, cut: f64, shared_secret: i64) -> axum::Router {
    let random: Arc<dyn RandomSource> = Arc::new(FixedRandom::new(cut));
    build_router(AppState::with_random(db, shared_secret, FRONTEND, random))
}

/// Insert an item with a chosen `random_id`
pub async fn seed_audio(
    db: &SqlitePool,
    language: Language,
    style: Option<Style>,
    random_id: f64,
) -> AudioItem {
    audios::insert(
        db,
        NewAudio {
            url: format!("https://cdn.example/{}.mp3", random_id),
            transcript: "1\n00:00:00,000 --> 00:00:03,000\nBreathe in.\n".to_string(),
            style,
            language,
        },
        random_id,
    )
    .await
    .expect("seed audio")
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

pub async fn extract_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

pub fn ids(body: &Value) -> Vec<String> {
    body.as_array()
        .expect("array body")
        .iter()
        .map(|item| item["id"].as_str().unwrap().to_string())
        .collect()
}
