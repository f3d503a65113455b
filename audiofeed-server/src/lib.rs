//! audiofeed-server library
//!
//! REST layer over the audio feed: random feed sampling, admin audio
//! creation, favorites, shares, listening history and comments.

use std::sync::Arc;

use audiofeed_common::feed::{FeedSampler, RandomSource, SqliteFeedStore, ThreadRandom};
use axum::http::{header, HeaderValue, Method};
use axum::Router;
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

pub mod api;
pub mod db;

/// Feed sampler as wired into the server
pub type Sampler = FeedSampler<SqliteFeedStore, Arc<dyn RandomSource>>;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Shared secret for request signing (0 disables checking)
    pub shared_secret: i64,
    /// Base URL used to build share links
    pub frontend_url: String,
    /// Source for cut points and new `random_id` keys
    pub random: Arc<dyn RandomSource>,
    pub sampler: Arc<Sampler>,
}

impl AppState {
    /// Create new application state backed by the thread RNG
    pub fn new(db: SqlitePool, shared_secret: i64, frontend_url: impl Into<String>) -> Self {
        Self::with_random(db, shared_secret, frontend_url, Arc::new(ThreadRandom))
    }

    /// Create application state with an explicit random source
    pub fn with_random(
        db: SqlitePool,
        shared_secret: i64,
        frontend_url: impl Into<String>,
        random: Arc<dyn RandomSource>,
    ) -> Self {
        let sampler = FeedSampler::new(SqliteFeedStore::new(db.clone()), random.clone());
        Self {
            db,
            shared_secret,
            frontend_url: frontend_url.into(),
            random,
            sampler: Arc::new(sampler),
        }
    }
}

/// Build application router
///
/// Mutating and per-user routes sit behind the signature middleware; the
/// feed, single-item lookup, comment listing and health stay public.
pub fn build_router(state: AppState) -> Router {
    use axum::extract::DefaultBodyLimit;
    use axum::middleware;
    use axum::routing::{get, post};

    let protected = Router::new()
        .route("/api/auth/login", post(api::login))
        .route("/api/auth/me", post(api::me))
        .route("/api/audios", post(api::create_audio))
        .route("/api/audios/favorite", post(api::toggle_favorite))
        .route("/api/audios/share", post(api::share_audio))
        .route("/api/audios/history", post(api::add_history))
        .route("/api/audios/history/recent", post(api::recent_history))
        .route("/api/comments", post(api::add_comment))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth_middleware,
        ))
        .layer(DefaultBodyLimit::max(api::auth::MAX_BODY_BYTES));

    let public = Router::new()
        .route("/api/audios/feed", get(api::get_feed))
        .route("/api/audios/:id", get(api::get_audio))
        .route("/api/comments/:audio_id", get(api::list_comments))
        .route("/api/buildinfo", get(api::get_build_info))
        .merge(api::health_routes());

    let cors = cors_layer(&state.frontend_url);

    Router::new()
        .merge(protected)
        .merge(public)
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(frontend_url: &str) -> CorsLayer {
    match HeaderValue::from_str(frontend_url) {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
            .allow_credentials(true),
        Err(_) => {
            warn!("Frontend URL '{}' is not a valid origin, allowing any origin", frontend_url);
            CorsLayer::permissive()
        }
    }
}
