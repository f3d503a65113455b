//! Random feed endpoint

use audiofeed_common::feed::{FeedFilter, FEED_SIZE};
use audiofeed_common::AudioItem;
use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use tracing::error;

use super::ApiError;
use crate::AppState;

/// Raw feed query; values are normalized, never rejected
#[derive(Debug, Default, Deserialize)]
pub struct FeedQuery {
    pub language: Option<String>,
    pub style: Option<String>,
}

/// GET /api/audios/feed?language=<lang>&style=<style>
///
/// Every call is an independent sample of up to 10 items. Unknown language
/// falls back to `en`, unknown style disables the style filter.
pub async fn get_feed(
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> Result<Json<Vec<AudioItem>>, ApiError> {
    let filter = FeedFilter::from_query(query.language.as_deref(), query.style.as_deref());

    state
        .sampler
        .sample(&filter, FEED_SIZE)
        .await
        .map(Json)
        .map_err(|e| {
            error!("Feed sampling failed for {:?}: {}", filter, e);
            ApiError::Internal("Failed to fetch feed".to_string())
        })
}
