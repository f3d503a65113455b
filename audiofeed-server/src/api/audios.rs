//! Audio item creation, lookup, favorites, shares and history

use audiofeed_common::models::{AudioItem, Language, Style, MAX_TRANSCRIPT_CHARS};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::users::require_user;
use super::ApiError;
use crate::db::audios::{self, FavoriteOutcome, NewAudio};
use crate::AppState;

/// Admin upload body
#[derive(Debug, Deserialize)]
pub struct CreateAudioRequest {
    pub wallet_address: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub transcript: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

/// Body for per-item user actions
#[derive(Debug, Deserialize)]
pub struct AudioActionRequest {
    pub wallet_address: String,
    pub audio_id: String,
}

#[derive(Debug, Serialize)]
pub struct ShareResponse {
    pub share_url: String,
    pub share_count: i64,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Validate an upload. Unlike the feed filter, creation is strict about tags.
fn validate_new_audio(req: CreateAudioRequest) -> Result<NewAudio, ApiError> {
    let url = req.url.map(|u| u.trim().to_string()).unwrap_or_default();
    let transcript = req.transcript.map(|t| t.trim().to_string()).unwrap_or_default();
    if url.is_empty() || transcript.is_empty() {
        return Err(ApiError::BadRequest("Missing url or transcript".to_string()));
    }

    if transcript.chars().count() > MAX_TRANSCRIPT_CHARS {
        return Err(ApiError::BadRequest(format!(
            "Transcript exceeds {} characters",
            MAX_TRANSCRIPT_CHARS
        )));
    }

    let language = match req.language.as_deref().map(str::trim) {
        None | Some("") => Language::default(),
        Some(tag) => Language::parse(tag)
            .ok_or_else(|| ApiError::BadRequest(format!("Unsupported language: {}", tag)))?,
    };

    let style = match req.style.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(tag) => Some(
            Style::parse(tag).ok_or_else(|| ApiError::BadRequest(format!("Unsupported style: {}", tag)))?,
        ),
    };

    Ok(NewAudio {
        url,
        transcript,
        style,
        language,
    })
}

/// POST /api/audios (admin only)
pub async fn create_audio(
    State(state): State<AppState>,
    Json(req): Json<CreateAudioRequest>,
) -> Result<(StatusCode, Json<AudioItem>), ApiError> {
    let user = require_user(&state, &req.wallet_address).await?;
    if !user.is_admin {
        return Err(ApiError::Forbidden("Admin access required".to_string()));
    }

    let new_audio = validate_new_audio(req)?;
    let random_id = state.random.next_unit();
    let item = audios::insert(&state.db, new_audio, random_id).await?;
    info!(
        "Created audio {} ({}/{}) by {}",
        item.id,
        item.language,
        item.style.map(|s| s.as_str()).unwrap_or("-"),
        user.username
    );

    Ok((StatusCode::CREATED, Json(item)))
}

/// GET /api/audios/:id
pub async fn get_audio(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AudioItem>, ApiError> {
    audios::find(&state.db, &id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Audio {} not found", id)))
}

/// POST /api/audios/favorite
///
/// Toggles the caller's favorite on the item.
pub async fn toggle_favorite(
    State(state): State<AppState>,
    Json(req): Json<AudioActionRequest>,
) -> Result<Json<FavoriteOutcome>, ApiError> {
    let user = require_user(&state, &req.wallet_address).await?;
    let outcome = audios::toggle_favorite(&state.db, &user.id, &req.audio_id).await?;
    Ok(Json(outcome))
}

/// POST /api/audios/share
pub async fn share_audio(
    State(state): State<AppState>,
    Json(req): Json<AudioActionRequest>,
) -> Result<Json<ShareResponse>, ApiError> {
    require_user(&state, &req.wallet_address).await?;
    let share_count = audios::increment_share(&state.db, &req.audio_id).await?;

    Ok(Json(ShareResponse {
        share_url: format!("{}/audio/{}", state.frontend_url, req.audio_id),
        share_count,
    }))
}

/// POST /api/audios/history
pub async fn add_history(
    State(state): State<AppState>,
    Json(req): Json<AudioActionRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let user = require_user(&state, &req.wallet_address).await?;
    audios::record_history(&state.db, &user.id, &req.audio_id).await?;
    Ok(Json(SuccessResponse { success: true }))
}

/// POST /api/audios/history/recent
pub async fn recent_history(
    State(state): State<AppState>,
    Json(req): Json<super::users::WalletRequest>,
) -> Result<Json<Vec<AudioItem>>, ApiError> {
    let user = require_user(&state, &req.wallet_address).await?;
    Ok(Json(audios::recent_history(&state.db, &user.id).await?))
}
