//! Audio item writes and lookups
//!
//! `random_id`, `style` and `language` are only ever written by [`insert`].
//! Everything else in this module touches counters or link tables.

use audiofeed_common::models::{AudioItem, Language, Style, AUDIO_COLUMNS};
use audiofeed_common::{Error, Result};
use chrono::Utc;
use serde::Serialize;
use sqlx::SqlitePool;
use uuid::Uuid;

/// Maximum number of history items returned
pub const HISTORY_LIMIT: i64 = 50;

/// Validated fields for a new audio item
#[derive(Debug, Clone)]
pub struct NewAudio {
    pub url: String,
    pub transcript: String,
    pub style: Option<Style>,
    pub language: Language,
}

/// Favorite state after a toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FavoriteOutcome {
    pub favorited: bool,
    pub favorite_count: i64,
}

pub async fn insert(pool: &SqlitePool, audio: NewAudio, random_id: f64) -> Result<AudioItem> {
    let item = AudioItem {
        id: Uuid::new_v4().to_string(),
        url: audio.url,
        style: audio.style,
        language: audio.language,
        transcript: audio.transcript,
        random_id,
        favorite_count: 0,
        share_count: 0,
        created_at: Utc::now(),
    };

    sqlx::query(
        "INSERT INTO audios (id, url, style, language, transcript, random_id, favorite_count, share_count, created_at)
         VALUES (?, ?, ?, ?, ?, ?, 0, 0, ?)",
    )
    .bind(&item.id)
    .bind(&item.url)
    .bind(item.style.map(|s| s.as_str()))
    .bind(item.language.as_str())
    .bind(&item.transcript)
    .bind(item.random_id)
    .bind(item.created_at)
    .execute(pool)
    .await?;

    Ok(item)
}

pub async fn find(pool: &SqlitePool, id: &str) -> Result<Option<AudioItem>> {
    let row = sqlx::query(&format!("SELECT {} FROM audios WHERE id = ?", AUDIO_COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(AudioItem::from_row).transpose()
}

/// Favorite or unfavorite, keeping `favorite_count` in step
///
/// The link row and the counter change commit together. The first statement
/// is a write, so the transaction holds the write lock from the start and
/// concurrent toggles wait on `busy_timeout`.
pub async fn toggle_favorite(pool: &SqlitePool, user_id: &str, audio_id: &str) -> Result<FavoriteOutcome> {
    let mut tx = pool.begin().await?;

    let removed = sqlx::query("DELETE FROM favorites WHERE user_id = ? AND audio_id = ?")
        .bind(user_id)
        .bind(audio_id)
        .execute(&mut *tx)
        .await?
        .rows_affected()
        > 0;

    let counter_sql = if removed {
        "UPDATE audios SET favorite_count = MAX(favorite_count - 1, 0) WHERE id = ? RETURNING favorite_count"
    } else {
        let inserted = sqlx::query(
            "INSERT INTO favorites (user_id, audio_id)
             SELECT ?, id FROM audios WHERE id = ?",
        )
        .bind(user_id)
        .bind(audio_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();
        if inserted == 0 {
            return Err(Error::NotFound(format!("Audio {}", audio_id)));
        }
        "UPDATE audios SET favorite_count = favorite_count + 1 WHERE id = ? RETURNING favorite_count"
    };

    let favorite_count: i64 = sqlx::query_scalar(counter_sql)
        .bind(audio_id)
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(FavoriteOutcome {
        favorited: !removed,
        favorite_count,
    })
}

/// Increment `share_count`, returning the new value
pub async fn increment_share(pool: &SqlitePool, audio_id: &str) -> Result<i64> {
    let count: Option<i64> = sqlx::query_scalar(
        "UPDATE audios SET share_count = share_count + 1 WHERE id = ? RETURNING share_count",
    )
    .bind(audio_id)
    .fetch_optional(pool)
    .await?;

    count.ok_or_else(|| Error::NotFound(format!("Audio {}", audio_id)))
}

/// Append a listen; the audio must exist
pub async fn record_history(pool: &SqlitePool, user_id: &str, audio_id: &str) -> Result<()> {
    let inserted = sqlx::query(
        "INSERT INTO history (user_id, audio_id)
         SELECT ?, id FROM audios WHERE id = ?",
    )
    .bind(user_id)
    .bind(audio_id)
    .execute(pool)
    .await?
    .rows_affected();

    if inserted == 0 {
        return Err(Error::NotFound(format!("Audio {}", audio_id)));
    }
    Ok(())
}

/// Distinct items from the user's most recent listens, newest items first
pub async fn recent_history(pool: &SqlitePool, user_id: &str) -> Result<Vec<AudioItem>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM audios
         WHERE id IN (
             SELECT audio_id FROM history
             WHERE user_id = ?
             GROUP BY audio_id
             ORDER BY MAX(id) DESC
             LIMIT ?
         )
         ORDER BY created_at DESC",
        AUDIO_COLUMNS
    ))
    .bind(user_id)
    .bind(HISTORY_LIMIT)
    .fetch_all(pool)
    .await?;

    rows.iter().map(AudioItem::from_row).collect()
}
