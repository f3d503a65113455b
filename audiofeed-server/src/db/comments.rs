//! Comments joined with their author's username

use audiofeed_common::models::Comment;
use audiofeed_common::{Error, Result};
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

/// Number of comments returned per audio item
pub const COMMENT_PAGE: i64 = 20;

const COMMENT_SELECT: &str = "SELECT c.id, c.audio_id, c.user_id, c.content, c.created_at, u.username
     FROM comments c JOIN users u ON u.id = c.user_id";

/// Insert an already-sanitized comment
///
/// The insert is the first statement, so the transaction holds the write
/// lock before it reads the joined row back.
pub async fn insert(pool: &SqlitePool, audio_id: &str, user_id: &str, content: &str) -> Result<Comment> {
    let mut tx = pool.begin().await?;

    let id = Uuid::new_v4().to_string();
    let inserted = sqlx::query(
        "INSERT INTO comments (id, audio_id, user_id, content, created_at)
         SELECT ?, id, ?, ?, ? FROM audios WHERE id = ?",
    )
    .bind(&id)
    .bind(user_id)
    .bind(content)
    .bind(Utc::now())
    .bind(audio_id)
    .execute(&mut *tx)
    .await?
    .rows_affected();
    if inserted == 0 {
        return Err(Error::NotFound(format!("Audio {}", audio_id)));
    }

    let row = sqlx::query(&format!("{} WHERE c.id = ?", COMMENT_SELECT))
        .bind(&id)
        .fetch_one(&mut *tx)
        .await?;
    let comment = Comment::from_row(&row)?;

    tx.commit().await?;
    Ok(comment)
}

/// Latest comments for an audio item, newest first
pub async fn list_for_audio(pool: &SqlitePool, audio_id: &str) -> Result<Vec<Comment>> {
    let rows = sqlx::query(&format!(
        "{} WHERE c.audio_id = ? ORDER BY c.created_at DESC, c.rowid DESC LIMIT ?",
        COMMENT_SELECT
    ))
    .bind(audio_id)
    .bind(COMMENT_PAGE)
    .fetch_all(pool)
    .await?;

    rows.iter().map(Comment::from_row).collect()
}
