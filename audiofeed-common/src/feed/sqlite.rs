//! SQLite-backed feed store
//!
//! Each read is a single range scan over `idx_audios_sampling`
//! (language, style, random_id) or `idx_audios_language_random`
//! (language, random_id) when no style filter applies.

use async_trait::async_trait;
use sqlx::SqlitePool;

use super::{FeedError, FeedFilter, FeedStore, KeyRange};
use crate::models::{AudioItem, AUDIO_COLUMNS};

#[derive(Debug, Clone)]
pub struct SqliteFeedStore {
    pool: SqlitePool,
}

impl SqliteFeedStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn range_sql(with_style: bool, range: KeyRange) -> String {
    let style_clause = if with_style { " AND style = ?" } else { "" };
    let key_clause = match range {
        KeyRange::AtOrAbove(_) => "random_id >= ?",
        KeyRange::Below(_) => "random_id < ?",
    };

    format!(
        "SELECT {} FROM audios WHERE language = ?{} AND {} ORDER BY random_id ASC LIMIT ?",
        AUDIO_COLUMNS, style_clause, key_clause
    )
}

#[async_trait]
impl FeedStore for SqliteFeedStore {
    async fn range(
        &self,
        filter: &FeedFilter,
        range: KeyRange,
        limit: usize,
    ) -> Result<Vec<AudioItem>, FeedError> {
        let cut = match range {
            KeyRange::AtOrAbove(cut) | KeyRange::Below(cut) => cut,
        };

        let sql = range_sql(filter.style.is_some(), range);
        let mut query = sqlx::query(&sql).bind(filter.language.as_str());
        if let Some(style) = filter.style {
            query = query.bind(style.as_str());
        }

        let rows = query
            .bind(cut)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| AudioItem::from_row(row).map_err(FeedError::from))
            .collect()
    }
}
