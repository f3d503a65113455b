//! In-memory feed store

use async_trait::async_trait;

use super::{FeedError, FeedFilter, FeedStore, KeyRange};
use crate::models::AudioItem;

/// Fixed collection kept in memory, ordered by `random_id`
#[derive(Debug, Clone, Default)]
pub struct MemoryFeedStore {
    items: Vec<AudioItem>,
}

impl MemoryFeedStore {
    pub fn new(mut items: Vec<AudioItem>) -> Self {
        items.sort_by(|a, b| a.random_id.total_cmp(&b.random_id));
        Self { items }
    }
}

#[async_trait]
impl FeedStore for MemoryFeedStore {
    async fn range(
        &self,
        filter: &FeedFilter,
        range: KeyRange,
        limit: usize,
    ) -> Result<Vec<AudioItem>, FeedError> {
        Ok(self
            .items
            .iter()
            .filter(|item| filter.matches(item) && range.contains(item.random_id))
            .take(limit)
            .cloned()
            .collect())
    }
}
