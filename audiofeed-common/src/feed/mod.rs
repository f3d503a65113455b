//! Random feed sampling
//!
//! Every audio item carries an immutable `random_id` drawn uniformly from
//! [0, 1) at creation. A sample is taken by drawing a fresh cut point `r`,
//! reading up to N matching items with `random_id >= r` in ascending order,
//! then, if that came up short, wrapping around to read the remainder from
//! `random_id < r`. Both reads are index range scans on
//! `(language, style, random_id)`, and the two ranges are disjoint so no item
//! appears twice in one sample.
//!
//! The store and the random source are both injected, so tests can run
//! against [`MemoryFeedStore`] with a [`FixedRandom`] cut point.

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::models::{AudioItem, Language, Style};

mod memory;
mod random;
mod sqlite;

pub use memory::MemoryFeedStore;
pub use random::{FixedRandom, RandomSource, SeededRandom, ThreadRandom};
pub use sqlite::SqliteFeedStore;

/// Feed size served by the HTTP endpoint
pub const FEED_SIZE: usize = 10;

/// Sampler failure
///
/// There is exactly one failure mode: the store could not be read. Callers
/// own any retry policy.
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Feed unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for FeedError {
    fn from(err: sqlx::Error) -> Self {
        FeedError::Unavailable(err.to_string())
    }
}

impl From<crate::Error> for FeedError {
    fn from(err: crate::Error) -> Self {
        FeedError::Unavailable(err.to_string())
    }
}

/// Normalized feed filter
///
/// The default is every English item regardless of style.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedFilter {
    pub language: Language,
    pub style: Option<Style>,
}

impl FeedFilter {
    pub fn new(language: Language, style: Option<Style>) -> Self {
        Self { language, style }
    }

    /// Build a filter from raw query values
    ///
    /// Unknown or missing language falls back to `en`. Unknown style disables
    /// style filtering instead of producing an empty feed.
    pub fn from_query(language: Option<&str>, style: Option<&str>) -> Self {
        let language = language.and_then(Language::parse).unwrap_or_default();
        let style = style.and_then(Style::parse);
        Self { language, style }
    }

    /// Whether an item belongs to the filtered subset
    pub fn matches(&self, item: &AudioItem) -> bool {
        item.language == self.language && self.style.map_or(true, |s| item.style == Some(s))
    }
}

/// Half-open slice of the `random_id` key space
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyRange {
    /// `random_id >= cut`
    AtOrAbove(f64),
    /// `random_id < cut`
    Below(f64),
}

impl KeyRange {
    pub fn contains(&self, key: f64) -> bool {
        match *self {
            KeyRange::AtOrAbove(cut) => key >= cut,
            KeyRange::Below(cut) => key < cut,
        }
    }
}

/// Query-capable handle over the audio collection
#[async_trait]
pub trait FeedStore: Send + Sync {
    /// Return up to `limit` items matching `filter` whose `random_id` lies in
    /// `range`, ascending by `random_id`.
    async fn range(
        &self,
        filter: &FeedFilter,
        range: KeyRange,
        limit: usize,
    ) -> Result<Vec<AudioItem>, FeedError>;
}

/// Stateless random sampler over a [`FeedStore`]
pub struct FeedSampler<S, R> {
    store: S,
    random: R,
}

impl<S: FeedStore, R: RandomSource> FeedSampler<S, R> {
    pub fn new(store: S, random: R) -> Self {
        Self { store, random }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Sample up to `size` distinct items matching `filter`
    ///
    /// Returns `min(size, |matching|)` items. An empty collection yields an
    /// empty vec. If the first range read fails, the wrap read is skipped and
    /// the error is returned without partial results.
    pub async fn sample(&self, filter: &FeedFilter, size: usize) -> Result<Vec<AudioItem>, FeedError> {
        if size == 0 {
            return Ok(Vec::new());
        }

        let cut = self.random.next_unit();

        let mut items = self.store.range(filter, KeyRange::AtOrAbove(cut), size).await?;

        if items.len() < size {
            let remaining = size - items.len();
            let wrapped = self.store.range(filter, KeyRange::Below(cut), remaining).await?;
            debug!(
                "Feed wrap-around at r={:.4}: {} above cut, {} below",
                cut,
                items.len(),
                wrapped.len()
            );
            items.extend(wrapped);
        }

        Ok(items)
    }
}
