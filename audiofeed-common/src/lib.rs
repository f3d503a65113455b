//! # Audiofeed Common Library
//!
//! Shared code for the audiofeed service including:
//! - Domain models (audio items, users, comments) and their closed tag sets
//! - Database initialization and schema
//! - Random feed sampling over the `random_id` index
//! - Request signing primitives
//! - Configuration loading

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod feed;
pub mod models;

pub use error::{Error, Result};
pub use feed::{FeedError, FeedFilter, FeedSampler, FeedStore, RandomSource};
pub use models::{AudioItem, Language, Style};
