//! Database access layer for audiofeed-server
//!
//! Feed reads go through `audiofeed_common::feed::SqliteFeedStore`; this
//! module holds the write paths and per-user reads.

pub mod audios;
pub mod comments;
pub mod users;
