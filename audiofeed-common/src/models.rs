//! Domain models
//!
//! Audio items carry two closed tag sets, [`Language`] and [`Style`]. Parsing
//! is strict here; the lenient fallbacks used by the feed live in
//! [`crate::feed::FeedFilter`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::fmt;

use crate::{Error, Result};

/// Maximum transcript length in characters (plain text or SRT)
pub const MAX_TRANSCRIPT_CHARS: usize = 5000;

/// Supported content locale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Zh,
    Es,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::En, Language::Zh, Language::Es];

    /// Parse a locale tag, returning None for anything outside the closed set
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "en" => Some(Language::En),
            "zh" => Some(Language::Zh),
            "es" => Some(Language::Es),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Zh => "zh",
            Language::Es => "es",
        }
    }
}

impl Default for Language {
    fn default() -> Self {
        Language::En
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content category tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    Wealth,
    Health,
    Peace,
}

impl Style {
    pub const ALL: [Style; 3] = [Style::Wealth, Style::Health, Style::Peace];

    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "wealth" => Some(Style::Wealth),
            "health" => Some(Style::Health),
            "peace" => Some(Style::Peace),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Style::Wealth => "wealth",
            Style::Health => "health",
            Style::Peace => "peace",
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A narration clip in the feed
///
/// `random_id` is drawn once at creation and never rewritten. It is never
/// serialized to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudioItem {
    pub id: String,
    pub url: String,
    pub style: Option<Style>,
    pub language: Language,
    pub transcript: String,
    #[serde(skip_serializing)]
    pub random_id: f64,
    pub favorite_count: i64,
    pub share_count: i64,
    pub created_at: DateTime<Utc>,
}

/// Column list matching [`AudioItem::from_row`]
pub const AUDIO_COLUMNS: &str =
    "id, url, style, language, transcript, random_id, favorite_count, share_count, created_at";

impl AudioItem {
    /// Decode a row selected with [`AUDIO_COLUMNS`]
    pub fn from_row(row: &SqliteRow) -> Result<Self> {
        let style: Option<String> = row.try_get("style")?;
        let style = match style {
            Some(tag) => Some(Style::parse(&tag).ok_or_else(|| {
                Error::Internal(format!("Unknown style '{}' stored in audios", tag))
            })?),
            None => None,
        };

        let language: String = row.try_get("language")?;
        let language = Language::parse(&language).ok_or_else(|| {
            Error::Internal(format!("Unknown language '{}' stored in audios", language))
        })?;

        Ok(Self {
            id: row.try_get("id")?,
            url: row.try_get("url")?,
            style,
            language,
            transcript: row.try_get("transcript")?,
            random_id: row.try_get("random_id")?,
            favorite_count: row.try_get("favorite_count")?,
            share_count: row.try_get("share_count")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

/// A wallet-identified account
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: String,
    pub wallet_address: String,
    pub username: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn from_row(row: &SqliteRow) -> Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            wallet_address: row.try_get("wallet_address")?,
            username: row.try_get("username")?,
            is_admin: row.try_get::<i64, _>("is_admin")? != 0,
            created_at: row.try_get("created_at")?,
        })
    }
}

/// Comment author projection
#[derive(Debug, Clone, Serialize)]
pub struct CommentAuthor {
    pub username: String,
}

/// A comment on an audio item, joined with its author's username
#[derive(Debug, Clone, Serialize)]
pub struct Comment {
    pub id: String,
    pub audio_id: String,
    pub user_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub user: CommentAuthor,
}

impl Comment {
    pub fn from_row(row: &SqliteRow) -> Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            audio_id: row.try_get("audio_id")?,
            user_id: row.try_get("user_id")?,
            content: row.try_get("content")?,
            created_at: row.try_get("created_at")?,
            user: CommentAuthor {
                username: row.try_get("username")?,
            },
        })
    }
}

/// Normalize and validate a wallet address (`0x` followed by 40 hex digits)
///
/// Addresses are stored lower-cased.
pub fn normalize_wallet_address(address: &str) -> Result<String> {
    let address = address.trim().to_ascii_lowercase();
    let valid = address.len() == 42
        && address.starts_with("0x")
        && address[2..].chars().all(|c| c.is_ascii_hexdigit());

    if valid {
        Ok(address)
    } else {
        Err(Error::InvalidInput(format!(
            "Invalid wallet address: {}",
            address
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_parse_closed_set() {
        for lang in Language::ALL {
            assert_eq!(Language::parse(lang.as_str()), Some(lang));
        }
        assert_eq!(Language::parse("xx"), None);
        assert_eq!(Language::parse("EN"), None);
        assert_eq!(Language::parse(""), None);
    }

    #[test]
    fn test_style_parse_closed_set() {
        for style in Style::ALL {
            assert_eq!(Style::parse(style.as_str()), Some(style));
        }
        assert_eq!(Style::parse("bogus"), None);
    }

    #[test]
    fn test_random_id_not_serialized() {
        let item = AudioItem {
            id: "a1".to_string(),
            url: "https://cdn.example/a1.mp3".to_string(),
            style: Some(Style::Peace),
            language: Language::Zh,
            transcript: "hello".to_string(),
            random_id: 0.42,
            favorite_count: 3,
            share_count: 1,
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&item).unwrap();
        assert!(json.get("random_id").is_none());
        assert_eq!(json["style"], "peace");
        assert_eq!(json["language"], "zh");
        assert_eq!(json["favorite_count"], 3);
    }

    #[test]
    fn test_wallet_address_normalized() {
        let addr = normalize_wallet_address("0xABCDEF0123456789abcdef0123456789ABCDEF01").unwrap();
        assert_eq!(addr, "0xabcdef0123456789abcdef0123456789abcdef01");
    }

    #[test]
    fn test_wallet_address_rejected() {
        assert!(normalize_wallet_address("0x1234").is_err());
        assert!(normalize_wallet_address("abcdef0123456789abcdef0123456789abcdef0123").is_err());
        assert!(normalize_wallet_address("0xzzcdef0123456789abcdef0123456789abcdef01").is_err());
    }
}
