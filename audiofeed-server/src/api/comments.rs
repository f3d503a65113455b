//! Comments: plain text only, 200 characters max

use audiofeed_common::models::Comment;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use super::users::require_user;
use super::ApiError;
use crate::db::comments;
use crate::AppState;

/// Longest comment accepted, counted after tag stripping
pub const MAX_COMMENT_CHARS: usize = 200;

#[derive(Debug, Deserialize)]
pub struct AddCommentRequest {
    pub wallet_address: String,
    #[serde(default)]
    pub audio_id: String,
    #[serde(default)]
    pub content: String,
}

/// Remove HTML tags, keeping the text between them
///
/// A tag opens with `<` followed by an ASCII letter, `/` or `!` and runs to
/// the next `>`. Any other `<` (`1 < 2`, `<3`) is plain text, as is a tag
/// that never closes.
pub fn strip_html_tags(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(open) = rest.find('<') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let opens_tag = after
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '/' || c == '!');

        match after.find('>') {
            Some(close) if opens_tag => rest = &after[close + 1..],
            _ => {
                out.push('<');
                rest = after;
            }
        }
    }
    out.push_str(rest);

    out
}

/// POST /api/comments
pub async fn add_comment(
    State(state): State<AppState>,
    Json(req): Json<AddCommentRequest>,
) -> Result<(StatusCode, Json<Comment>), ApiError> {
    let user = require_user(&state, &req.wallet_address).await?;

    let content = strip_html_tags(&req.content);
    let content = content.trim();
    if content.chars().count() > MAX_COMMENT_CHARS {
        return Err(ApiError::BadRequest("Comment too long".to_string()));
    }
    if req.audio_id.trim().is_empty() || content.is_empty() {
        return Err(ApiError::BadRequest("Missing audioId or content".to_string()));
    }

    let comment = comments::insert(&state.db, req.audio_id.trim(), &user.id, content).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// GET /api/comments/:audio_id
///
/// Latest 20 comments, newest first. Public.
pub async fn list_comments(
    State(state): State<AppState>,
    Path(audio_id): Path<String>,
) -> Result<Json<Vec<Comment>>, ApiError> {
    Ok(Json(comments::list_for_audio(&state.db, &audio_id).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_tags() {
        assert_eq!(strip_html_tags("<b>bold</b> move"), "bold move");
        assert_eq!(strip_html_tags("<script>alert(1)</script>"), "alert(1)");
        assert_eq!(strip_html_tags("<img src=x onerror=alert(1)>"), "");
    }

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(strip_html_tags("calm and kind 🙏"), "calm and kind 🙏");
        assert_eq!(strip_html_tags("2 > 1"), "2 > 1");
    }

    #[test]
    fn test_unclosed_angle_kept() {
        assert_eq!(strip_html_tags("1 < 2 always"), "1 < 2 always");
        assert_eq!(strip_html_tags("see <b and more"), "see <b and more");
    }

    #[test]
    fn test_comparison_and_emoticons_kept() {
        assert_eq!(strip_html_tags("1 < 2 and 3 > 2"), "1 < 2 and 3 > 2");
        assert_eq!(strip_html_tags("i <3 this, so good >_<"), "i <3 this, so good >_<");
        assert_eq!(strip_html_tags("a <= b"), "a <= b");
    }

    #[test]
    fn test_closing_and_comment_tags_stripped() {
        assert_eq!(strip_html_tags("calm</p>"), "calm");
        assert_eq!(strip_html_tags("<!-- hidden -->peace"), "peace");
        assert_eq!(strip_html_tags("<3 <i>truly</i>"), "<3 truly");
    }
}
