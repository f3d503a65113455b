//! User accounts keyed by wallet address

use audiofeed_common::models::User;
use audiofeed_common::Result;
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

const USER_COLUMNS: &str = "id, wallet_address, username, is_admin, created_at";

/// Display name given to new accounts: `User_` plus six address characters
pub fn default_username(wallet_address: &str) -> String {
    let tag: String = wallet_address.chars().skip(2).take(6).collect();
    format!("User_{}", tag)
}

pub async fn find_by_wallet(pool: &SqlitePool, wallet_address: &str) -> Result<Option<User>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM users WHERE wallet_address = ?",
        USER_COLUMNS
    ))
    .bind(wallet_address)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(User::from_row).transpose()
}

/// Return the account for `wallet_address`, creating it on first sight
///
/// The very first account created becomes admin. The admin decision and the
/// insert happen in one statement, so concurrent first logins cannot both
/// become admin.
pub async fn find_or_create(pool: &SqlitePool, wallet_address: &str) -> Result<User> {
    sqlx::query(
        "INSERT OR IGNORE INTO users (id, wallet_address, username, is_admin, created_at)
         SELECT ?, ?, ?, NOT EXISTS (SELECT 1 FROM users), ?",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(wallet_address)
    .bind(default_username(wallet_address))
    .bind(Utc::now())
    .execute(pool)
    .await?;

    find_by_wallet(pool, wallet_address).await?.ok_or_else(|| {
        audiofeed_common::Error::Internal(format!("User {} vanished after insert", wallet_address))
    })
}

/// Audio ids the user has favorited, newest first
pub async fn favorite_ids(pool: &SqlitePool, user_id: &str) -> Result<Vec<String>> {
    let ids = sqlx::query_scalar(
        "SELECT audio_id FROM favorites WHERE user_id = ? ORDER BY created_at DESC, rowid DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(ids)
}
