//! Wallet-identified accounts
//!
//! Wallet ownership is proven upstream; these routes only see signed
//! requests naming a `wallet_address`.

use audiofeed_common::models::{normalize_wallet_address, User};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::ApiError;
use crate::db::users;
use crate::AppState;

/// Body shared by every per-user request
#[derive(Debug, Deserialize)]
pub struct WalletRequest {
    pub wallet_address: String,
}

#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub id: String,
    pub wallet_address: String,
    pub username: String,
    pub is_admin: bool,
    pub favorites: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: UserProfile,
}

async fn profile(state: &AppState, user: User) -> Result<UserResponse, ApiError> {
    let favorites = users::favorite_ids(&state.db, &user.id).await?;
    Ok(UserResponse {
        user: UserProfile {
            id: user.id,
            wallet_address: user.wallet_address,
            username: user.username,
            is_admin: user.is_admin,
            favorites,
        },
    })
}

/// Resolve the acting user, 401 if the wallet has never logged in
pub(crate) async fn require_user(state: &AppState, wallet_address: &str) -> Result<User, ApiError> {
    let address = normalize_wallet_address(wallet_address)?;
    users::find_by_wallet(&state.db, &address)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User not found".to_string()))
}

/// POST /api/auth/login
///
/// Finds or creates the account for the wallet. The first account ever
/// created is made admin.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<WalletRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let address = normalize_wallet_address(&req.wallet_address)?;
    let user = users::find_or_create(&state.db, &address).await?;
    info!("Login: {} ({}){}", user.username, user.wallet_address, if user.is_admin { " [admin]" } else { "" });

    Ok(Json(profile(&state, user).await?))
}

/// POST /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    Json(req): Json<WalletRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = require_user(&state, &req.wallet_address).await?;
    Ok(Json(profile(&state, user).await?))
}
