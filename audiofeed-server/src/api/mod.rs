//! HTTP API handlers for audiofeed-server

pub mod audios;
pub mod auth;
pub mod buildinfo;
pub mod comments;
pub mod error;
pub mod feed;
pub mod health;
pub mod users;

pub use audios::{add_history, create_audio, get_audio, recent_history, share_audio, toggle_favorite};
pub use auth::auth_middleware;
pub use buildinfo::get_build_info;
pub use comments::{add_comment, list_comments};
pub use error::ApiError;
pub use feed::get_feed;
pub use health::health_routes;
pub use users::{login, me};
