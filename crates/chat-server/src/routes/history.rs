//! The signed-in user's chats.

use axum::extract::State;
use axum::Json;
use database::{chat, Chat};

use crate::auth::AuthUser;
use crate::error::Result;
use crate::state::AppState;

/// Chats owned by the user, newest first.
pub async fn history(State(state): State<AppState>, user: AuthUser) -> Result<Json<Vec<Chat>>> {
    let chats = chat::list_chats_by_user(state.db.pool(), &user.id).await?;
    Ok(Json(chats))
}
