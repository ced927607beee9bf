//! Message routes.

use axum::extract::{Path, State};
use axum::Json;
use database::{chat, message};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::auth::AuthUser;
use crate::error::{Result, ServerError};
use crate::state::AppState;

/// Delete every message that follows the given one in its chat, so the
/// conversation can be resumed from it. The message itself is kept.
///
/// An unknown message id is a no-op.
pub async fn delete_trailing(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let pool = state.db.pool();
    let Some(found) = message::get_message(pool, &id).await? else {
        debug!(message_id = %id, "Trailing delete for unknown message");
        return Ok(Json(json!({ "deleted": 0 })));
    };

    match chat::get_chat(pool, &found.chat_id).await? {
        Some(owner) if owner.user_id == user.id => {}
        _ => return Err(ServerError::Unauthorized),
    }

    let deleted = message::delete_messages_after(pool, &found.chat_id, &found.created_at).await?;
    info!(chat_id = %found.chat_id, deleted, "Deleted trailing messages");
    Ok(Json(json!({ "deleted": deleted })))
}
