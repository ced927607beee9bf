//! Document suggestions.

use axum::extract::{Query, State};
use axum::Json;
use database::{suggestion, Suggestion};
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::error::{Result, ServerError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionsQuery {
    pub document_id: Option<String>,
}

/// Suggestions for a document, visible to the user they were made for.
pub async fn get_suggestions(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<SuggestionsQuery>,
) -> Result<Json<Vec<Suggestion>>> {
    let document_id = query.document_id.ok_or(ServerError::NotFound("Not Found"))?;

    let suggestions = suggestion::get_suggestions_by_document(state.db.pool(), &document_id).await?;

    match suggestions.first() {
        Some(first) if first.user_id != user.id => Err(ServerError::Unauthorized),
        _ => Ok(Json(suggestions)),
    }
}
