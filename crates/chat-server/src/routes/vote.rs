//! Message votes.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use database::{vote, Vote};
use serde::Deserialize;
use tracing::error;

use crate::auth::AuthUser;
use crate::error::{Result, ServerError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VotesQuery {
    pub chat_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteType {
    Up,
    Down,
}

/// Body of `PATCH /api/vote`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub chat_id: Option<String>,
    pub message_id: Option<String>,
    #[serde(rename = "type")]
    pub vote_type: Option<VoteType>,
}

/// Votes in a chat. Read failures are logged and answered with an empty list.
pub async fn get_votes(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<VotesQuery>,
) -> Result<Json<Vec<Vote>>> {
    let chat_id = query
        .chat_id
        .ok_or_else(|| ServerError::BadRequest("chatId is required".to_string()))?;

    match vote::get_votes_by_chat(state.db.pool(), &chat_id).await {
        Ok(votes) => Ok(Json(votes)),
        Err(e) => {
            error!(chat_id = %chat_id, "Error fetching votes: {}", e);
            Ok(Json(Vec::new()))
        }
    }
}

pub async fn vote(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(request): Json<VoteRequest>,
) -> Result<(StatusCode, &'static str)> {
    let (Some(chat_id), Some(message_id), Some(vote_type)) =
        (request.chat_id, request.message_id, request.vote_type)
    else {
        return Err(ServerError::BadRequest(
            "messageId and type are required".to_string(),
        ));
    };

    vote::vote_message(state.db.pool(), &chat_id, &message_id, vote_type == VoteType::Up).await?;
    Ok((StatusCode::OK, "Message voted"))
}
