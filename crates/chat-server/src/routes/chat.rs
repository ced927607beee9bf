//! Chat routes: run a turn, load, delete and share chats.

use std::convert::Infallible;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use axum_extra::extract::CookieJar;
use chat_core::{
    convert_to_core_messages, convert_to_ui_messages, format_message_content,
    most_recent_user_message, CoreMessage, DataStreamWriter, StoredMessage, StreamPart, UiMessage,
};
use database::{chat, message, profile, timestamp, Chat, Json as DbJson, Message, Visibility};
use futures::{Stream, StreamExt};
use model_provider::{find_model, model_or_default};
use serde::{Deserialize, Serialize};
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::{Result, ServerError};
use crate::routes::{IdQuery, MODEL_COOKIE};
use crate::state::AppState;
use crate::title::{generate_title, FALLBACK_TITLE};
use crate::turn::{run_turn, Turn};

/// Body of `POST /api/chat`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub id: String,
    pub messages: Vec<UiMessage>,
    pub model_id: String,
}

/// A chat as the browser renders it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatView {
    pub chat: Chat,
    pub messages: Vec<UiMessage>,
    pub selected_model_id: &'static str,
    pub visibility: Visibility,
    pub is_readonly: bool,
}

#[derive(Debug, Deserialize)]
pub struct VisibilityRequest {
    pub visibility: Visibility,
}

fn to_event(part: &StreamPart) -> Event {
    Event::default()
        .event(part.event_name())
        .json_data(part)
        .unwrap_or_else(|e| {
            warn!("Failed to encode stream part: {}", e);
            Event::default().event("error").data(e.to_string())
        })
}

async fn title_for(state: &AppState, message: &CoreMessage) -> String {
    let model = match state.provider.language_model(&state.config.title_model) {
        Ok(model) => model,
        Err(e) => {
            warn!("Title model unavailable: {}", e);
            return FALLBACK_TITLE.to_string();
        }
    };

    generate_title(model.as_ref(), message)
        .await
        .unwrap_or_else(|e| {
            warn!("Title generation failed: {}", e);
            FALLBACK_TITLE.to_string()
        })
}

/// Run one chat turn and stream it back as server-sent events.
///
/// The chat is created on first use. The user message is saved before
/// streaming starts; the model's response is saved when the turn ends.
pub async fn post_chat(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<ChatRequest>,
) -> Result<Sse<impl Stream<Item = std::result::Result<Event, Infallible>>>> {
    let model_info = find_model(&request.model_id).ok_or(ServerError::NotFound("Model not found"))?;

    let messages = convert_to_core_messages(&request.messages);
    let user_message = most_recent_user_message(&messages)
        .cloned()
        .ok_or_else(|| ServerError::BadRequest("No user message found".to_string()))?;

    let model = state.provider.language_model(model_info.api_identifier)?;
    let pool = state.db.pool();

    profile::ensure_profile(pool, &user.id, &user.email).await?;

    match chat::get_chat(pool, &request.id).await? {
        Some(existing) if existing.user_id != user.id => return Err(ServerError::Unauthorized),
        Some(_) => {}
        None => {
            let title = title_for(&state, &user_message).await;
            let now = timestamp::now();
            chat::save_chat(
                pool,
                &Chat {
                    id: request.id.clone(),
                    user_id: user.id.clone(),
                    title,
                    visibility: Visibility::Private,
                    created_at: now.clone(),
                    updated_at: now,
                },
            )
            .await?;
            info!(chat_id = %request.id, "Created chat");
        }
    }

    let user_message_id = Uuid::new_v4().to_string();
    message::save_messages(
        pool,
        &[Message {
            id: user_message_id.clone(),
            chat_id: request.id.clone(),
            role: user_message.role().as_str().to_string(),
            content: DbJson(format_message_content(&user_message).to_value()),
            user_id: Some(user.id.clone()),
            tokens: None,
            created_at: timestamp::now(),
        }],
    )
    .await?;

    let (writer, reader) = DataStreamWriter::channel();
    let turn = Turn {
        chat_id: request.id,
        user_id: user.id,
        user_message_id,
        model,
        messages,
    };
    tokio::spawn(run_turn(state.clone(), turn, writer));

    let events = UnboundedReceiverStream::new(reader).map(|part| Ok(to_event(&part)));
    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

/// Load a chat with its messages rebuilt for the browser.
///
/// Private chats are only visible to their owner; everyone else gets 404.
pub async fn load_chat(
    State(state): State<AppState>,
    user: AuthUser,
    jar: CookieJar,
    Path(id): Path<String>,
) -> Result<Json<ChatView>> {
    let pool = state.db.pool();
    let chat = chat::get_chat(pool, &id)
        .await?
        .ok_or(ServerError::NotFound("Not Found"))?;

    if chat.visibility == Visibility::Private && chat.user_id != user.id {
        return Err(ServerError::NotFound("Not Found"));
    }

    let rows = message::get_messages_by_chat(pool, &id).await?;
    let stored: Vec<StoredMessage<'_>> = rows
        .iter()
        .map(|row| StoredMessage {
            id: &row.id,
            role: &row.role,
            content: &row.content.0,
            created_at: &row.created_at,
        })
        .collect();
    let messages = convert_to_ui_messages(&stored)?;

    let selected = model_or_default(jar.get(MODEL_COOKIE).map(|cookie| cookie.value()));

    Ok(Json(ChatView {
        is_readonly: chat.user_id != user.id,
        visibility: chat.visibility,
        chat,
        messages,
        selected_model_id: selected.id,
    }))
}

pub async fn delete_chat(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<IdQuery>,
) -> Result<(StatusCode, &'static str)> {
    let id = query.id.ok_or(ServerError::NotFound("Not Found"))?;
    let pool = state.db.pool();

    match chat::get_chat(pool, &id).await? {
        Some(existing) if existing.user_id == user.id => {}
        _ => return Err(ServerError::Unauthorized),
    }

    chat::delete_chat(pool, &id).await?;
    info!(chat_id = %id, "Deleted chat");
    Ok((StatusCode::OK, "Chat deleted"))
}

pub async fn update_visibility(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(request): Json<VisibilityRequest>,
) -> Result<(StatusCode, &'static str)> {
    let pool = state.db.pool();
    let chat = chat::get_chat(pool, &id)
        .await?
        .ok_or(ServerError::NotFound("Not Found"))?;

    if chat.user_id != user.id {
        return Err(ServerError::Unauthorized);
    }

    chat::update_chat_visibility(pool, &id, request.visibility).await?;
    Ok((StatusCode::OK, "Visibility updated"))
}
