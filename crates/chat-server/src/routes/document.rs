//! Document versions.

use axum::extract::{Query, State};
use axum::Json;
use database::{document, timestamp, Document, DocumentKind};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::auth::AuthUser;
use crate::error::{Result, ServerError};
use crate::routes::IdQuery;
use crate::state::AppState;

/// Body of `POST /api/document`: a version edited in the browser.
#[derive(Debug, Deserialize)]
pub struct SaveDocumentRequest {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub kind: DocumentKind,
}

/// Body of `PATCH /api/document`.
#[derive(Debug, Deserialize)]
pub struct DeleteAfterRequest {
    pub timestamp: String,
}

/// Load every version of a document the user owns, oldest first.
async fn owned_versions(state: &AppState, user: &AuthUser, id: &str) -> Result<Vec<Document>> {
    let versions = document::get_documents_by_id(state.db.pool(), id).await?;
    match versions.first() {
        None => Err(ServerError::NotFound("Not Found")),
        Some(first) if first.user_id != user.id => Err(ServerError::Unauthorized),
        Some(_) => Ok(versions),
    }
}

fn required_id(query: IdQuery) -> Result<String> {
    query
        .id
        .ok_or_else(|| ServerError::BadRequest("Missing id".to_string()))
}

pub async fn get_documents(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<IdQuery>,
) -> Result<Json<Vec<Document>>> {
    let id = required_id(query)?;
    Ok(Json(owned_versions(&state, &user, &id).await?))
}

/// Save an edited version. The first save creates the document.
pub async fn save_document(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<IdQuery>,
    Json(request): Json<SaveDocumentRequest>,
) -> Result<Json<Document>> {
    let id = required_id(query)?;

    if let Some(first) = document::get_documents_by_id(state.db.pool(), &id).await?.first() {
        if first.user_id != user.id {
            return Err(ServerError::Unauthorized);
        }
    }

    let version = Document {
        id,
        created_at: timestamp::now(),
        title: request.title,
        content: Some(request.content),
        kind: request.kind,
        user_id: user.id,
    };
    document::save_document(state.db.pool(), &version).await?;
    Ok(Json(version))
}

/// Drop the versions newer than `timestamp`.
pub async fn delete_after(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<IdQuery>,
    Json(request): Json<DeleteAfterRequest>,
) -> Result<Json<Value>> {
    let id = required_id(query)?;
    owned_versions(&state, &user, &id).await?;

    let deleted = document::delete_documents_after(state.db.pool(), &id, &request.timestamp).await?;
    info!(document_id = %id, deleted, "Deleted document versions");
    Ok(Json(json!({ "deleted": deleted })))
}
