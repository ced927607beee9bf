//! Model catalog and selection.

use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::cookie::{Cookie, CookieJar};
use model_provider::{find_model, ModelInfo, MODELS};
use serde::Deserialize;

use crate::error::{Result, ServerError};
use crate::routes::MODEL_COOKIE;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectModelRequest {
    pub model_id: String,
}

pub async fn list_models() -> Json<&'static [ModelInfo]> {
    Json(MODELS)
}

/// Remember the user's model choice in the `model-id` cookie.
pub async fn select_model(
    jar: CookieJar,
    Json(request): Json<SelectModelRequest>,
) -> Result<(CookieJar, StatusCode)> {
    let model = find_model(&request.model_id).ok_or(ServerError::NotFound("Model not found"))?;
    let cookie = Cookie::build((MODEL_COOKIE, model.id)).path("/");
    Ok((jar.add(cookie), StatusCode::OK))
}
