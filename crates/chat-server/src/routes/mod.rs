//! Route handlers for the chat server.

pub mod chat;
pub mod document;
pub mod health;
pub mod history;
pub mod messages;
pub mod models;
pub mod suggestions;
pub mod vote;

use axum::routing::{delete, get, patch, post};
use axum::Router;
use serde::Deserialize;

use crate::state::AppState;

/// Cookie holding the selected model id.
pub const MODEL_COOKIE: &str = "model-id";

/// `?id=` query parameter.
#[derive(Debug, Deserialize)]
pub struct IdQuery {
    pub id: Option<String>,
}

/// Build the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(health::health))
        // Chats
        .route("/api/chat", post(chat::post_chat).delete(chat::delete_chat))
        .route("/api/chat/:id", get(chat::load_chat))
        .route("/api/chat/:id/visibility", patch(chat::update_visibility))
        .route("/api/messages/:id/trailing", delete(messages::delete_trailing))
        .route("/api/history", get(history::history))
        .route("/api/vote", get(vote::get_votes).patch(vote::vote))
        // Documents
        .route(
            "/api/document",
            get(document::get_documents)
                .post(document::save_document)
                .patch(document::delete_after),
        )
        .route("/api/suggestions", get(suggestions::get_suggestions))
        // Models
        .route("/api/models", get(models::list_models))
        .route("/api/model", post(models::select_model))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{USER_EMAIL_HEADER, USER_ID_HEADER};
    use crate::test_support::{test_state, EchoTool};
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use chat_tools::ToolRegistry;
    use database::{
        chat as chats, document as documents, message as messages_db, profile, suggestion,
        Document, DocumentKind, Json, Message, Suggestion, Visibility,
    };
    use http_body_util::BodyExt;
    use mock_model::{EchoModel, MockProvider};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn app() -> (Router, AppState) {
        let mut tools = ToolRegistry::new();
        tools.register(EchoTool);
        let state = test_state(MockProvider::new(EchoModel::new()), tools).await;
        (router().with_state(state.clone()), state)
    }

    fn request(method: Method, uri: &str, user: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder
                .header(USER_ID_HEADER, user)
                .header(USER_EMAIL_HEADER, format!("{user}@example.com"));
        }
        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, String) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    async fn send_json(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let (status, body) = send(app, request).await;
        (status, serde_json::from_str(&body).unwrap_or(Value::Null))
    }

    fn message(id: &str, chat_id: &str, role: &str, content: Value, created_at: &str) -> Message {
        Message {
            id: id.to_string(),
            chat_id: chat_id.to_string(),
            role: role.to_string(),
            content: Json(content),
            user_id: Some("u1".to_string()),
            tokens: None,
            created_at: created_at.to_string(),
        }
    }

    #[tokio::test]
    async fn test_health() {
        let (app, state) = app().await;
        let (status, body) = send_json(&app, request(Method::GET, "/health", None, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "ok", "database": "ok"}));

        state.db.close().await;
        let (status, body) = send_json(&app, request(Method::GET, "/health", None, None)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["database"], "unavailable");
    }

    #[tokio::test]
    async fn test_requests_without_identity_are_rejected() {
        let (app, state) = app().await;

        let (status, _) = send(&app, request(Method::GET, "/api/history", None, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let body = json!({
            "id": "c-new",
            "messages": [{"id": "1", "role": "user", "content": "Hello"}],
            "modelId": "gpt-4o-mini"
        });
        let (status, _) = send(&app, request(Method::POST, "/api/chat", None, Some(body))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(chats::get_chat(state.db.pool(), "c-new").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_post_chat_validation() {
        let (app, _) = app().await;

        let unknown_model = json!({
            "id": "c-new",
            "messages": [{"id": "1", "role": "user", "content": "Hello"}],
            "modelId": "gpt-2"
        });
        let (status, _) =
            send(&app, request(Method::POST, "/api/chat", Some("u1"), Some(unknown_model))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let no_user_message = json!({
            "id": "c-new",
            "messages": [{"id": "1", "role": "assistant", "content": "Hi"}],
            "modelId": "gpt-4o-mini"
        });
        let (status, body) =
            send_json(&app, request(Method::POST, "/api/chat", Some("u1"), Some(no_user_message)))
                .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No user message found");
    }

    #[tokio::test]
    async fn test_post_chat_streams_and_persists() {
        let (app, state) = app().await;

        let body = json!({
            "id": "c-new",
            "messages": [{"id": "1", "role": "user", "content": "Hello"}],
            "modelId": "gpt-4o-mini"
        });
        let (status, events) =
            send(&app, request(Method::POST, "/api/chat", Some("u2"), Some(body))).await;

        assert_eq!(status, StatusCode::OK);
        assert!(events.contains("event: data"));
        assert!(events.contains("event: text"));
        assert!(events.contains("event: message-annotation"));
        assert!(events.contains("event: finish"));

        let chat = chats::get_chat(state.db.pool(), "c-new").await.unwrap().unwrap();
        assert_eq!(chat.user_id, "u2");
        assert_eq!(chat.title, "Hello");
        assert!(profile::get_profile(state.db.pool(), "u2").await.unwrap().is_some());

        // Newest first: echoed answer, then the user message
        let saved = messages_db::get_messages_by_chat(state.db.pool(), "c-new")
            .await
            .unwrap();
        assert_eq!(saved.len(), 2);
        assert_eq!(saved[0].role, "assistant");
        assert_eq!(saved[1].role, "user");
        assert_eq!(saved[1].content.0, json!("Hello"));
    }

    #[tokio::test]
    async fn test_post_chat_rejects_foreign_chat() {
        let (app, _) = app().await;

        let body = json!({
            "id": "c1",
            "messages": [{"id": "1", "role": "user", "content": "Hello"}],
            "modelId": "gpt-4o-mini"
        });
        let (status, _) = send(&app, request(Method::POST, "/api/chat", Some("u2"), Some(body))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_load_chat() {
        let (app, state) = app().await;
        messages_db::save_messages(
            state.db.pool(),
            &[
                message("m1", "c1", "user", json!("What's the weather?"), "2026-01-01T00:00:01.000000Z"),
                message(
                    "m2",
                    "c1",
                    "assistant",
                    json!([{"type": "text", "text": "Sunny."}]),
                    "2026-01-01T00:00:02.000000Z",
                ),
            ],
        )
        .await
        .unwrap();

        let mut owner = request(Method::GET, "/api/chat/c1", Some("u1"), None);
        owner
            .headers_mut()
            .insert(header::COOKIE, "model-id=gpt-4o".parse().unwrap());
        let (status, body) = send_json(&app, owner).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["selectedModelId"], "gpt-4o");
        assert_eq!(body["isReadonly"], false);
        assert_eq!(body["visibility"], "private");
        assert_eq!(body["messages"][0]["content"], "What's the weather?");
        assert_eq!(body["messages"][1]["content"], "Sunny.");

        // Private chats are hidden from everyone else
        let (status, _) = send(&app, request(Method::GET, "/api/chat/c1", Some("u2"), None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        chats::update_chat_visibility(state.db.pool(), "c1", Visibility::Public)
            .await
            .unwrap();
        let (status, body) =
            send_json(&app, request(Method::GET, "/api/chat/c1", Some("u2"), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["isReadonly"], true);
        assert_eq!(body["selectedModelId"], "gpt-4o-mini");
    }

    #[tokio::test]
    async fn test_delete_chat_owner_only() {
        let (app, state) = app().await;

        let (status, _) =
            send(&app, request(Method::DELETE, "/api/chat?id=c1", Some("u2"), None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(&app, request(Method::DELETE, "/api/chat", Some("u1"), None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) =
            send(&app, request(Method::DELETE, "/api/chat?id=c1", Some("u1"), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "Chat deleted");
        assert!(chats::get_chat(state.db.pool(), "c1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_visibility() {
        let (app, state) = app().await;
        let body = json!({"visibility": "public"});

        let (status, _) = send(
            &app,
            request(Method::PATCH, "/api/chat/c1/visibility", Some("u2"), Some(body.clone())),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(
            &app,
            request(Method::PATCH, "/api/chat/c1/visibility", Some("u1"), Some(body)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let chat = chats::get_chat(state.db.pool(), "c1").await.unwrap().unwrap();
        assert_eq!(chat.visibility, Visibility::Public);
    }

    #[tokio::test]
    async fn test_history_and_trailing_delete() {
        let (app, state) = app().await;
        messages_db::save_messages(
            state.db.pool(),
            &[
                message("m1", "c1", "user", json!("first"), "2026-01-01T00:00:01.000000Z"),
                message("m2", "c1", "user", json!("second"), "2026-01-01T00:00:02.000000Z"),
                message("m3", "c1", "assistant", json!("reply"), "2026-01-01T00:00:03.000000Z"),
            ],
        )
        .await
        .unwrap();

        let (status, body) =
            send_json(&app, request(Method::GET, "/api/history", Some("u1"), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["id"], "c1");

        let (status, body) = send_json(
            &app,
            request(Method::DELETE, "/api/messages/m2/trailing", Some("u1"), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["deleted"], 1);

        let remaining = messages_db::get_messages_by_chat(state.db.pool(), "c1")
            .await
            .unwrap();
        let ids: Vec<&str> = remaining.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["m2", "m1"]);

        // Unknown message is a no-op
        let (status, body) = send_json(
            &app,
            request(Method::DELETE, "/api/messages/nope/trailing", Some("u1"), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["deleted"], 0);
    }

    #[tokio::test]
    async fn test_votes() {
        let (app, state) = app().await;
        messages_db::save_messages(
            state.db.pool(),
            &[message("m1", "c1", "assistant", json!("reply"), "2026-01-01T00:00:01.000000Z")],
        )
        .await
        .unwrap();

        let (status, _) = send(
            &app,
            request(Method::PATCH, "/api/vote", Some("u1"), Some(json!({"chatId": "c1"}))),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        for vote in ["up", "down"] {
            let (status, _) = send(
                &app,
                request(
                    Method::PATCH,
                    "/api/vote",
                    Some("u1"),
                    Some(json!({"chatId": "c1", "messageId": "m1", "type": vote})),
                ),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }

        let (status, body) =
            send_json(&app, request(Method::GET, "/api/vote?chatId=c1", Some("u1"), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([{"chatId": "c1", "messageId": "m1", "isUpvoted": false}]));

        let (status, _) = send(&app, request(Method::GET, "/api/vote", Some("u1"), None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_documents_and_suggestions() {
        let (app, state) = app().await;
        let pool = state.db.pool();
        for (created_at, content) in [
            ("2026-01-01T00:00:01.000000Z", "v1"),
            ("2026-01-01T00:00:02.000000Z", "v2"),
        ] {
            documents::save_document(
                pool,
                &Document {
                    id: "d1".to_string(),
                    created_at: created_at.to_string(),
                    title: "Essay".to_string(),
                    content: Some(content.to_string()),
                    kind: DocumentKind::Text,
                    user_id: "u1".to_string(),
                },
            )
            .await
            .unwrap();
        }
        suggestion::save_suggestions(
            pool,
            &[Suggestion {
                id: "s1".to_string(),
                document_id: "d1".to_string(),
                document_created_at: "2026-01-01T00:00:02.000000Z".to_string(),
                original_text: "v2".to_string(),
                suggested_text: "v2!".to_string(),
                description: None,
                is_resolved: false,
                user_id: "u1".to_string(),
                created_at: "2026-01-01T00:00:03.000000Z".to_string(),
            }],
        )
        .await
        .unwrap();

        let (status, body) =
            send_json(&app, request(Method::GET, "/api/document?id=d1", Some("u1"), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 2);

        let (status, _) =
            send(&app, request(Method::GET, "/api/document?id=d1", Some("u2"), None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = send_json(
            &app,
            request(Method::GET, "/api/suggestions?documentId=d1", Some("u1"), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["suggestedText"], "v2!");

        let (status, _) = send(
            &app,
            request(Method::GET, "/api/suggestions?documentId=d1", Some("u2"), None),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        // Roll back to the first version
        let (status, body) = send_json(
            &app,
            request(
                Method::PATCH,
                "/api/document?id=d1",
                Some("u1"),
                Some(json!({"timestamp": "2026-01-01T00:00:01.000000Z"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["deleted"], 1);
        assert_eq!(
            documents::get_document(pool, "d1").await.unwrap().unwrap().content.as_deref(),
            Some("v1")
        );
        assert!(suggestion::get_suggestions_by_document(pool, "d1")
            .await
            .unwrap()
            .is_empty());

        let (status, body) = send_json(
            &app,
            request(
                Method::POST,
                "/api/document?id=d1",
                Some("u1"),
                Some(json!({"title": "Essay", "content": "v3"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["content"], "v3");
        assert_eq!(documents::get_documents_by_id(pool, "d1").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_models_and_selection() {
        let (app, _) = app().await;

        let (status, body) = send_json(&app, request(Method::GET, "/api/models", None, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["apiIdentifier"], "gpt-4o-mini");

        let response = app
            .clone()
            .oneshot(request(
                Method::POST,
                "/api/model",
                None,
                Some(json!({"modelId": "deepseek-chat"})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(cookie.starts_with("model-id=deepseek-chat"));

        let (status, _) = send(
            &app,
            request(Method::POST, "/api/model", None, Some(json!({"modelId": "gpt-2"}))),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
