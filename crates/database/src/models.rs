//! Database models.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::FromRow;

/// A user known to the system, identified by the identity provider's id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: String,
    pub email: String,
    pub created_at: String,
}

/// Who can read a chat besides its owner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Private,
    Public,
    Team,
    Shared,
    Unlisted,
}

/// A conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    pub id: String,
    /// Owning profile.
    pub user_id: String,
    pub title: String,
    pub visibility: Visibility,
    pub created_at: String,
    pub updated_at: String,
}

/// A stored chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub chat_id: String,
    /// One of system, user, assistant, tool.
    pub role: String,
    /// Stored content: a JSON string or a list of typed parts.
    pub content: Json<Value>,
    /// Author, set for user messages.
    pub user_id: Option<String>,
    pub tokens: Option<i64>,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum DocumentKind {
    #[default]
    Text,
    Code,
    Image,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Text => "text",
            DocumentKind::Code => "code",
            DocumentKind::Image => "image",
        }
    }
}

/// One version of a document. Versions share `id` and differ by `created_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub created_at: String,
    pub title: String,
    pub content: Option<String>,
    pub kind: DocumentKind,
    pub user_id: String,
}

/// A proposed edit against one document version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub id: String,
    pub document_id: String,
    pub document_created_at: String,
    pub original_text: String,
    pub suggested_text: String,
    pub description: Option<String>,
    /// Stored for the client; nothing on the server changes it.
    pub is_resolved: bool,
    pub user_id: String,
    pub created_at: String,
}

/// At most one vote per message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub chat_id: String,
    pub message_id: String,
    pub is_upvoted: bool,
}
