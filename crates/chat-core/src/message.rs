//! Core messages: one role plus role-appropriate content.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::FormatError;
use crate::part::{json_kind, AssistantPart, ContentPart, TextPart, ToolResultPart, UserPart};

/// Message author role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "system" => Ok(Role::System),
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            "tool" => Ok(Role::Tool),
            other => Err(FormatError::UnknownRole(other.to_string())),
        }
    }
}

/// Content of a user message.
#[derive(Debug, Clone, PartialEq)]
pub enum UserContent {
    Text(String),
    Parts(Vec<UserPart>),
}

/// Content of an assistant message.
#[derive(Debug, Clone, PartialEq)]
pub enum AssistantContent {
    Text(String),
    Parts(Vec<AssistantPart>),
}

/// A message as exchanged with the model provider.
#[derive(Debug, Clone, PartialEq)]
pub enum CoreMessage {
    System(String),
    User(UserContent),
    Assistant(AssistantContent),
    Tool(Vec<ToolResultPart>),
}

impl CoreMessage {
    pub fn system(text: impl Into<String>) -> Self {
        CoreMessage::System(text.into())
    }

    pub fn user(text: impl Into<String>) -> Self {
        CoreMessage::User(UserContent::Text(text.into()))
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        CoreMessage::Assistant(AssistantContent::Text(text.into()))
    }

    pub fn role(&self) -> Role {
        match self {
            CoreMessage::System(_) => Role::System,
            CoreMessage::User(_) => Role::User,
            CoreMessage::Assistant(_) => Role::Assistant,
            CoreMessage::Tool(_) => Role::Tool,
        }
    }

    /// True when the message carries no content at all.
    pub fn is_empty(&self) -> bool {
        match self {
            CoreMessage::System(text) => text.is_empty(),
            CoreMessage::User(UserContent::Text(text))
            | CoreMessage::Assistant(AssistantContent::Text(text)) => text.is_empty(),
            CoreMessage::User(UserContent::Parts(parts)) => parts.is_empty(),
            CoreMessage::Assistant(AssistantContent::Parts(parts)) => parts.is_empty(),
            CoreMessage::Tool(results) => results.is_empty(),
        }
    }

    /// Concatenated text of all text content.
    pub fn text(&self) -> String {
        match self {
            CoreMessage::System(text) => text.clone(),
            CoreMessage::User(UserContent::Text(text))
            | CoreMessage::Assistant(AssistantContent::Text(text)) => text.clone(),
            CoreMessage::User(UserContent::Parts(parts)) => parts
                .iter()
                .filter_map(|part| match part {
                    UserPart::Text(TextPart { text, .. }) => Some(text.as_str()),
                    _ => None,
                })
                .collect(),
            CoreMessage::Assistant(AssistantContent::Parts(parts)) => parts
                .iter()
                .filter_map(|part| match part {
                    AssistantPart::Text(TextPart { text, .. }) => Some(text.as_str()),
                    _ => None,
                })
                .collect(),
            CoreMessage::Tool(_) => String::new(),
        }
    }

    /// Parse a `{role, content}` JSON object.
    ///
    /// An unknown role or a part outside the role's allowed set is an error.
    pub fn from_value(value: Value) -> Result<Self, FormatError> {
        let role: Role = value
            .get("role")
            .and_then(Value::as_str)
            .ok_or(FormatError::MissingField("role"))?
            .parse()?;
        let content = match value {
            Value::Object(mut map) => map.remove("content").unwrap_or(Value::Null),
            _ => Value::Null,
        };

        match role {
            Role::System => match content {
                Value::String(text) => Ok(CoreMessage::System(text)),
                other => Err(FormatError::InvalidContent(format!(
                    "system content must be a string, got {}",
                    json_kind(&other)
                ))),
            },
            Role::User => match content {
                Value::String(text) => Ok(CoreMessage::User(UserContent::Text(text))),
                Value::Array(items) => parse_parts(items)
                    .map(|parts| CoreMessage::User(UserContent::Parts(parts))),
                other => Err(unexpected(role, &other)),
            },
            Role::Assistant => match content {
                Value::String(text) => Ok(CoreMessage::Assistant(AssistantContent::Text(text))),
                Value::Array(items) => parse_parts(items)
                    .map(|parts| CoreMessage::Assistant(AssistantContent::Parts(parts))),
                other => Err(unexpected(role, &other)),
            },
            Role::Tool => match content {
                Value::Array(items) => parse_parts(items).map(CoreMessage::Tool),
                other => Err(FormatError::InvalidContent(format!(
                    "tool content must be a list of tool results, got {}",
                    json_kind(&other)
                ))),
            },
        }
    }
}

fn parse_parts<T>(items: Vec<Value>) -> Result<Vec<T>, FormatError>
where
    T: TryFrom<ContentPart, Error = FormatError>,
{
    items
        .into_iter()
        .map(|item| ContentPart::from_value(item).and_then(T::try_from))
        .collect()
}

fn unexpected(role: Role, value: &Value) -> FormatError {
    FormatError::InvalidContent(format!(
        "{} content must be a string or a list of parts, got {}",
        role,
        json_kind(value)
    ))
}

/// The last user message in a history, if any.
pub fn most_recent_user_message(messages: &[CoreMessage]) -> Option<&CoreMessage> {
    messages
        .iter()
        .rev()
        .find(|message| message.role() == Role::User)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_role_parse() {
        assert_eq!("tool".parse::<Role>().unwrap(), Role::Tool);
        assert!(matches!(
            "function".parse::<Role>(),
            Err(FormatError::UnknownRole(ref r)) if r == "function"
        ));
    }

    #[test]
    fn test_parse_user_string() {
        let message = CoreMessage::from_value(json!({"role": "user", "content": "Hello"})).unwrap();
        assert_eq!(message, CoreMessage::user("Hello"));
    }

    #[test]
    fn test_parse_assistant_parts() {
        let message = CoreMessage::from_value(json!({
            "role": "assistant",
            "content": [
                {"type": "text", "text": "Checking"},
                {"type": "tool-call", "toolCallId": "c1", "toolName": "getWeather", "args": {"latitude": 1}}
            ]
        }))
        .unwrap();
        assert_eq!(message.role(), Role::Assistant);
        assert_eq!(message.text(), "Checking");
    }

    #[test]
    fn test_assistant_rejects_image() {
        let err = CoreMessage::from_value(json!({
            "role": "assistant",
            "content": [{"type": "image", "image": "aGVsbG8="}]
        }))
        .unwrap_err();
        assert!(matches!(err, FormatError::UnknownPartType(ref t) if t == "image"));
    }

    #[test]
    fn test_tool_requires_results() {
        let err = CoreMessage::from_value(json!({
            "role": "tool",
            "content": [{"type": "text", "text": "nope"}]
        }))
        .unwrap_err();
        assert!(matches!(err, FormatError::UnknownPartType(ref t) if t == "text"));
    }

    #[test]
    fn test_most_recent_user_message() {
        let messages = vec![
            CoreMessage::user("first"),
            CoreMessage::assistant("reply"),
            CoreMessage::user("second"),
            CoreMessage::assistant("another"),
        ];
        let found = most_recent_user_message(&messages).unwrap();
        assert_eq!(found.text(), "second");
        assert!(most_recent_user_message(&[CoreMessage::system("x")]).is_none());
    }
}
