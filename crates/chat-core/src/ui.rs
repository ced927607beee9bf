//! UI-facing messages: rebuilt from storage for display, and converted back
//! into core messages when the browser posts a conversation.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::FormatError;
use crate::message::{AssistantContent, CoreMessage, Role, UserContent};
use crate::part::{
    is_url_reference, AssistantPart, DataContent, FileData, FilePart, ImagePart, TextPart,
    ToolCallPart, ToolResultPart, UserPart,
};
use crate::stored::{StoredContent, StoredPart};

/// A stored message row, borrowed from whatever persistence layer loaded it.
#[derive(Debug, Clone, Copy)]
pub struct StoredMessage<'a> {
    pub id: &'a str,
    pub role: &'a str,
    pub content: &'a Value,
    pub created_at: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvocationState {
    /// The model asked for the tool; no result has arrived.
    Call,
    Result,
}

/// One tool usage as the UI renders it: the call, and its result once known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolInvocation {
    pub state: InvocationState,
    pub tool_call_id: String,
    pub tool_name: String,
    #[serde(default)]
    pub args: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiMessage {
    pub id: String,
    pub role: Role,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_invocations: Vec<ToolInvocation>,
    #[serde(
        default,
        rename = "experimental_attachments",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub attachments: Vec<Attachment>,
}

impl UiMessage {
    pub fn new(id: impl Into<String>, role: Role, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role,
            content: content.into(),
            created_at: None,
            tool_invocations: Vec::new(),
            attachments: Vec::new(),
        }
    }
}

/// Rebuild the chronological UI list from rows stored newest-first.
///
/// Tool rows do not become UI messages of their own: each result is folded
/// into the earlier invocation with the same call id. Invocations that never
/// receive a result stay in the `call` state.
pub fn convert_to_ui_messages(rows: &[StoredMessage<'_>]) -> Result<Vec<UiMessage>, FormatError> {
    let mut messages: Vec<UiMessage> = Vec::with_capacity(rows.len());

    for row in rows.iter().rev() {
        let role: Role = row.role.parse()?;
        let content = StoredContent::from_value(row.content.clone())?;

        if role == Role::Tool {
            let StoredContent::Parts(parts) = content else {
                return Err(FormatError::InvalidContent(
                    "tool message content must be a list of tool results".to_string(),
                ));
            };
            for part in parts {
                match part {
                    StoredPart::ToolResult {
                        tool_call_id,
                        result,
                        is_error,
                        ..
                    } => resolve_invocation(&mut messages, &tool_call_id, &result, is_error),
                    other => {
                        return Err(FormatError::UnknownPartType(stored_tag(&other).to_string()))
                    }
                }
            }
            continue;
        }

        let mut message = UiMessage::new(row.id, role, String::new());
        message.created_at = Some(row.created_at.to_string());

        match content {
            StoredContent::Text(text) => message.content = text,
            StoredContent::Parts(parts) => {
                for part in parts {
                    match part {
                        StoredPart::Text { text, .. } => message.content.push_str(&text),
                        StoredPart::Image {
                            image, mime_type, ..
                        } => message.attachments.push(Attachment {
                            url: attachment_url(&image, mime_type.as_deref()),
                            name: None,
                            content_type: mime_type,
                        }),
                        StoredPart::File {
                            data, mime_type, ..
                        } => message.attachments.push(Attachment {
                            url: attachment_url(&data, Some(&mime_type)),
                            name: None,
                            content_type: Some(mime_type),
                        }),
                        StoredPart::ToolCall {
                            tool_call_id,
                            tool_name,
                            tool_args,
                            ..
                        } => message.tool_invocations.push(ToolInvocation {
                            state: InvocationState::Call,
                            tool_call_id,
                            tool_name,
                            args: parse_stringified(&tool_args),
                            result: None,
                            is_error: None,
                        }),
                        StoredPart::ToolResult { .. } => {
                            return Err(FormatError::UnknownPartType("tool-result".to_string()))
                        }
                    }
                }
            }
        }

        messages.push(message);
    }

    Ok(messages)
}

/// Convert messages posted by the browser into model input.
///
/// Attachments become image or file parts. Resolved tool invocations become
/// an assistant tool-call message followed by a tool message; invocations
/// still in the `call` state are left out since the model cannot be given a
/// call without its result.
pub fn convert_to_core_messages(messages: &[UiMessage]) -> Vec<CoreMessage> {
    let mut core = Vec::with_capacity(messages.len());

    for message in messages {
        match message.role {
            Role::System => core.push(CoreMessage::System(message.content.clone())),
            Role::User => {
                if message.attachments.is_empty() {
                    core.push(CoreMessage::user(message.content.clone()));
                    continue;
                }
                let mut parts = Vec::with_capacity(message.attachments.len() + 1);
                if !message.content.is_empty() {
                    parts.push(UserPart::Text(TextPart::new(message.content.clone())));
                }
                parts.extend(message.attachments.iter().map(attachment_part));
                core.push(CoreMessage::User(UserContent::Parts(parts)));
            }
            Role::Assistant => {
                let resolved: Vec<&ToolInvocation> = message
                    .tool_invocations
                    .iter()
                    .filter(|invocation| invocation.state == InvocationState::Result)
                    .collect();

                if resolved.is_empty() {
                    core.push(CoreMessage::assistant(message.content.clone()));
                    continue;
                }

                let mut parts = Vec::with_capacity(resolved.len() + 1);
                if !message.content.is_empty() {
                    parts.push(AssistantPart::Text(TextPart::new(message.content.clone())));
                }
                parts.extend(resolved.iter().map(|invocation| {
                    AssistantPart::ToolCall(ToolCallPart::new(
                        invocation.tool_call_id.clone(),
                        invocation.tool_name.clone(),
                        invocation.args.clone(),
                    ))
                }));
                core.push(CoreMessage::Assistant(AssistantContent::Parts(parts)));

                core.push(CoreMessage::Tool(
                    resolved
                        .iter()
                        .map(|invocation| ToolResultPart {
                            is_error: invocation.is_error,
                            ..ToolResultPart::new(
                                invocation.tool_call_id.clone(),
                                invocation.tool_name.clone(),
                                invocation.result.clone().unwrap_or(Value::Null),
                            )
                        })
                        .collect(),
                ));
            }
            Role::Tool => {
                debug!(message_id = %message.id, "Ignoring tool-role message from client");
            }
        }
    }

    core
}

fn resolve_invocation(
    messages: &mut [UiMessage],
    tool_call_id: &str,
    result: &str,
    is_error: Option<bool>,
) {
    let invocation = messages
        .iter_mut()
        .rev()
        .flat_map(|message| message.tool_invocations.iter_mut())
        .find(|invocation| invocation.tool_call_id == tool_call_id);

    match invocation {
        Some(invocation) => {
            invocation.state = InvocationState::Result;
            invocation.result = Some(parse_stringified(result));
            invocation.is_error = is_error;
        }
        None => debug!(tool_call_id, "Tool result has no matching call"),
    }
}

/// Undo the stringification applied when formatting; strings that are not
/// JSON were stored verbatim and stay strings.
fn parse_stringified(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// URL references are used as-is; inline payloads are wrapped in a data URL.
fn attachment_url(payload: &str, mime_type: Option<&str>) -> String {
    if is_url_reference(payload) {
        return payload.to_string();
    }
    let mime_type = mime_type.unwrap_or("application/octet-stream");
    if STANDARD.decode(payload).is_ok() {
        format!("data:{};base64,{}", mime_type, payload)
    } else {
        format!("data:{};base64,{}", mime_type, STANDARD.encode(payload))
    }
}

fn attachment_part(attachment: &Attachment) -> UserPart {
    match attachment.content_type.as_deref() {
        Some(content_type) if content_type.starts_with("image/") => UserPart::Image(ImagePart {
            image: DataContent::from_string(attachment.url.clone()),
            mime_type: Some(content_type.to_string()),
            provider_metadata: None,
        }),
        content_type => UserPart::File(FilePart {
            data: if is_url_reference(&attachment.url) {
                FileData::Url(attachment.url.clone())
            } else {
                FileData::Text(attachment.url.clone())
            },
            mime_type: content_type.unwrap_or("application/octet-stream").to_string(),
            provider_metadata: None,
        }),
    }
}

fn stored_tag(part: &StoredPart) -> &'static str {
    match part {
        StoredPart::Text { .. } => "text",
        StoredPart::Image { .. } => "image",
        StoredPart::File { .. } => "file",
        StoredPart::ToolCall { .. } => "tool-call",
        StoredPart::ToolResult { .. } => "tool-result",
    }
}
