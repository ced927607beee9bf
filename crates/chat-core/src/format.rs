//! Conversion of typed content into its storable JSON shape.
//!
//! All functions here are pure. Binary payloads become base64 strings and
//! provider-defined values (tool arguments, tool results, opaque file data)
//! become JSON strings, so that stored content never depends on how the
//! provider happened to type them.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::Value;

use crate::error::FormatError;
use crate::message::{AssistantContent, CoreMessage, UserContent};
use crate::part::{
    AssistantPart, DataContent, FileData, FilePart, ImagePart, TextPart, ToolCallPart,
    ToolResultPart, UserPart,
};
use crate::stored::{StoredContent, StoredPart};

pub fn format_text_part(part: &TextPart) -> StoredPart {
    StoredPart::Text {
        text: part.text.clone(),
        provider_metadata: part.provider_metadata.clone(),
    }
}

/// URL references keep their string form; inline data is base64 encoded.
pub fn format_image_part(part: &ImagePart) -> StoredPart {
    let image = match &part.image {
        DataContent::Url(url) => url.clone(),
        DataContent::Base64(data) => data.clone(),
        DataContent::Bytes(bytes) => STANDARD.encode(bytes),
    };

    StoredPart::Image {
        image,
        mime_type: part.mime_type.clone(),
        provider_metadata: part.provider_metadata.clone(),
    }
}

pub fn format_file_part(part: &FilePart) -> StoredPart {
    let data = match &part.data {
        FileData::Url(url) => url.clone(),
        FileData::Bytes(bytes) => STANDARD.encode(bytes),
        FileData::Text(text) => text.clone(),
        FileData::Json(value) => value.to_string(),
    };

    StoredPart::File {
        data,
        mime_type: part.mime_type.clone(),
        provider_metadata: part.provider_metadata.clone(),
    }
}

pub fn format_tool_call_part(part: &ToolCallPart) -> StoredPart {
    StoredPart::ToolCall {
        tool_call_id: part.tool_call_id.clone(),
        tool_name: part.tool_name.clone(),
        tool_args: stringify(&part.args),
        provider_metadata: part.provider_metadata.clone(),
    }
}

pub fn format_tool_result_part(part: &ToolResultPart) -> StoredPart {
    StoredPart::ToolResult {
        tool_call_id: part.tool_call_id.clone(),
        tool_name: part.tool_name.clone(),
        result: stringify(&part.result),
        content: part.content.clone(),
        is_error: part.is_error,
        provider_metadata: part.provider_metadata.clone(),
    }
}

pub fn format_user_content(content: &UserContent) -> StoredContent {
    match content {
        UserContent::Text(text) => StoredContent::Text(text.clone()),
        UserContent::Parts(parts) => StoredContent::Parts(
            parts
                .iter()
                .map(|part| match part {
                    UserPart::Text(text) => format_text_part(text),
                    UserPart::Image(image) => format_image_part(image),
                    UserPart::File(file) => format_file_part(file),
                })
                .collect(),
        ),
    }
}

pub fn format_assistant_content(content: &AssistantContent) -> StoredContent {
    match content {
        AssistantContent::Text(text) => StoredContent::Text(text.clone()),
        AssistantContent::Parts(parts) => StoredContent::Parts(
            parts
                .iter()
                .map(|part| match part {
                    AssistantPart::Text(text) => format_text_part(text),
                    AssistantPart::ToolCall(call) => format_tool_call_part(call),
                })
                .collect(),
        ),
    }
}

pub fn format_tool_content(results: &[ToolResultPart]) -> StoredContent {
    StoredContent::Parts(results.iter().map(format_tool_result_part).collect())
}

/// Format a message's content for storage, dispatching on its role.
pub fn format_message_content(message: &CoreMessage) -> StoredContent {
    match message {
        CoreMessage::System(text) => StoredContent::Text(text.clone()),
        CoreMessage::User(content) => format_user_content(content),
        CoreMessage::Assistant(content) => format_assistant_content(content),
        CoreMessage::Tool(results) => format_tool_content(results),
    }
}

/// Parse a raw `{role, content}` message and format it.
///
/// Fails without producing any output on an unknown role or part type.
pub fn format_message_value(message: Value) -> Result<StoredContent, FormatError> {
    CoreMessage::from_value(message).map(|message| format_message_content(&message))
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
