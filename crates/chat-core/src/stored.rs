//! The JSON shape message content takes in storage.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::FormatError;
use crate::part::{json_kind, parse_body, part_tag};

/// One stored content part. Binary payloads are already base64 strings and
/// tool arguments/results are already JSON strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum StoredPart {
    Text {
        text: String,
        #[serde(
            default,
            rename = "experimental_providerMetadata",
            skip_serializing_if = "Option::is_none"
        )]
        provider_metadata: Option<Value>,
    },
    Image {
        /// URL string or base64 payload.
        image: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mime_type: Option<String>,
        #[serde(
            default,
            rename = "experimental_providerMetadata",
            skip_serializing_if = "Option::is_none"
        )]
        provider_metadata: Option<Value>,
    },
    File {
        data: String,
        mime_type: String,
        #[serde(
            default,
            rename = "experimental_providerMetadata",
            skip_serializing_if = "Option::is_none"
        )]
        provider_metadata: Option<Value>,
    },
    ToolCall {
        tool_call_id: String,
        tool_name: String,
        tool_args: String,
        #[serde(
            default,
            rename = "experimental_providerMetadata",
            skip_serializing_if = "Option::is_none"
        )]
        provider_metadata: Option<Value>,
    },
    ToolResult {
        tool_call_id: String,
        tool_name: String,
        result: String,
        #[serde(
            default,
            rename = "experimental_content",
            skip_serializing_if = "Option::is_none"
        )]
        content: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        is_error: Option<bool>,
        #[serde(
            default,
            rename = "experimental_providerMetadata",
            skip_serializing_if = "Option::is_none"
        )]
        provider_metadata: Option<Value>,
    },
}

impl StoredPart {
    /// Tags accepted in storage.
    pub const TYPES: [&'static str; 5] = ["text", "image", "file", "tool-call", "tool-result"];

    /// Parse a stored part, rejecting unknown tags with a typed error.
    pub fn from_value(value: Value) -> Result<Self, FormatError> {
        let tag = part_tag(&value)?;
        if !Self::TYPES.contains(&tag) {
            return Err(FormatError::UnknownPartType(tag.to_string()));
        }
        parse_body(value, "stored part")
    }
}

/// Stored message content: a plain string or an ordered list of parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredContent {
    Text(String),
    Parts(Vec<StoredPart>),
}

impl StoredContent {
    /// Parse stored JSON back into its exact content shape.
    pub fn from_value(value: Value) -> Result<Self, FormatError> {
        match value {
            Value::String(text) => Ok(StoredContent::Text(text)),
            Value::Array(items) => items
                .into_iter()
                .map(StoredPart::from_value)
                .collect::<Result<Vec<_>, _>>()
                .map(StoredContent::Parts),
            other => Err(FormatError::InvalidContent(format!(
                "stored content must be a string or a list of parts, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Convert into a JSON value for storage.
    pub fn to_value(&self) -> Value {
        match self {
            StoredContent::Text(text) => Value::String(text.clone()),
            StoredContent::Parts(parts) => Value::Array(
                parts
                    .iter()
                    .filter_map(|part| serde_json::to_value(part).ok())
                    .collect(),
            ),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            StoredContent::Text(text) => text.is_empty(),
            StoredContent::Parts(parts) => parts.is_empty(),
        }
    }
}
