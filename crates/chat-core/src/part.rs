//! Typed content parts as produced by the browser or the model provider.
//!
//! A message's content is either a plain string or an ordered list of
//! parts. The full set of part kinds is closed ([`ContentPart`]); each role
//! accepts a subset of it ([`UserPart`], [`AssistantPart`], and
//! [`ToolResultPart`] for tool messages).

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::error::FormatError;

/// An image payload: a URL reference or inline data.
#[derive(Debug, Clone, PartialEq)]
pub enum DataContent {
    /// Absolute `http`, `https` or `data` URL, exactly as submitted.
    Url(String),
    /// Inline payload that is already base64 encoded.
    Base64(String),
    /// Raw bytes.
    Bytes(Vec<u8>),
}

impl DataContent {
    /// Classify a string payload: URL references stay URLs, everything else
    /// is taken to be base64 data.
    pub fn from_string(value: impl Into<String>) -> Self {
        let value = value.into();
        if is_url_reference(&value) {
            DataContent::Url(value)
        } else {
            DataContent::Base64(value)
        }
    }
}

impl<'de> Deserialize<'de> for DataContent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::String(text) => Ok(DataContent::from_string(text)),
            Value::Array(items) => bytes_from_array(&items)
                .map(DataContent::Bytes)
                .ok_or_else(|| de::Error::custom("expected an array of bytes")),
            other => Err(de::Error::custom(format!(
                "expected a string or byte array, got {}",
                json_kind(&other)
            ))),
        }
    }
}

/// A file payload. Unlike images, files may also carry arbitrary JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum FileData {
    /// Kept verbatim, like [`DataContent::Url`].
    Url(String),
    Bytes(Vec<u8>),
    Text(String),
    Json(Value),
}

impl<'de> Deserialize<'de> for FileData {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(text) if is_url_reference(&text) => FileData::Url(text),
            Value::String(text) => FileData::Text(text),
            Value::Array(items) => match bytes_from_array(&items) {
                Some(bytes) => FileData::Bytes(bytes),
                None => FileData::Json(Value::Array(items)),
            },
            other => FileData::Json(other),
        })
    }
}

/// Plain text.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TextPart {
    pub text: String,
    #[serde(default, rename = "experimental_providerMetadata")]
    pub provider_metadata: Option<Value>,
}

impl TextPart {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            provider_metadata: None,
        }
    }
}

/// An image given by URL or inline data.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePart {
    pub image: DataContent,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default, rename = "experimental_providerMetadata")]
    pub provider_metadata: Option<Value>,
}

/// A file attachment; the mime type is mandatory.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilePart {
    pub data: FileData,
    pub mime_type: String,
    #[serde(default, rename = "experimental_providerMetadata")]
    pub provider_metadata: Option<Value>,
}

/// A tool invocation requested by the model.
///
/// `args` is whatever the provider sent; it is not assumed to be an object.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallPart {
    pub tool_call_id: String,
    pub tool_name: String,
    #[serde(default)]
    pub args: Value,
    #[serde(default, rename = "experimental_providerMetadata")]
    pub provider_metadata: Option<Value>,
}

impl ToolCallPart {
    pub fn new(tool_call_id: impl Into<String>, tool_name: impl Into<String>, args: Value) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            tool_name: tool_name.into(),
            args,
            provider_metadata: None,
        }
    }
}

/// The outcome of a tool invocation, paired to its call by `tool_call_id`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResultPart {
    pub tool_call_id: String,
    pub tool_name: String,
    #[serde(default)]
    pub result: Value,
    /// Extended multi-part result content, passed through untouched.
    #[serde(default, rename = "experimental_content")]
    pub content: Option<Value>,
    #[serde(default)]
    pub is_error: Option<bool>,
    #[serde(default, rename = "experimental_providerMetadata")]
    pub provider_metadata: Option<Value>,
}

impl ToolResultPart {
    pub fn new(tool_call_id: impl Into<String>, tool_name: impl Into<String>, result: Value) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            tool_name: tool_name.into(),
            result,
            content: None,
            is_error: None,
            provider_metadata: None,
        }
    }

    /// Mark this result as a failed execution.
    pub fn into_error(mut self) -> Self {
        self.is_error = Some(true);
        self
    }
}

/// Every kind of content part.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentPart {
    Text(TextPart),
    Image(ImagePart),
    File(FilePart),
    ToolCall(ToolCallPart),
    ToolResult(ToolResultPart),
}

impl ContentPart {
    /// The wire tag of this part.
    pub fn part_type(&self) -> &'static str {
        match self {
            ContentPart::Text(_) => "text",
            ContentPart::Image(_) => "image",
            ContentPart::File(_) => "file",
            ContentPart::ToolCall(_) => "tool-call",
            ContentPart::ToolResult(_) => "tool-result",
        }
    }

    /// Parse one part from JSON, dispatching on its `type` tag.
    pub fn from_value(value: Value) -> Result<Self, FormatError> {
        let tag = part_tag(&value)?.to_string();
        match tag.as_str() {
            "text" => parse_body(value, "text part").map(ContentPart::Text),
            "image" => parse_body(value, "image part").map(ContentPart::Image),
            "file" => parse_body(value, "file part").map(ContentPart::File),
            "tool-call" => parse_body(value, "tool-call part").map(ContentPart::ToolCall),
            "tool-result" => parse_body(value, "tool-result part").map(ContentPart::ToolResult),
            _ => Err(FormatError::UnknownPartType(tag)),
        }
    }
}

/// Parts a user message may contain.
#[derive(Debug, Clone, PartialEq)]
pub enum UserPart {
    Text(TextPart),
    Image(ImagePart),
    File(FilePart),
}

impl TryFrom<ContentPart> for UserPart {
    type Error = FormatError;

    fn try_from(part: ContentPart) -> Result<Self, Self::Error> {
        match part {
            ContentPart::Text(text) => Ok(UserPart::Text(text)),
            ContentPart::Image(image) => Ok(UserPart::Image(image)),
            ContentPart::File(file) => Ok(UserPart::File(file)),
            other => Err(FormatError::UnknownPartType(other.part_type().to_string())),
        }
    }
}

/// Parts an assistant message may contain.
#[derive(Debug, Clone, PartialEq)]
pub enum AssistantPart {
    Text(TextPart),
    ToolCall(ToolCallPart),
}

impl TryFrom<ContentPart> for AssistantPart {
    type Error = FormatError;

    fn try_from(part: ContentPart) -> Result<Self, Self::Error> {
        match part {
            ContentPart::Text(text) => Ok(AssistantPart::Text(text)),
            ContentPart::ToolCall(call) => Ok(AssistantPart::ToolCall(call)),
            other => Err(FormatError::UnknownPartType(other.part_type().to_string())),
        }
    }
}

impl TryFrom<ContentPart> for ToolResultPart {
    type Error = FormatError;

    fn try_from(part: ContentPart) -> Result<Self, Self::Error> {
        match part {
            ContentPart::ToolResult(result) => Ok(result),
            other => Err(FormatError::UnknownPartType(other.part_type().to_string())),
        }
    }
}

/// Read the `type` tag of a JSON part.
pub(crate) fn part_tag(value: &Value) -> Result<&str, FormatError> {
    value
        .get("type")
        .and_then(Value::as_str)
        .ok_or(FormatError::MissingField("type"))
}

pub(crate) fn parse_body<T: DeserializeOwned>(
    value: Value,
    what: &'static str,
) -> Result<T, FormatError> {
    serde_json::from_value(value).map_err(|source| FormatError::Malformed { what, source })
}

/// Whether `value` is an absolute http(s) or data URL. Only used to
/// classify; the parsed form is normalized and never stored.
pub(crate) fn is_url_reference(value: &str) -> bool {
    Url::parse(value)
        .map(|url| matches!(url.scheme(), "http" | "https" | "data"))
        .unwrap_or(false)
}

fn bytes_from_array(items: &[Value]) -> Option<Vec<u8>> {
    items
        .iter()
        .map(|item| item.as_u64().and_then(|n| u8::try_from(n).ok()))
        .collect()
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_text_part() {
        let part = ContentPart::from_value(json!({"type": "text", "text": "hi"})).unwrap();
        assert_eq!(part, ContentPart::Text(TextPart::new("hi")));
    }

    #[test]
    fn test_unknown_tag_is_an_error() {
        let err = ContentPart::from_value(json!({"type": "reasoning", "text": "hmm"})).unwrap_err();
        assert!(matches!(err, FormatError::UnknownPartType(ref t) if t == "reasoning"));
    }

    #[test]
    fn test_missing_tag_is_an_error() {
        let err = ContentPart::from_value(json!({"text": "hi"})).unwrap_err();
        assert!(matches!(err, FormatError::MissingField("type")));
    }

    #[test]
    fn test_image_classification() {
        let url = ContentPart::from_value(json!({
            "type": "image",
            "image": "https://example.com/cat.png"
        }))
        .unwrap();
        let ContentPart::Image(url) = url else { panic!("expected image") };
        assert_eq!(url.image, DataContent::Url("https://example.com/cat.png".to_string()));

        let inline = ContentPart::from_value(json!({
            "type": "image",
            "image": "aGVsbG8=",
            "mimeType": "image/png"
        }))
        .unwrap();
        let ContentPart::Image(inline) = inline else { panic!("expected image") };
        assert_eq!(inline.image, DataContent::Base64("aGVsbG8=".to_string()));
        assert_eq!(inline.mime_type.as_deref(), Some("image/png"));

        let bytes = ContentPart::from_value(json!({"type": "image", "image": [1, 2, 255]})).unwrap();
        let ContentPart::Image(bytes) = bytes else { panic!("expected image") };
        assert_eq!(bytes.image, DataContent::Bytes(vec![1, 2, 255]));
    }

    #[test]
    fn test_file_data_falls_back_to_json() {
        let part = ContentPart::from_value(json!({
            "type": "file",
            "data": {"rows": [1, 2]},
            "mimeType": "application/json"
        }))
        .unwrap();
        let ContentPart::File(file) = part else { panic!("expected file") };
        assert_eq!(file.data, FileData::Json(json!({"rows": [1, 2]})));
    }

    #[test]
    fn test_file_requires_mime_type() {
        let err = ContentPart::from_value(json!({"type": "file", "data": "abc"})).unwrap_err();
        assert!(matches!(err, FormatError::Malformed { .. }));
    }

    #[test]
    fn test_role_restriction() {
        let call = ContentPart::ToolCall(ToolCallPart::new("c1", "getWeather", json!({})));
        assert!(matches!(
            UserPart::try_from(call.clone()),
            Err(FormatError::UnknownPartType(ref t)) if t == "tool-call"
        ));
        assert!(AssistantPart::try_from(call).is_ok());
    }
}
