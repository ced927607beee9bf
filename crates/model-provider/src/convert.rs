//! Translation between core messages and the provider's wire format.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chat_core::{
    AssistantContent, AssistantPart, CompletionRequest, CoreMessage, DataContent, FileData,
    FilePart, ImagePart, ResponseFormat as CoreResponseFormat, ToolCallPart, ToolDefinition,
    UserContent, UserPart,
};
use serde_json::Value;
use tracing::warn;

use crate::api_types::{
    self, ChatCompletionRequest, ChatMessage, ContentPart, FunctionCall, FunctionDefinition,
    ImageUrl, MessageContent, ResponseFormat, StreamOptions, Tool, ToolCall,
};

/// Build the wire request for `model` from a core request.
pub fn to_wire_request(model: &str, request: &CompletionRequest, stream: bool) -> ChatCompletionRequest {
    let mut messages = Vec::with_capacity(request.messages.len() + 1);
    if let Some(ref system) = request.system {
        messages.push(ChatMessage::system(system.clone()));
    }
    for message in &request.messages {
        push_message(&mut messages, message);
    }

    let tools = if request.tools.is_empty() {
        None
    } else {
        Some(request.tools.iter().map(to_wire_tool).collect())
    };

    ChatCompletionRequest {
        model: model.to_string(),
        messages,
        max_tokens: request.max_tokens,
        temperature: request.temperature,
        tools,
        response_format: match request.response_format {
            CoreResponseFormat::Text => None,
            CoreResponseFormat::Json => Some(ResponseFormat {
                format_type: "json_object",
            }),
        },
        stream: stream.then_some(true),
        stream_options: stream.then_some(StreamOptions {
            include_usage: true,
        }),
    }
}

fn push_message(out: &mut Vec<ChatMessage>, message: &CoreMessage) {
    match message {
        CoreMessage::System(text) => out.push(ChatMessage::system(text.clone())),
        CoreMessage::User(UserContent::Text(text)) => out.push(ChatMessage::user(text.clone())),
        CoreMessage::User(UserContent::Parts(parts)) => out.push(ChatMessage {
            role: "user".to_string(),
            content: Some(MessageContent::Parts(parts.iter().map(to_wire_part).collect())),
            tool_calls: None,
            tool_call_id: None,
        }),
        CoreMessage::Assistant(AssistantContent::Text(text)) => out.push(ChatMessage {
            role: "assistant".to_string(),
            content: Some(MessageContent::Text(text.clone())),
            tool_calls: None,
            tool_call_id: None,
        }),
        CoreMessage::Assistant(AssistantContent::Parts(parts)) => {
            let mut text = String::new();
            let mut calls = Vec::new();
            for part in parts {
                match part {
                    AssistantPart::Text(part) => text.push_str(&part.text),
                    AssistantPart::ToolCall(call) => calls.push(to_wire_call(call)),
                }
            }
            out.push(ChatMessage {
                role: "assistant".to_string(),
                content: (!text.is_empty()).then_some(MessageContent::Text(text)),
                tool_calls: (!calls.is_empty()).then_some(calls),
                tool_call_id: None,
            });
        }
        // The wire format wants one message per result.
        CoreMessage::Tool(results) => {
            for result in results {
                out.push(ChatMessage::tool(
                    result.tool_call_id.clone(),
                    stringify(&result.result),
                ));
            }
        }
    }
}

fn to_wire_part(part: &UserPart) -> ContentPart {
    match part {
        UserPart::Text(text) => ContentPart::Text {
            text: text.text.clone(),
        },
        UserPart::Image(image) => ContentPart::ImageUrl {
            image_url: ImageUrl {
                url: image_url(image),
            },
        },
        UserPart::File(file) => file_part(file),
    }
}

fn image_url(image: &ImagePart) -> String {
    let mime_type = image.mime_type.as_deref().unwrap_or("image/jpeg");
    match &image.image {
        DataContent::Url(url) => url.clone(),
        DataContent::Base64(data) => format!("data:{};base64,{}", mime_type, data),
        DataContent::Bytes(bytes) => format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes)),
    }
}

/// Text files are inlined as text; everything else is sent as a data URL.
fn file_part(file: &FilePart) -> ContentPart {
    let data_url = |bytes: &[u8]| format!("data:{};base64,{}", file.mime_type, STANDARD.encode(bytes));
    match &file.data {
        FileData::Text(text) if file.mime_type.starts_with("text/") => ContentPart::Text {
            text: text.clone(),
        },
        FileData::Json(value) => ContentPart::Text {
            text: value.to_string(),
        },
        FileData::Url(url) if !is_data_url(url) => {
            warn!(url = %url, "Remote file references are passed as text");
            ContentPart::Text { text: url.clone() }
        }
        FileData::Url(url) => ContentPart::File {
            file: api_types::FileData {
                file_data: url.clone(),
                filename: None,
            },
        },
        FileData::Text(text) => ContentPart::File {
            file: api_types::FileData {
                file_data: data_url(text.as_bytes()),
                filename: None,
            },
        },
        FileData::Bytes(bytes) => ContentPart::File {
            file: api_types::FileData {
                file_data: data_url(bytes),
                filename: None,
            },
        },
    }
}

fn is_data_url(url: &str) -> bool {
    url.get(..5)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("data:"))
}

fn to_wire_call(call: &ToolCallPart) -> ToolCall {
    ToolCall {
        id: call.tool_call_id.clone(),
        call_type: "function".to_string(),
        function: FunctionCall {
            name: call.tool_name.clone(),
            arguments: stringify(&call.args),
        },
    }
}

fn to_wire_tool(tool: &ToolDefinition) -> Tool {
    Tool {
        tool_type: "function",
        function: FunctionDefinition {
            name: tool.name.clone(),
            description: tool.description.clone(),
            parameters: tool.parameters.clone(),
        },
    }
}

/// Convert a wire tool call back into a core part.
pub fn from_wire_call(call: ToolCall) -> ToolCallPart {
    ToolCallPart::new(call.id, call.function.name, parse_arguments(&call.function.arguments))
}

/// Arguments arrive JSON encoded; undecodable text is kept as a string.
pub fn parse_arguments(arguments: &str) -> Value {
    if arguments.trim().is_empty() {
        return Value::Object(Default::default());
    }
    serde_json::from_str(arguments).unwrap_or_else(|_| Value::String(arguments.to_string()))
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chat_core::{TextPart, ToolResultPart};
    use serde_json::json;

    #[test]
    fn test_tool_round_trip_messages() {
        let request = CompletionRequest::new(vec![
            CoreMessage::user("weather in Berlin?"),
            CoreMessage::Assistant(AssistantContent::Parts(vec![
                AssistantPart::Text(TextPart::new("Checking.")),
                AssistantPart::ToolCall(ToolCallPart::new(
                    "call_1",
                    "getWeather",
                    json!({"latitude": 52.52, "longitude": 13.41}),
                )),
            ])),
            CoreMessage::Tool(vec![ToolResultPart::new("call_1", "getWeather", json!({"temp": 4}))]),
        ])
        .with_system("You are helpful.");

        let wire = to_wire_request("gpt-4o-mini", &request, false);
        let value = serde_json::to_value(&wire).unwrap();

        assert_eq!(value["messages"][0], json!({"role": "system", "content": "You are helpful."}));
        assert_eq!(value["messages"][2]["tool_calls"][0]["function"]["name"], "getWeather");
        assert_eq!(
            value["messages"][2]["tool_calls"][0]["function"]["arguments"],
            r#"{"latitude":52.52,"longitude":13.41}"#
        );
        assert_eq!(
            value["messages"][3],
            json!({"role": "tool", "content": "{\"temp\":4}", "tool_call_id": "call_1"})
        );
        assert!(value.get("stream").is_none());
        assert!(value.get("tools").is_none());
    }

    #[test]
    fn test_streaming_request_flags() {
        let request = CompletionRequest::new(vec![CoreMessage::user("hi")]).json();
        let value = serde_json::to_value(to_wire_request("m", &request, true)).unwrap();
        assert_eq!(value["stream"], json!(true));
        assert_eq!(value["stream_options"], json!({"include_usage": true}));
        assert_eq!(value["response_format"], json!({"type": "json_object"}));
    }

    #[test]
    fn test_image_parts_become_data_urls() {
        let request = CompletionRequest::new(vec![CoreMessage::User(UserContent::Parts(vec![
            UserPart::Text(TextPart::new("what is this?")),
            UserPart::Image(ImagePart {
                image: DataContent::Bytes(b"hi".to_vec()),
                mime_type: Some("image/png".to_string()),
                provider_metadata: None,
            }),
        ]))]);
        let value = serde_json::to_value(to_wire_request("m", &request, false)).unwrap();
        assert_eq!(
            value["messages"][0]["content"][1],
            json!({"type": "image_url", "image_url": {"url": "data:image/png;base64,aGk="}})
        );
    }

    #[test]
    fn test_parse_arguments() {
        assert_eq!(parse_arguments(r#"{"a":1}"#), json!({"a": 1}));
        assert_eq!(parse_arguments(""), json!({}));
        assert_eq!(parse_arguments("{broken"), json!("{broken"));
    }
}
