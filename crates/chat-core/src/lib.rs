//! Message model for the chat assistant.
//!
//! Message content travels through three shapes:
//!
//! - **Core messages** ([`CoreMessage`]) exchanged with the model provider,
//!   built from closed sets of typed content parts.
//! - **Stored content** ([`StoredContent`]) persisted as JSON, where binary
//!   data is base64 and tool arguments/results are JSON strings.
//! - **UI messages** ([`UiMessage`]) rendered by the browser, with tool
//!   calls and results folded into a single invocation.
//!
//! Everything here except the stream writer is pure and synchronous.
//!
//! # Example
//!
//! ```
//! use chat_core::{format_message_value, sanitize_response_messages, CoreMessage};
//! use serde_json::json;
//!
//! let stored = format_message_value(json!({"role": "user", "content": "Hello"})).unwrap();
//! assert_eq!(stored.to_value(), json!("Hello"));
//!
//! let kept = sanitize_response_messages(vec![CoreMessage::assistant("Hi!")]);
//! assert_eq!(kept.len(), 1);
//! ```

pub mod error;
pub mod format;
pub mod message;
pub mod model;
pub mod part;
pub mod sanitize;
pub mod stored;
pub mod stream;
pub mod ui;

pub use async_trait::async_trait;
pub use error::{FormatError, ModelError};
pub use format::{
    format_assistant_content, format_file_part, format_image_part, format_message_content,
    format_message_value, format_text_part, format_tool_call_part, format_tool_content,
    format_tool_result_part, format_user_content,
};
pub use message::{most_recent_user_message, AssistantContent, CoreMessage, Role, UserContent};
pub use model::{
    Completion, CompletionRequest, DeltaStream, FinishReason, ImageModel, LanguageModel,
    ModelProvider, ResponseFormat, StreamDelta, ToolDefinition, Usage,
};
pub use part::{
    AssistantPart, ContentPart, DataContent, FileData, FilePart, ImagePart, TextPart,
    ToolCallPart, ToolResultPart, UserPart,
};
pub use sanitize::sanitize_response_messages;
pub use stored::{StoredContent, StoredPart};
pub use stream::{DataPart, DataStreamWriter, StreamPart};
pub use ui::{
    convert_to_core_messages, convert_to_ui_messages, Attachment, InvocationState,
    StoredMessage, ToolInvocation, UiMessage,
};
