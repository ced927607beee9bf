//! Traits implemented by language and image model backends.

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ModelError;
use crate::message::CoreMessage;
use crate::part::ToolCallPart;

/// A tool the model may call, described by a JSON schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseFormat {
    #[default]
    Text,
    /// Ask the provider for a single JSON value.
    Json,
}

/// Input for one model call.
#[derive(Debug, Clone, Default)]
pub struct CompletionRequest {
    pub system: Option<String>,
    pub messages: Vec<CoreMessage>,
    pub tools: Vec<ToolDefinition>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub response_format: ResponseFormat,
}

impl CompletionRequest {
    pub fn new(messages: Vec<CoreMessage>) -> Self {
        Self {
            messages,
            ..Default::default()
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn json(mut self) -> Self {
        self.response_format = ResponseFormat::Json;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FinishReason {
    Stop,
    Length,
    ToolCalls,
    ContentFilter,
    Error,
    Other,
}

impl FinishReason {
    /// Map an OpenAI-style `finish_reason` string.
    pub fn from_provider(reason: &str) -> Self {
        match reason {
            "stop" => FinishReason::Stop,
            "length" => FinishReason::Length,
            "tool_calls" | "function_call" => FinishReason::ToolCalls,
            "content_filter" => FinishReason::ContentFilter,
            _ => FinishReason::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl Usage {
    pub fn total(&self) -> u32 {
        self.prompt_tokens + self.completion_tokens
    }
}

/// A complete, non-streamed answer.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub text: String,
    pub tool_calls: Vec<ToolCallPart>,
    pub finish_reason: FinishReason,
    pub usage: Option<Usage>,
}

/// One increment of a streamed answer.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamDelta {
    TextDelta(String),
    /// A tool call, emitted once its arguments are complete.
    ToolCall(ToolCallPart),
    Finish {
        reason: FinishReason,
        usage: Option<Usage>,
    },
}

pub type DeltaStream = BoxStream<'static, Result<StreamDelta, ModelError>>;

/// A hosted language model.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Provider-side identifier of the model.
    fn model_id(&self) -> &str;

    async fn complete(&self, request: CompletionRequest) -> Result<Completion, ModelError>;

    async fn stream(&self, request: CompletionRequest) -> Result<DeltaStream, ModelError>;
}

/// A hosted image generation model.
#[async_trait]
pub trait ImageModel: Send + Sync {
    fn model_id(&self) -> &str;

    /// Generate one image and return it base64 encoded.
    async fn generate_image(&self, prompt: &str) -> Result<String, ModelError>;
}

/// Resolves provider-side model identifiers to model handles.
pub trait ModelProvider: Send + Sync {
    fn language_model(&self, api_identifier: &str) -> Result<Arc<dyn LanguageModel>, ModelError>;

    fn image_model(&self) -> Result<Arc<dyn ImageModel>, ModelError>;
}
