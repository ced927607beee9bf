//! Language and image models served over an OpenAI-compatible API.

use async_trait::async_trait;
use chat_core::{
    Completion, CompletionRequest, DeltaStream, FinishReason, ImageModel, LanguageModel,
    ModelError, Usage,
};
use reqwest::Client;
use reqwest_eventsource::retry::Never;
use reqwest_eventsource::RequestBuilderExt;
use tracing::{debug, info, warn};

use crate::api_types::{ChatCompletionResponse, ImageGenerationRequest, ImageGenerationResponse};
use crate::config::ProviderConfig;
use crate::convert::{from_wire_call, to_wire_request};
use crate::sse::{api_error, delta_stream};

/// Build the shared HTTP client.
pub fn http_client() -> Result<Client, ModelError> {
    Client::builder()
        .build()
        .map_err(|e| ModelError::Configuration(format!("Failed to create HTTP client: {}", e)))
}

/// A chat model behind `/v1/chat/completions`.
#[derive(Debug, Clone)]
pub struct OpenAiModel {
    client: Client,
    config: ProviderConfig,
    model: String,
}

impl OpenAiModel {
    pub fn new(client: Client, config: ProviderConfig, model: impl Into<String>) -> Self {
        Self {
            client,
            config,
            model: model.into(),
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.config.api_url)
    }
}

#[async_trait]
impl LanguageModel for OpenAiModel {
    fn model_id(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<Completion, ModelError> {
        let body = to_wire_request(&self.model, &request, false);
        debug!(model = %self.model, messages = body.messages.len(), "Sending completion request");

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ModelError::Network(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(api_error(status.as_u16(), &error_text));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ModelError::Decode(format!("Failed to parse response: {}", e)))?;

        let usage = completion.usage.map(|usage| {
            debug!(
                "Token usage - prompt: {}, completion: {}",
                usage.prompt_tokens, usage.completion_tokens
            );
            Usage {
                prompt_tokens: usage.prompt_tokens,
                completion_tokens: usage.completion_tokens,
            }
        });

        let Some(choice) = completion.choices.into_iter().next() else {
            warn!(model = %self.model, "Completion returned no choices");
            return Err(ModelError::Decode("response contained no choices".to_string()));
        };

        Ok(Completion {
            text: choice.message.content.unwrap_or_default(),
            tool_calls: choice
                .message
                .tool_calls
                .unwrap_or_default()
                .into_iter()
                .map(from_wire_call)
                .collect(),
            finish_reason: choice
                .finish_reason
                .as_deref()
                .map(FinishReason::from_provider)
                .unwrap_or(FinishReason::Stop),
            usage,
        })
    }

    async fn stream(&self, request: CompletionRequest) -> Result<DeltaStream, ModelError> {
        let body = to_wire_request(&self.model, &request, true);
        debug!(model = %self.model, messages = body.messages.len(), "Opening completion stream");

        let mut source = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .eventsource()
            .map_err(|e| ModelError::Configuration(format!("Failed to open stream: {}", e)))?;
        source.set_retry_policy(Box::new(Never));

        Ok(delta_stream(source))
    }
}

/// An image model behind `/v1/images/generations`.
#[derive(Debug, Clone)]
pub struct OpenAiImageModel {
    client: Client,
    config: ProviderConfig,
    model: String,
}

impl OpenAiImageModel {
    pub fn new(client: Client, config: ProviderConfig, model: impl Into<String>) -> Self {
        Self {
            client,
            config,
            model: model.into(),
        }
    }
}

#[async_trait]
impl ImageModel for OpenAiImageModel {
    fn model_id(&self) -> &str {
        &self.model
    }

    async fn generate_image(&self, prompt: &str) -> Result<String, ModelError> {
        let request = ImageGenerationRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            n: 1,
            size: "1024x1024",
            response_format: "b64_json",
        };

        info!(model = %self.model, "Generating image");

        let response = self
            .client
            .post(format!("{}/v1/images/generations", self.config.api_url))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ModelError::Network(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(api_error(status.as_u16(), &error_text));
        }

        let generated: ImageGenerationResponse = response
            .json()
            .await
            .map_err(|e| ModelError::Decode(format!("Failed to parse response: {}", e)))?;

        generated
            .data
            .into_iter()
            .find_map(|image| image.b64_json)
            .ok_or_else(|| ModelError::Decode("response contained no image data".to_string()))
    }
}
