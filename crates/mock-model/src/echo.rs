//! Echo model - answers with the last user message.

use async_trait::async_trait;
use chat_core::{
    most_recent_user_message, Completion, CompletionRequest, DeltaStream, FinishReason,
    LanguageModel, ModelError, StreamDelta,
};
use futures::stream::{self, StreamExt};

/// A model that echoes the most recent user message back.
///
/// Useful for exercising the chat flow without a provider.
#[derive(Debug, Clone)]
pub struct EchoModel {
    model_id: String,
    /// Optional prefix to add before the echo.
    prefix: Option<String>,
}

impl EchoModel {
    pub fn new() -> Self {
        Self {
            model_id: "echo".to_string(),
            prefix: None,
        }
    }

    /// Create an echo model with a custom prefix.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mock_model::EchoModel;
    ///
    /// let model = EchoModel::with_prefix("Echo: ");
    /// // Will respond with "Echo: <last user message>"
    /// ```
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
            ..Self::new()
        }
    }

    fn reply(&self, request: &CompletionRequest) -> String {
        let text = most_recent_user_message(&request.messages)
            .map(|message| message.text())
            .unwrap_or_default();
        match &self.prefix {
            Some(prefix) => format!("{}{}", prefix, text),
            None => text,
        }
    }
}

impl Default for EchoModel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LanguageModel for EchoModel {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn complete(&self, request: CompletionRequest) -> Result<Completion, ModelError> {
        Ok(Completion {
            text: self.reply(&request),
            tool_calls: Vec::new(),
            finish_reason: FinishReason::Stop,
            usage: None,
        })
    }

    async fn stream(&self, request: CompletionRequest) -> Result<DeltaStream, ModelError> {
        let deltas = vec![
            Ok(StreamDelta::TextDelta(self.reply(&request))),
            Ok(StreamDelta::Finish {
                reason: FinishReason::Stop,
                usage: None,
            }),
        ];
        Ok(stream::iter(deltas).boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chat_core::CoreMessage;

    #[tokio::test]
    async fn test_echo_last_user_message() {
        let model = EchoModel::with_prefix("Echo: ");
        let request = CompletionRequest::new(vec![
            CoreMessage::user("first"),
            CoreMessage::assistant("reply"),
            CoreMessage::user("second"),
        ]);

        let completion = model.complete(request).await.unwrap();
        assert_eq!(completion.text, "Echo: second");
        assert_eq!(completion.finish_reason, FinishReason::Stop);
    }

    #[tokio::test]
    async fn test_echo_stream() {
        let model = EchoModel::new();
        let deltas: Vec<_> = model
            .stream(CompletionRequest::new(vec![CoreMessage::user("Hello!")]))
            .await
            .unwrap()
            .collect()
            .await;

        assert_eq!(deltas.len(), 2);
        assert_eq!(
            deltas[0].as_ref().unwrap(),
            &StreamDelta::TextDelta("Hello!".to_string())
        );
    }
}
