//! Scripted model - plays back a fixed sequence of turns.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use chat_core::{
    Completion, CompletionRequest, DeltaStream, FinishReason, LanguageModel, ModelError,
    StreamDelta, ToolCallPart,
};
use futures::stream::{self, StreamExt};
use serde_json::Value;
use tokio::sync::Mutex;

/// One scripted model call.
#[derive(Debug, Clone)]
pub enum Step {
    /// Stream these deltas.
    Deltas(Vec<StreamDelta>),
    /// Fail the call.
    Error(String),
}

/// A model that answers each call with the next scripted step and records
/// every request it receives.
///
/// Calls beyond the end of the script fail with a stream error.
#[derive(Debug, Clone)]
pub struct ScriptedModel {
    model_id: String,
    steps: Arc<Mutex<VecDeque<Step>>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl ScriptedModel {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            steps: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Append a step that streams `text` word by word and stops.
    pub fn then_text(self, text: &str) -> Self {
        let mut deltas: Vec<StreamDelta> = text
            .split_inclusive(' ')
            .map(|word| StreamDelta::TextDelta(word.to_string()))
            .collect();
        deltas.push(finish(FinishReason::Stop));
        self.then(Step::Deltas(deltas))
    }

    /// Append a step that calls one tool.
    pub fn then_tool_call(self, tool_call_id: &str, tool_name: &str, args: Value) -> Self {
        self.then(Step::Deltas(vec![
            StreamDelta::ToolCall(ToolCallPart::new(tool_call_id, tool_name, args)),
            finish(FinishReason::ToolCalls),
        ]))
    }

    /// Append a step that fails.
    pub fn then_error(self, message: &str) -> Self {
        self.then(Step::Error(message.to_string()))
    }

    pub fn then(self, step: Step) -> Self {
        // Builder runs before the model is shared.
        if let Ok(mut steps) = self.steps.try_lock() {
            steps.push_back(step);
        }
        self
    }

    /// Requests received so far, in call order.
    pub async fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().await.clone()
    }

    /// Steps not yet played.
    pub async fn remaining(&self) -> usize {
        self.steps.lock().await.len()
    }

    async fn next_step(&self, request: CompletionRequest) -> Result<Vec<StreamDelta>, ModelError> {
        self.requests.lock().await.push(request);
        match self.steps.lock().await.pop_front() {
            Some(Step::Deltas(deltas)) => Ok(deltas),
            Some(Step::Error(message)) => Err(ModelError::Stream(message)),
            None => Err(ModelError::Stream(format!(
                "{}: script exhausted",
                self.model_id
            ))),
        }
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn complete(&self, request: CompletionRequest) -> Result<Completion, ModelError> {
        let mut completion = Completion {
            text: String::new(),
            tool_calls: Vec::new(),
            finish_reason: FinishReason::Stop,
            usage: None,
        };
        for delta in self.next_step(request).await? {
            match delta {
                StreamDelta::TextDelta(text) => completion.text.push_str(&text),
                StreamDelta::ToolCall(call) => completion.tool_calls.push(call),
                StreamDelta::Finish { reason, usage } => {
                    completion.finish_reason = reason;
                    completion.usage = usage;
                }
            }
        }
        Ok(completion)
    }

    async fn stream(&self, request: CompletionRequest) -> Result<DeltaStream, ModelError> {
        let deltas = self.next_step(request).await?;
        Ok(stream::iter(deltas.into_iter().map(Ok)).boxed())
    }
}

fn finish(reason: FinishReason) -> StreamDelta {
    StreamDelta::Finish {
        reason,
        usage: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chat_core::CoreMessage;
    use serde_json::json;

    #[tokio::test]
    async fn test_plays_steps_in_order() {
        let model = ScriptedModel::new("scripted")
            .then_tool_call("c1", "getWeather", json!({"latitude": 1}))
            .then_text("It is sunny.");

        let first = model
            .complete(CompletionRequest::new(vec![CoreMessage::user("weather?")]))
            .await
            .unwrap();
        assert_eq!(first.finish_reason, FinishReason::ToolCalls);
        assert_eq!(first.tool_calls[0].tool_name, "getWeather");

        let deltas: Vec<_> = model
            .stream(CompletionRequest::new(vec![]))
            .await
            .unwrap()
            .collect()
            .await;
        let text: String = deltas
            .into_iter()
            .filter_map(|delta| match delta.unwrap() {
                StreamDelta::TextDelta(text) => Some(text),
                _ => None,
            })
            .collect();
        assert_eq!(text, "It is sunny.");

        assert_eq!(model.requests().await.len(), 2);
        assert_eq!(model.remaining().await, 0);
    }

    #[tokio::test]
    async fn test_exhausted_and_error_steps() {
        let model = ScriptedModel::new("scripted").then_error("boom");

        let err = model.complete(CompletionRequest::default()).await.unwrap_err();
        assert!(matches!(err, ModelError::Stream(ref m) if m == "boom"));

        let err = model.complete(CompletionRequest::default()).await.unwrap_err();
        assert!(matches!(err, ModelError::Stream(ref m) if m.contains("exhausted")));
    }
}
