//! Runs one chat turn: streamed model calls with tool round trips, then
//! persistence of the response.

use std::sync::Arc;

use chat_core::{
    format_message_content, sanitize_response_messages, AssistantContent, AssistantPart,
    CompletionRequest, CoreMessage, DataPart, DataStreamWriter, FinishReason, LanguageModel,
    ModelError, Role, StreamDelta, StreamPart, TextPart, ToolCallPart, Usage,
};
use chat_tools::{prompts, ToolContext};
use database::{message, timestamp, Json, Message};
use futures::StreamExt;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::state::AppState;

/// Everything the runner needs to know about the turn.
pub struct Turn {
    pub chat_id: String,
    pub user_id: String,
    /// Id the user message was saved under.
    pub user_message_id: String,
    pub model: Arc<dyn LanguageModel>,
    /// The conversation so far, ending with the user message.
    pub messages: Vec<CoreMessage>,
}

#[derive(Debug, Error)]
enum TurnError {
    #[error("client disconnected")]
    Disconnected,

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// What the model produced over all steps.
#[derive(Debug, Default)]
struct TurnOutput {
    response: Vec<CoreMessage>,
    finish_reason: Option<FinishReason>,
    usage: Option<Usage>,
}

fn send(writer: &DataStreamWriter, part: impl Into<StreamPart>) -> Result<(), TurnError> {
    if writer.write(part) {
        Ok(())
    } else {
        Err(TurnError::Disconnected)
    }
}

/// Run the turn to completion, writing every part to `writer`.
///
/// The response is saved only when the turn ends normally with the client
/// still connected. Save failures are logged, never surfaced to the client.
pub async fn run_turn(state: AppState, turn: Turn, writer: DataStreamWriter) {
    let chat_id = turn.chat_id.clone();
    if !writer.write(DataPart::UserMessageId(turn.user_message_id.clone())) {
        info!(chat_id = %chat_id, "Client gone before the turn started");
        return;
    }

    let image_model = match state.provider.image_model() {
        Ok(model) => model,
        Err(e) => {
            error!(chat_id = %chat_id, "No image model: {}", e);
            writer.write(StreamPart::Error {
                message: e.to_string(),
            });
            return;
        }
    };

    let ctx = ToolContext {
        user_id: turn.user_id.clone(),
        writer: writer.clone(),
        model: turn.model.clone(),
        image_model,
        db: state.db.clone(),
    };

    match run_steps(&state, &turn, &ctx).await {
        Ok(output) => {
            if writer.is_closed() {
                info!(chat_id = %chat_id, "Client disconnected, response not saved");
                return;
            }
            save_response(&state, &turn, output.response, &writer).await;
            writer.write(StreamPart::Finish {
                finish_reason: output.finish_reason.unwrap_or(FinishReason::Stop),
                usage: output.usage,
            });
        }
        Err(TurnError::Disconnected) => {
            info!(chat_id = %chat_id, "Client disconnected, response not saved");
        }
        Err(TurnError::Model(e)) => {
            error!(chat_id = %chat_id, "Model call failed: {}", e);
            writer.write(StreamPart::Error {
                message: e.to_string(),
            });
        }
    }
}

async fn run_steps(state: &AppState, turn: &Turn, ctx: &ToolContext) -> Result<TurnOutput, TurnError> {
    let writer = &ctx.writer;
    let system = prompts::system_prompt();
    let tools = state.tools.definitions();
    let mut history = turn.messages.clone();
    let mut output = TurnOutput::default();

    for step in 0..state.config.max_steps {
        let request = CompletionRequest::new(history.clone())
            .with_system(system.clone())
            .with_tools(tools.clone());
        let mut deltas = turn.model.stream(request).await?;

        let mut text = String::new();
        let mut calls: Vec<ToolCallPart> = Vec::new();

        while let Some(delta) = deltas.next().await {
            match delta? {
                StreamDelta::TextDelta(delta) => {
                    text.push_str(&delta);
                    send(writer, StreamPart::Text { delta })?;
                }
                StreamDelta::ToolCall(call) => {
                    send(
                        writer,
                        StreamPart::ToolCall {
                            tool_call_id: call.tool_call_id.clone(),
                            tool_name: call.tool_name.clone(),
                            args: call.args.clone(),
                        },
                    )?;
                    calls.push(call);
                }
                StreamDelta::Finish { reason, usage } => {
                    output.finish_reason = Some(reason);
                    if let Some(usage) = usage {
                        let total = output.usage.get_or_insert_with(Usage::default);
                        total.prompt_tokens += usage.prompt_tokens;
                        total.completion_tokens += usage.completion_tokens;
                    }
                }
            }
        }

        let mut parts = Vec::with_capacity(calls.len() + 1);
        if !text.is_empty() {
            parts.push(AssistantPart::Text(TextPart::new(text)));
        }
        parts.extend(calls.iter().cloned().map(AssistantPart::ToolCall));
        let assistant = CoreMessage::Assistant(AssistantContent::Parts(parts));
        history.push(assistant.clone());
        output.response.push(assistant);

        if calls.is_empty() {
            debug!(step, "Turn finished without tool calls");
            return Ok(output);
        }

        let mut results = Vec::with_capacity(calls.len());
        for call in &calls {
            let result = state.tools.execute(ctx, call).await;
            send(
                writer,
                StreamPart::ToolResult {
                    tool_call_id: result.tool_call_id.clone(),
                    tool_name: result.tool_name.clone(),
                    result: result.result.clone(),
                    is_error: result.is_error,
                },
            )?;
            results.push(result);
        }
        let tool_message = CoreMessage::Tool(results);
        history.push(tool_message.clone());
        output.response.push(tool_message);
    }

    warn!(
        chat_id = %turn.chat_id,
        max_steps = state.config.max_steps,
        "Turn stopped at the step limit"
    );
    Ok(output)
}

async fn save_response(
    state: &AppState,
    turn: &Turn,
    response: Vec<CoreMessage>,
    writer: &DataStreamWriter,
) {
    let messages: Vec<Message> = sanitize_response_messages(response)
        .into_iter()
        .map(|message| {
            let id = Uuid::new_v4().to_string();
            if message.role() == Role::Assistant {
                writer.write(StreamPart::MessageAnnotation {
                    message_id_from_server: id.clone(),
                });
            }
            Message {
                id,
                chat_id: turn.chat_id.clone(),
                role: message.role().as_str().to_string(),
                content: Json(format_message_content(&message).to_value()),
                user_id: Some(turn.user_id.clone()),
                tokens: None,
                created_at: timestamp::now(),
            }
        })
        .collect();

    if messages.is_empty() {
        return;
    }

    match message::save_messages(state.db.pool(), &messages).await {
        Ok(()) => debug!(chat_id = %turn.chat_id, count = messages.len(), "Saved response"),
        Err(e) => error!(chat_id = %turn.chat_id, "Failed to save chat: {}", e),
    }
}
