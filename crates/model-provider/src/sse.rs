//! Server-sent event decoding for streamed completions.

use std::collections::{BTreeMap, VecDeque};

use chat_core::{DeltaStream, FinishReason, ModelError, StreamDelta, ToolCallPart, Usage};
use futures::stream::{self, StreamExt};
use reqwest_eventsource::{Event, EventSource};
use tracing::{debug, warn};

use crate::api_types::{ApiError, ChatCompletionChunk};
use crate::convert::parse_arguments;

/// A tool call still being assembled from fragments.
#[derive(Debug, Default)]
struct PartialToolCall {
    id: String,
    name: String,
    arguments: String,
}

/// Turns completion chunks into stream deltas.
///
/// Tool call fragments are collected by index and released together once
/// the choice reports a finish reason, so each call is emitted whole.
#[derive(Debug, Default)]
pub struct ChunkDecoder {
    tool_calls: BTreeMap<u32, PartialToolCall>,
    finish_reason: Option<FinishReason>,
    usage: Option<Usage>,
    finished: bool,
}

impl ChunkDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: ChatCompletionChunk) -> Vec<StreamDelta> {
        let mut deltas = Vec::new();

        if let Some(usage) = chunk.usage {
            self.usage = Some(Usage {
                prompt_tokens: usage.prompt_tokens,
                completion_tokens: usage.completion_tokens,
            });
        }

        for choice in chunk.choices {
            if let Some(text) = choice.delta.content {
                if !text.is_empty() {
                    deltas.push(StreamDelta::TextDelta(text));
                }
            }

            for fragment in choice.delta.tool_calls.unwrap_or_default() {
                let call = self.tool_calls.entry(fragment.index).or_default();
                if let Some(id) = fragment.id {
                    call.id = id;
                }
                if let Some(function) = fragment.function {
                    if let Some(name) = function.name {
                        call.name.push_str(&name);
                    }
                    if let Some(arguments) = function.arguments {
                        call.arguments.push_str(&arguments);
                    }
                }
            }

            if let Some(reason) = choice.finish_reason {
                self.finish_reason = Some(FinishReason::from_provider(&reason));
                deltas.extend(self.flush_tool_calls());
            }
        }

        deltas
    }

    /// Called when the stream ends. Emits pending tool calls and the finish
    /// delta, once.
    pub fn finish(&mut self) -> Vec<StreamDelta> {
        if self.finished {
            return Vec::new();
        }
        self.finished = true;

        let mut deltas = self.flush_tool_calls();
        let reason = match self.finish_reason {
            Some(reason) => reason,
            None if deltas.is_empty() => FinishReason::Stop,
            None => FinishReason::ToolCalls,
        };
        deltas.push(StreamDelta::Finish {
            reason,
            usage: self.usage,
        });
        deltas
    }

    fn flush_tool_calls(&mut self) -> Vec<StreamDelta> {
        std::mem::take(&mut self.tool_calls)
            .into_values()
            .filter_map(|call| {
                if call.id.is_empty() || call.name.is_empty() {
                    warn!(name = %call.name, "Dropping incomplete tool call fragment");
                    return None;
                }
                Some(StreamDelta::ToolCall(ToolCallPart::new(
                    call.id,
                    call.name,
                    parse_arguments(&call.arguments),
                )))
            })
            .collect()
    }
}

struct StreamState {
    source: EventSource,
    decoder: ChunkDecoder,
    pending: VecDeque<StreamDelta>,
    done: bool,
}

/// Adapt an open event source into a delta stream.
pub fn delta_stream(source: EventSource) -> DeltaStream {
    let state = StreamState {
        source,
        decoder: ChunkDecoder::new(),
        pending: VecDeque::new(),
        done: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(delta) = state.pending.pop_front() {
                return Some((Ok(delta), state));
            }
            if state.done {
                return None;
            }

            match state.source.next().await {
                Some(Ok(Event::Open)) => {
                    debug!("Completion stream opened");
                }
                Some(Ok(Event::Message(message))) => {
                    if message.data.trim() == "[DONE]" {
                        state.source.close();
                        state.done = true;
                        let tail = state.decoder.finish();
                        state.pending.extend(tail);
                        continue;
                    }
                    match serde_json::from_str::<ChatCompletionChunk>(&message.data) {
                        Ok(chunk) => {
                            let deltas = state.decoder.push(chunk);
                            state.pending.extend(deltas);
                        }
                        Err(e) => {
                            state.source.close();
                            state.done = true;
                            return Some((
                                Err(ModelError::Decode(format!("Failed to parse chunk: {}", e))),
                                state,
                            ));
                        }
                    }
                }
                Some(Err(reqwest_eventsource::Error::StreamEnded)) | None => {
                    state.done = true;
                    let tail = state.decoder.finish();
                    state.pending.extend(tail);
                }
                Some(Err(reqwest_eventsource::Error::InvalidStatusCode(status, response))) => {
                    state.source.close();
                    state.done = true;
                    let body = response.text().await.unwrap_or_default();
                    return Some((Err(api_error(status.as_u16(), &body)), state));
                }
                Some(Err(e)) => {
                    state.source.close();
                    state.done = true;
                    return Some((Err(ModelError::Stream(e.to_string())), state));
                }
            }
        }
    })
    .boxed()
}

/// Build an API error from a failed response body.
pub(crate) fn api_error(status: u16, body: &str) -> ModelError {
    let message = match serde_json::from_str::<ApiError>(body) {
        Ok(api_error) => api_error.error.message,
        Err(_) => body.to_string(),
    };
    ModelError::Api { status, message }
}
