//! Clean up the messages of a finished model turn before they are persisted.

use std::collections::HashMap;

use tracing::debug;

use crate::message::{AssistantContent, CoreMessage};
use crate::part::{AssistantPart, TextPart};

/// Remove incomplete tool invocations from a finished turn.
///
/// Within assistant messages, a tool-call part is kept only if a tool
/// message later in the batch carries a result with the same call id.
/// Empty text parts are dropped alongside. Messages left with no content
/// are removed entirely. Running this on its own output changes nothing.
pub fn sanitize_response_messages(messages: Vec<CoreMessage>) -> Vec<CoreMessage> {
    // Last position at which each call id received a result.
    let mut resolved_at: HashMap<String, usize> = HashMap::new();
    for (index, message) in messages.iter().enumerate() {
        if let CoreMessage::Tool(results) = message {
            for result in results {
                resolved_at.insert(result.tool_call_id.clone(), index);
            }
        }
    }

    messages
        .into_iter()
        .enumerate()
        .filter_map(|(index, message)| {
            let message = match message {
                CoreMessage::Assistant(AssistantContent::Parts(parts)) => {
                    let parts = parts
                        .into_iter()
                        .filter(|part| match part {
                            AssistantPart::ToolCall(call) => {
                                let keep = resolved_at
                                    .get(&call.tool_call_id)
                                    .is_some_and(|&at| at > index);
                                if !keep {
                                    debug!(
                                        tool_call_id = %call.tool_call_id,
                                        tool_name = %call.tool_name,
                                        "Dropping unresolved tool call"
                                    );
                                }
                                keep
                            }
                            AssistantPart::Text(TextPart { text, .. }) => !text.is_empty(),
                        })
                        .collect();
                    CoreMessage::Assistant(AssistantContent::Parts(parts))
                }
                other => other,
            };

            if message.is_empty() {
                debug!(index, role = %message.role(), "Dropping empty message");
                None
            } else {
                Some(message)
            }
        })
        .collect()
}
