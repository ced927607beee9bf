//! Parts pushed to the browser while a turn is streaming.

use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::trace;

use crate::model::{FinishReason, Usage};

/// Custom data carried inside a `data` stream part, mostly document
/// generation progress.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "content", rename_all = "kebab-case")]
pub enum DataPart {
    UserMessageId(String),
    Id(String),
    Title(String),
    Kind(String),
    Clear,
    TextDelta(String),
    CodeDelta(String),
    ImageDelta(String),
    Suggestion(Value),
    Finish,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum StreamPart {
    Text {
        delta: String,
    },
    ToolCall {
        tool_call_id: String,
        tool_name: String,
        args: Value,
    },
    ToolResult {
        tool_call_id: String,
        tool_name: String,
        result: Value,
        #[serde(skip_serializing_if = "Option::is_none")]
        is_error: Option<bool>,
    },
    Data {
        data: DataPart,
    },
    MessageAnnotation {
        message_id_from_server: String,
    },
    Error {
        message: String,
    },
    Finish {
        finish_reason: FinishReason,
        #[serde(skip_serializing_if = "Option::is_none")]
        usage: Option<Usage>,
    },
}

impl StreamPart {
    /// Name used as the SSE `event` field.
    pub fn event_name(&self) -> &'static str {
        match self {
            StreamPart::Text { .. } => "text",
            StreamPart::ToolCall { .. } => "tool-call",
            StreamPart::ToolResult { .. } => "tool-result",
            StreamPart::Data { .. } => "data",
            StreamPart::MessageAnnotation { .. } => "message-annotation",
            StreamPart::Error { .. } => "error",
            StreamPart::Finish { .. } => "finish",
        }
    }
}

impl From<DataPart> for StreamPart {
    fn from(data: DataPart) -> Self {
        StreamPart::Data { data }
    }
}

/// Sending half of a turn's output stream. Cheap to clone; tools get one
/// to report progress.
#[derive(Debug, Clone)]
pub struct DataStreamWriter {
    sender: mpsc::UnboundedSender<StreamPart>,
}

impl DataStreamWriter {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<StreamPart>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    /// Push a part. Returns false once the reader has gone away.
    pub fn write(&self, part: impl Into<StreamPart>) -> bool {
        let part = part.into();
        match self.sender.send(part) {
            Ok(()) => true,
            Err(err) => {
                trace!(event = err.0.event_name(), "Stream reader closed, dropping part");
                false
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_data_part_shape() {
        let part = StreamPart::from(DataPart::TextDelta("Hel".to_string()));
        assert_eq!(part.event_name(), "data");
        assert_eq!(
            serde_json::to_value(&part).unwrap(),
            json!({"kind": "data", "data": {"type": "text-delta", "content": "Hel"}})
        );
        assert_eq!(
            serde_json::to_value(DataPart::Clear).unwrap(),
            json!({"type": "clear"})
        );
    }

    #[test]
    fn test_annotation_shape() {
        let part = StreamPart::MessageAnnotation {
            message_id_from_server: "m1".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&part).unwrap(),
            json!({"kind": "message-annotation", "messageIdFromServer": "m1"})
        );
    }

    #[tokio::test]
    async fn test_writer_delivers_in_order() {
        let (writer, mut reader) = DataStreamWriter::channel();
        assert!(writer.write(DataPart::Id("d1".to_string())));
        assert!(writer.write(StreamPart::Text { delta: "hi".to_string() }));

        assert_eq!(
            reader.recv().await,
            Some(StreamPart::Data { data: DataPart::Id("d1".to_string()) })
        );
        assert_eq!(reader.recv().await, Some(StreamPart::Text { delta: "hi".to_string() }));
    }

    #[test]
    fn test_writer_reports_closed_reader() {
        let (writer, reader) = DataStreamWriter::channel();
        drop(reader);
        assert!(writer.is_closed());
        assert!(!writer.write(DataPart::Finish));
    }
}
