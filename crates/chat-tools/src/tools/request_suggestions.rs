//! Ask the model for sentence-level edits to a document.

use async_trait::async_trait;
use chat_core::{CompletionRequest, CoreMessage, DataPart};
use database::{document, suggestion, timestamp, Suggestion};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::ToolError;
use crate::prompts::SUGGESTIONS_PROMPT;
use crate::tool::{Tool, ToolArgs, ToolContext};

const MAX_SUGGESTIONS: usize = 5;

/// Requests up to five suggestions for the latest version of a document,
/// streams each one and stores them against that version.
pub struct RequestSuggestions;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProposedEdit {
    original_sentence: String,
    suggested_sentence: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ProposedEdits {
    Wrapped { suggestions: Vec<ProposedEdit> },
    Bare(Vec<ProposedEdit>),
}

/// Accept either `{"suggestions": [...]}` or a bare array.
fn parse_edits(text: &str) -> Result<Vec<ProposedEdit>, ToolError> {
    let edits = match serde_json::from_str::<ProposedEdits>(text.trim())? {
        ProposedEdits::Wrapped { suggestions } => suggestions,
        ProposedEdits::Bare(edits) => edits,
    };
    Ok(edits.into_iter().take(MAX_SUGGESTIONS).collect())
}

#[async_trait]
impl Tool for RequestSuggestions {
    fn name(&self) -> &str {
        "requestSuggestions"
    }

    fn description(&self) -> &str {
        "Request suggestions for a document"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "documentId": {
                    "type": "string",
                    "description": "The ID of the document to request edits"
                }
            },
            "required": ["documentId"]
        })
    }

    async fn execute(&self, ctx: &ToolContext, args: ToolArgs) -> Result<Value, ToolError> {
        let document_id = args.get_string("documentId")?;

        let document = match document::get_document(ctx.db.pool(), &document_id).await? {
            Some(doc) if doc.content.is_some() => doc,
            _ => {
                warn!(document_id = %document_id, "Suggestions requested for missing document");
                return Ok(json!({ "error": "Document not found" }));
            }
        };
        let content = document.content.clone().unwrap_or_default();

        let request = CompletionRequest::new(vec![CoreMessage::user(content)])
            .with_system(SUGGESTIONS_PROMPT)
            .json();
        let completion = ctx.model.complete(request).await?;
        let edits = parse_edits(&completion.text)?;

        let mut suggestions = Vec::with_capacity(edits.len());
        for edit in edits {
            let suggestion = Suggestion {
                id: Uuid::new_v4().to_string(),
                document_id: document.id.clone(),
                document_created_at: document.created_at.clone(),
                original_text: edit.original_sentence,
                suggested_text: edit.suggested_sentence,
                description: edit.description,
                is_resolved: false,
                user_id: ctx.user_id.clone(),
                created_at: timestamp::now(),
            };
            ctx.writer
                .write(DataPart::Suggestion(serde_json::to_value(&suggestion)?));
            suggestions.push(suggestion);
        }

        suggestion::save_suggestions(ctx.db.pool(), &suggestions).await?;
        info!(
            document_id = %document.id,
            count = suggestions.len(),
            "Saved suggestions"
        );

        Ok(json!({
            "id": document.id,
            "title": document.title,
            "kind": document.kind.as_str(),
            "message": "Suggestions have been added to the document",
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{drain, test_context};
    use chat_core::{ResponseFormat, StreamPart};
    use database::{Document, DocumentKind};
    use mock_model::ScriptedModel;

    #[test]
    fn test_parse_edits_shapes() {
        let wrapped = parse_edits(
            r#"{"suggestions": [{"originalSentence": "a", "suggestedSentence": "b", "description": "c"}]}"#,
        )
        .unwrap();
        assert_eq!(wrapped[0].suggested_sentence, "b");

        let many: Vec<Value> = (0..8)
            .map(|i| json!({"originalSentence": i.to_string(), "suggestedSentence": "x"}))
            .collect();
        let bare = parse_edits(&Value::Array(many).to_string()).unwrap();
        assert_eq!(bare.len(), MAX_SUGGESTIONS);
        assert!(bare[0].description.is_none());

        assert!(matches!(parse_edits("not json"), Err(ToolError::JsonError(_))));
    }

    #[tokio::test]
    async fn test_suggestions_streamed_and_saved() {
        let reply = json!({"suggestions": [
            {"originalSentence": "It good.", "suggestedSentence": "It is good.", "description": "Grammar"},
            {"originalSentence": "Very very nice.", "suggestedSentence": "Very nice.", "description": "Repetition"}
        ]});
        let model = ScriptedModel::new("scripted").then_text(&reply.to_string());
        let (ctx, mut reader) = test_context(model.clone()).await;

        document::save_document(
            ctx.db.pool(),
            &Document {
                id: "d1".to_string(),
                created_at: "2026-01-01T00:00:00.000000Z".to_string(),
                title: "Essay".to_string(),
                content: Some("It good. Very very nice.".to_string()),
                kind: DocumentKind::Text,
                user_id: "u1".to_string(),
            },
        )
        .await
        .unwrap();

        let result = RequestSuggestions
            .execute(&ctx, ToolArgs::from_value(json!({"documentId": "d1"})).unwrap())
            .await
            .unwrap();
        assert_eq!(result["id"], "d1");

        let streamed: Vec<Value> = drain(&mut reader)
            .into_iter()
            .filter_map(|part| match part {
                StreamPart::Data {
                    data: DataPart::Suggestion(value),
                } => Some(value),
                _ => None,
            })
            .collect();
        assert_eq!(streamed.len(), 2);
        assert_eq!(streamed[0]["originalText"], "It good.");

        let saved = suggestion::get_suggestions_by_document(ctx.db.pool(), "d1")
            .await
            .unwrap();
        assert_eq!(saved.len(), 2);
        assert!(saved.iter().all(|s| !s.is_resolved));
        assert!(saved
            .iter()
            .all(|s| s.document_created_at == "2026-01-01T00:00:00.000000Z"));

        let requests = model.requests().await;
        assert_eq!(requests[0].response_format, ResponseFormat::Json);
    }

    #[tokio::test]
    async fn test_suggestions_for_missing_document() {
        let model = ScriptedModel::new("scripted");
        let (ctx, _reader) = test_context(model.clone()).await;

        let result = RequestSuggestions
            .execute(&ctx, ToolArgs::from_value(json!({"documentId": "nope"})).unwrap())
            .await
            .unwrap();
        assert_eq!(result, json!({"error": "Document not found"}));
        assert!(model.requests().await.is_empty());
    }
}
