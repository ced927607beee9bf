//! Rewrite an existing document as a new version.

use async_trait::async_trait;
use chat_core::DataPart;
use database::{document, timestamp, Document};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::error::ToolError;
use crate::prompts::update_document_prompt;
use crate::tool::{Tool, ToolArgs, ToolContext};
use crate::tools::draft::write_draft;

/// Rewrites the latest version of a document following a description of
/// the changes. Earlier versions are kept.
pub struct UpdateDocument;

#[async_trait]
impl Tool for UpdateDocument {
    fn name(&self) -> &str {
        "updateDocument"
    }

    fn description(&self) -> &str {
        "Update a document with the given description."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "id": {"type": "string", "description": "The ID of the document to update"},
                "description": {
                    "type": "string",
                    "description": "The description of changes that need to be made"
                }
            },
            "required": ["id", "description"]
        })
    }

    async fn execute(&self, ctx: &ToolContext, args: ToolArgs) -> Result<Value, ToolError> {
        let id = args.get_string("id")?;
        let description = args.get_string("description")?;

        let Some(current) = document::get_document(ctx.db.pool(), &id).await? else {
            warn!(document_id = %id, "Update requested for missing document");
            return Ok(json!({
                "error": "Document not found",
                "id": id,
                "title": "",
                "kind": "text",
                "content": "Document not found",
            }));
        };

        ctx.writer.write(DataPart::Clear);

        let system = update_document_prompt(current.content.as_deref(), current.kind);
        let draft = write_draft(ctx, current.kind, system, &description).await?;

        document::save_document(
            ctx.db.pool(),
            &Document {
                id: id.clone(),
                created_at: timestamp::now(),
                title: current.title.clone(),
                content: Some(draft),
                kind: current.kind,
                user_id: ctx.user_id.clone(),
            },
        )
        .await?;

        info!(document_id = %id, "Saved new document version");

        Ok(json!({
            "id": id,
            "title": current.title,
            "kind": current.kind.as_str(),
            "content": "The document has been updated successfully.",
        }))
    }
}
