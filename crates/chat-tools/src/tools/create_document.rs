//! Create a new document and stream its first draft.

use async_trait::async_trait;
use chat_core::DataPart;
use database::{document, timestamp, Document, DocumentKind};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::error::ToolError;
use crate::prompts::create_document_prompt;
use crate::tool::{Tool, ToolArgs, ToolContext};
use crate::tools::draft::write_draft;

/// Creates a document of the given kind titled after the request.
///
/// Streams `id`, `title`, `kind` and `clear` before the draft so the
/// browser can open an empty block, then persists the first version.
pub struct CreateDocument;

pub(crate) fn parse_kind(value: &str) -> Result<DocumentKind, ToolError> {
    match value {
        "text" => Ok(DocumentKind::Text),
        "code" => Ok(DocumentKind::Code),
        "image" => Ok(DocumentKind::Image),
        other => Err(ToolError::InvalidParameter {
            name: "kind".to_string(),
            reason: format!("unknown document kind '{}'", other),
        }),
    }
}

#[async_trait]
impl Tool for CreateDocument {
    fn name(&self) -> &str {
        "createDocument"
    }

    fn description(&self) -> &str {
        "Create a document for a writing activity. This tool will call other functions \
         that will generate the contents of the document based on the title and kind."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "title": {"type": "string"},
                "kind": {"type": "string", "enum": ["text", "code", "image"]}
            },
            "required": ["title", "kind"]
        })
    }

    async fn execute(&self, ctx: &ToolContext, args: ToolArgs) -> Result<Value, ToolError> {
        let title = args.get_string("title")?;
        let kind = parse_kind(&args.get_string("kind")?)?;
        let id = Uuid::new_v4().to_string();

        ctx.writer.write(DataPart::Id(id.clone()));
        ctx.writer.write(DataPart::Title(title.clone()));
        ctx.writer.write(DataPart::Kind(kind.as_str().to_string()));
        ctx.writer.write(DataPart::Clear);

        let draft = write_draft(ctx, kind, create_document_prompt(kind).to_string(), &title).await?;

        document::save_document(
            ctx.db.pool(),
            &Document {
                id: id.clone(),
                created_at: timestamp::now(),
                title: title.clone(),
                content: Some(draft),
                kind,
                user_id: ctx.user_id.clone(),
            },
        )
        .await?;

        info!(document_id = %id, kind = kind.as_str(), "Created document");

        Ok(json!({
            "id": id,
            "title": title,
            "kind": kind.as_str(),
            "content": "A document was created and is now visible to the user.",
        }))
    }
}
