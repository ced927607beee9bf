//! Streams a document draft to the browser while it is written.

use chat_core::{CompletionRequest, CoreMessage, DataPart, StreamDelta};
use database::DocumentKind;
use futures::StreamExt;
use tracing::debug;

use crate::error::ToolError;
use crate::tool::ToolContext;

/// Write the content of a document and return it once complete.
///
/// Text drafts stream every delta; code drafts stream the whole snippet
/// so far on each delta; images are generated in one piece and sent as
/// base64. A `finish` data part closes the draft.
pub(crate) async fn write_draft(
    ctx: &ToolContext,
    kind: DocumentKind,
    system: String,
    prompt: &str,
) -> Result<String, ToolError> {
    let draft = match kind {
        DocumentKind::Image => {
            let image = ctx.image_model.generate_image(prompt).await?;
            ctx.writer.write(DataPart::ImageDelta(image.clone()));
            image
        }
        DocumentKind::Text | DocumentKind::Code => {
            let request = CompletionRequest::new(vec![CoreMessage::user(prompt)]).with_system(system);
            let mut deltas = ctx.model.stream(request).await?;
            let mut draft = String::new();

            while let Some(delta) = deltas.next().await {
                if let StreamDelta::TextDelta(text) = delta? {
                    draft.push_str(&text);
                    let part = match kind {
                        DocumentKind::Code => DataPart::CodeDelta(draft.clone()),
                        _ => DataPart::TextDelta(text),
                    };
                    ctx.writer.write(part);
                }
            }
            draft
        }
    };

    debug!(kind = kind.as_str(), len = draft.len(), "Draft complete");
    ctx.writer.write(DataPart::Finish);
    Ok(draft)
}
