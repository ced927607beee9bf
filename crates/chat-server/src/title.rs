//! Titles for new chats.

use chat_core::{CompletionRequest, CoreMessage, LanguageModel, ModelError};
use chat_tools::prompts::TITLE_PROMPT;

const MAX_TITLE_CHARS: usize = 80;
pub const FALLBACK_TITLE: &str = "New chat";

/// Ask the model for a short title summarising the first user message.
pub async fn generate_title(
    model: &dyn LanguageModel,
    message: &CoreMessage,
) -> Result<String, ModelError> {
    let request = CompletionRequest::new(vec![CoreMessage::user(message.text())])
        .with_system(TITLE_PROMPT)
        .with_max_tokens(64);

    let completion = model.complete(request).await?;
    Ok(clean_title(&completion.text))
}

/// Strip quotes and colons, keep the first line and cap the length.
fn clean_title(raw: &str) -> String {
    let line = raw.lines().map(str::trim).find(|l| !l.is_empty()).unwrap_or("");
    let title: String = line
        .chars()
        .filter(|c| !matches!(c, '"' | '\'' | ':' | '`'))
        .take(MAX_TITLE_CHARS)
        .collect();
    let title = title.trim();

    if title.is_empty() {
        FALLBACK_TITLE.to_string()
    } else {
        title.to_string()
    }
}
