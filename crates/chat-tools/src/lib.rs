//! Tool registry and implementations for the chat assistant.
//!
//! Tools are capabilities the model may call during a chat turn. Each call
//! runs with a [`ToolContext`] carrying the signed-in user, the turn's data
//! stream, the selected models and the database.
//!
//! # Built-in Tools
//!
//! - [`GetWeather`] - Forecast for a coordinate via Open-Meteo (no API key needed).
//! - [`CreateDocument`] - Streams and stores the first draft of a text, code or image document.
//! - [`UpdateDocument`] - Streams and stores a rewritten version of a document.
//! - [`RequestSuggestions`] - Proposes sentence-level edits to a document.
//!
//! # Example
//!
//! ```rust,ignore
//! use chat_tools::default_registry;
//!
//! let registry = default_registry(reqwest::Client::new());
//! let declarations = registry.definitions();
//! let result = registry.execute(&ctx, &tool_call).await;
//! ```

mod error;
pub mod prompts;
mod registry;
mod tool;
pub mod tools;

pub use error::ToolError;
pub use registry::ToolRegistry;
pub use tool::{Tool, ToolArgs, ToolContext};
pub use tools::{CreateDocument, GetWeather, RequestSuggestions, UpdateDocument};

/// Create a registry with all built-in tools.
pub fn default_registry(client: reqwest::Client) -> ToolRegistry {
    let mut registry = ToolRegistry::new();

    registry.register(GetWeather::new(client));
    registry.register(CreateDocument);
    registry.register(UpdateDocument);
    registry.register(RequestSuggestions);

    registry
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry() {
        let registry = default_registry(reqwest::Client::new());
        assert_eq!(
            registry.list_tools(),
            vec!["getWeather", "createDocument", "updateDocument", "requestSuggestions"]
        );
    }
}
