//! Application state shared across handlers.

use std::sync::Arc;

use chat_core::ModelProvider;
use chat_tools::ToolRegistry;
use database::Database;

use crate::config::Config;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Database connection.
    pub db: Database,
    /// Language and image models by provider identifier.
    pub provider: Arc<dyn ModelProvider>,
    /// Tools offered to the model on every turn.
    pub tools: Arc<ToolRegistry>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Create new application state.
    pub fn new(
        db: Database,
        provider: Arc<dyn ModelProvider>,
        tools: ToolRegistry,
        config: Config,
    ) -> Self {
        Self {
            db,
            provider,
            tools: Arc::new(tools),
            config: Arc::new(config),
        }
    }
}
