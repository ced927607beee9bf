//! Routing of model identifiers to provider endpoints.

use std::sync::Arc;

use chat_core::{ImageModel, LanguageModel, ModelError, ModelProvider};
use reqwest::Client;
use tracing::info;

use crate::client::{http_client, OpenAiImageModel, OpenAiModel};
use crate::config::{ProviderConfig, ProvidersConfig};

/// Identifiers with this prefix are served by DeepSeek.
pub const DEEPSEEK_PREFIX: &str = "deepseek-";

/// Hands out models for OpenAI and, when configured, DeepSeek.
#[derive(Debug, Clone)]
pub struct Providers {
    client: Client,
    config: ProvidersConfig,
}

impl Providers {
    pub fn new(config: ProvidersConfig) -> Result<Self, ModelError> {
        info!(
            "Model providers initialized (deepseek: {}, image model: {})",
            config.deepseek.is_some(),
            config.image_model
        );
        Ok(Self {
            client: http_client()?,
            config,
        })
    }

    /// Create providers from environment variables.
    ///
    /// See [`ProvidersConfig::from_env`] for the variables read.
    pub fn from_env() -> Result<Self, ModelError> {
        Self::new(ProvidersConfig::from_env()?)
    }

    fn endpoint_for(&self, api_identifier: &str) -> Result<&ProviderConfig, ModelError> {
        if api_identifier.starts_with(DEEPSEEK_PREFIX) {
            self.config.deepseek.as_ref().ok_or_else(|| {
                ModelError::Configuration(format!(
                    "{} requires DEEPSEEK_API_KEY",
                    api_identifier
                ))
            })
        } else {
            Ok(&self.config.openai)
        }
    }
}

impl ModelProvider for Providers {
    fn language_model(&self, api_identifier: &str) -> Result<Arc<dyn LanguageModel>, ModelError> {
        let endpoint = self.endpoint_for(api_identifier)?;
        Ok(Arc::new(OpenAiModel::new(
            self.client.clone(),
            endpoint.clone(),
            api_identifier,
        )))
    }

    fn image_model(&self) -> Result<Arc<dyn ImageModel>, ModelError> {
        Ok(Arc::new(OpenAiImageModel::new(
            self.client.clone(),
            self.config.openai.clone(),
            self.config.image_model.clone(),
        )))
    }
}
