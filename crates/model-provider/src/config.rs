//! Provider configuration.

use chat_core::ModelError;
use std::env;

pub const DEFAULT_OPENAI_API_URL: &str = "https://api.openai.com";
pub const DEFAULT_DEEPSEEK_API_URL: &str = "https://api.deepseek.com";
pub const DEFAULT_IMAGE_MODEL: &str = "dall-e-3";

/// Connection settings for one OpenAI-compatible endpoint.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Base API URL, without the `/v1` suffix.
    pub api_url: String,

    /// API key for authentication.
    pub api_key: String,
}

impl ProviderConfig {
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }
}

/// Settings for every provider the assistant can route to.
#[derive(Debug, Clone)]
pub struct ProvidersConfig {
    pub openai: ProviderConfig,

    /// DeepSeek is optional; `deepseek-*` models fail without it.
    pub deepseek: Option<ProviderConfig>,

    /// Model used for image documents.
    pub image_model: String,
}

impl ProvidersConfig {
    /// Create configuration from environment variables.
    ///
    /// Required environment variables:
    /// - `OPENAI_API_KEY` - OpenAI API key
    ///
    /// Optional environment variables:
    /// - `OPENAI_API_URL` - OpenAI API URL (default: https://api.openai.com)
    /// - `DEEPSEEK_API_KEY` - DeepSeek API key (enables `deepseek-*` models)
    /// - `DEEPSEEK_API_URL` - DeepSeek API URL (default: https://api.deepseek.com)
    /// - `CHAT_IMAGE_MODEL` - Image generation model (default: dall-e-3)
    pub fn from_env() -> Result<Self, ModelError> {
        let api_key = env::var("OPENAI_API_KEY")
            .map_err(|_| ModelError::Configuration("OPENAI_API_KEY not set".to_string()))?;
        let api_url =
            env::var("OPENAI_API_URL").unwrap_or_else(|_| DEFAULT_OPENAI_API_URL.to_string());

        let deepseek = env::var("DEEPSEEK_API_KEY").ok().map(|key| {
            let url = env::var("DEEPSEEK_API_URL")
                .unwrap_or_else(|_| DEFAULT_DEEPSEEK_API_URL.to_string());
            ProviderConfig::new(url, key)
        });

        let image_model =
            env::var("CHAT_IMAGE_MODEL").unwrap_or_else(|_| DEFAULT_IMAGE_MODEL.to_string());

        Ok(Self {
            openai: ProviderConfig::new(api_url, api_key),
            deepseek,
            image_model,
        })
    }
}
