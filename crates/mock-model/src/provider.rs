//! Mock image model and model provider.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chat_core::{ImageModel, LanguageModel, ModelError, ModelProvider};

/// An image model that returns a fixed base64 payload.
#[derive(Debug, Clone)]
pub struct StaticImageModel {
    image: String,
}

impl StaticImageModel {
    pub fn new(image_base64: impl Into<String>) -> Self {
        Self {
            image: image_base64.into(),
        }
    }
}

impl Default for StaticImageModel {
    fn default() -> Self {
        // 1x1 transparent PNG
        Self::new("iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=")
    }
}

#[async_trait]
impl ImageModel for StaticImageModel {
    fn model_id(&self) -> &str {
        "static-image"
    }

    async fn generate_image(&self, _prompt: &str) -> Result<String, ModelError> {
        Ok(self.image.clone())
    }
}

/// Serves registered models by identifier, falling back to a default.
#[derive(Clone)]
pub struct MockProvider {
    default: Arc<dyn LanguageModel>,
    models: HashMap<String, Arc<dyn LanguageModel>>,
    image: Arc<dyn ImageModel>,
}

impl MockProvider {
    pub fn new(default: impl LanguageModel + 'static) -> Self {
        Self {
            default: Arc::new(default),
            models: HashMap::new(),
            image: Arc::new(StaticImageModel::default()),
        }
    }

    /// Serve `model` for `api_identifier`.
    pub fn with_model(mut self, api_identifier: &str, model: impl LanguageModel + 'static) -> Self {
        self.models.insert(api_identifier.to_string(), Arc::new(model));
        self
    }

    pub fn with_image_model(mut self, model: impl ImageModel + 'static) -> Self {
        self.image = Arc::new(model);
        self
    }
}

impl ModelProvider for MockProvider {
    fn language_model(&self, api_identifier: &str) -> Result<Arc<dyn LanguageModel>, ModelError> {
        Ok(self
            .models
            .get(api_identifier)
            .cloned()
            .unwrap_or_else(|| self.default.clone()))
    }

    fn image_model(&self) -> Result<Arc<dyn ImageModel>, ModelError> {
        Ok(self.image.clone())
    }
}
