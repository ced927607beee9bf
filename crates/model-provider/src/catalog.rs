//! The models users can pick from.

use serde::Serialize;

/// A selectable chat model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    /// Id used by the browser and stored in the `model-id` cookie.
    pub id: &'static str,
    pub label: &'static str,
    /// Identifier sent to the provider.
    pub api_identifier: &'static str,
    pub description: &'static str,
}

pub const DEFAULT_MODEL_ID: &str = "gpt-4o-mini";

pub const MODELS: &[ModelInfo] = &[
    ModelInfo {
        id: "gpt-4o-mini",
        label: "GPT 4o mini",
        api_identifier: "gpt-4o-mini",
        description: "Small model for fast, lightweight tasks",
    },
    ModelInfo {
        id: "gpt-4o",
        label: "GPT 4o",
        api_identifier: "gpt-4o",
        description: "For complex, multi-step tasks",
    },
    ModelInfo {
        id: "deepseek-chat",
        label: "DeepSeek Chat",
        api_identifier: "deepseek-chat",
        description: "DeepSeek general chat model",
    },
    ModelInfo {
        id: "deepseek-reasoner",
        label: "DeepSeek Reasoner",
        api_identifier: "deepseek-reasoner",
        description: "DeepSeek reasoning model",
    },
];

pub fn find_model(id: &str) -> Option<&'static ModelInfo> {
    MODELS.iter().find(|model| model.id == id)
}

/// The model for a possibly stale or missing selection.
pub fn model_or_default(id: Option<&str>) -> &'static ModelInfo {
    id.and_then(find_model)
        .or_else(|| find_model(DEFAULT_MODEL_ID))
        .unwrap_or(&MODELS[0])
}
