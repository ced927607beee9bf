//! Tool trait definition and types.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chat_core::{DataStreamWriter, ImageModel, LanguageModel, ToolDefinition};
use database::Database;
use serde_json::Value;

use crate::error::ToolError;

/// Arguments passed to a tool for execution.
#[derive(Debug, Clone, Default)]
pub struct ToolArgs {
    /// Parameters as key-value pairs.
    pub params: HashMap<String, Value>,
}

impl ToolArgs {
    /// Create new tool arguments with the given parameters.
    pub fn new(params: HashMap<String, Value>) -> Self {
        Self { params }
    }

    /// Build arguments from the model's raw call arguments.
    ///
    /// Models send an object; `null` is treated as no arguments.
    pub fn from_value(value: Value) -> Result<Self, ToolError> {
        match value {
            Value::Object(map) => Ok(Self::new(map.into_iter().collect())),
            Value::Null => Ok(Self::default()),
            other => Err(ToolError::InvalidParameter {
                name: "arguments".to_string(),
                reason: format!("expected object, got {}", other),
            }),
        }
    }

    /// Get a string parameter, returning an error if missing or not a string.
    pub fn get_string(&self, key: &str) -> Result<String, ToolError> {
        self.params
            .get(key)
            .ok_or_else(|| ToolError::MissingParameter(key.to_string()))?
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| ToolError::InvalidParameter {
                name: key.to_string(),
                reason: "expected string".to_string(),
            })
    }

    /// Get an optional string parameter.
    pub fn get_string_opt(&self, key: &str) -> Option<String> {
        self.params.get(key)?.as_str().map(|s| s.to_string())
    }

    /// Get an f64 parameter, returning an error if missing or not a number.
    pub fn get_f64(&self, key: &str) -> Result<f64, ToolError> {
        self.params
            .get(key)
            .ok_or_else(|| ToolError::MissingParameter(key.to_string()))?
            .as_f64()
            .ok_or_else(|| ToolError::InvalidParameter {
                name: key.to_string(),
                reason: "expected number".to_string(),
            })
    }
}

/// Everything a tool may touch while it runs inside a chat turn.
#[derive(Clone)]
pub struct ToolContext {
    /// The signed-in user the turn runs for.
    pub user_id: String,
    /// Side channel to the browser for document deltas and suggestions.
    pub writer: DataStreamWriter,
    /// The model selected for the turn.
    pub model: Arc<dyn LanguageModel>,
    pub image_model: Arc<dyn ImageModel>,
    pub db: Database,
}

/// A tool the model can call.
///
/// `execute` returns the JSON value handed back to the model as the tool
/// result. Errors are reported to the model by the registry.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name the model calls the tool by.
    fn name(&self) -> &str;

    /// Human-readable description shown to the model.
    fn description(&self) -> &str;

    /// JSON schema of the arguments object.
    fn parameters(&self) -> Value;

    async fn execute(&self, ctx: &ToolContext, args: ToolArgs) -> Result<Value, ToolError>;

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_args_getters() {
        let args = ToolArgs::from_value(json!({
            "title": "Essay",
            "latitude": 52.52,
            "flag": true
        }))
        .unwrap();

        assert_eq!(args.get_string("title").unwrap(), "Essay");
        assert_eq!(args.get_f64("latitude").unwrap(), 52.52);
        assert!(args.get_string_opt("missing").is_none());
        assert!(matches!(
            args.get_string("missing"),
            Err(ToolError::MissingParameter(_))
        ));
        assert!(matches!(
            args.get_f64("flag"),
            Err(ToolError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_tool_args_from_non_object() {
        assert!(ToolArgs::from_value(Value::Null).unwrap().params.is_empty());
        assert!(matches!(
            ToolArgs::from_value(json!("oops")),
            Err(ToolError::InvalidParameter { .. })
        ));
    }
}
