//! Tool registry for managing and executing tools.

use std::sync::Arc;

use chat_core::{ToolCallPart, ToolDefinition, ToolResultPart};
use indexmap::IndexMap;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::error::ToolError;
use crate::tool::{Tool, ToolArgs, ToolContext};

/// Registry for managing tools.
///
/// Tools keep their registration order, which is the order they are
/// declared to the model.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: IndexMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool.
    ///
    /// If a tool with the same name already exists, it will be replaced.
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        let name = tool.name().to_string();
        info!("Registering tool: {}", name);
        self.tools.insert(name, Arc::new(tool));
    }

    /// Get a list of registered tool names.
    pub fn list_tools(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }

    /// Check if a tool is registered.
    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Declarations for every registered tool.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|tool| tool.definition()).collect()
    }

    /// Run one tool call and build the result handed back to the model.
    ///
    /// Failures never escape: they become `{"error": ...}` results marked
    /// as errors so the model can react to them.
    pub async fn execute(&self, ctx: &ToolContext, call: &ToolCallPart) -> ToolResultPart {
        match self.try_execute(ctx, call).await {
            Ok(result) => ToolResultPart::new(&call.tool_call_id, &call.tool_name, result),
            Err(e) => {
                warn!(
                    tool = %call.tool_name,
                    tool_call_id = %call.tool_call_id,
                    "Tool failed: {}",
                    e
                );
                ToolResultPart::new(
                    &call.tool_call_id,
                    &call.tool_name,
                    json!({ "error": e.to_string() }),
                )
                .into_error()
            }
        }
    }

    async fn try_execute(
        &self,
        ctx: &ToolContext,
        call: &ToolCallPart,
    ) -> Result<serde_json::Value, ToolError> {
        let tool = self
            .tools
            .get(&call.tool_name)
            .ok_or_else(|| ToolError::NotFound(call.tool_name.clone()))?;

        let args = ToolArgs::from_value(call.args.clone())?;
        debug!(
            "Executing tool '{}' with {} params",
            call.tool_name,
            args.params.len()
        );

        let result = tool.execute(ctx, args).await?;
        debug!("Tool '{}' completed", call.tool_name);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_context;
    use async_trait::async_trait;
    use mock_model::EchoModel;
    use serde_json::Value;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Echoes back the input"
        }

        fn parameters(&self) -> Value {
            json!({
                "type": "object",
                "properties": {"message": {"type": "string"}},
                "required": ["message"]
            })
        }

        async fn execute(&self, _ctx: &ToolContext, args: ToolArgs) -> Result<Value, ToolError> {
            let message = args.get_string("message")?;
            Ok(json!({ "message": message }))
        }
    }

    #[tokio::test]
    async fn test_registry_basic() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool);

        assert!(registry.has_tool("echo"));
        assert!(!registry.has_tool("nonexistent"));
        assert_eq!(registry.list_tools(), vec!["echo"]);

        let definitions = registry.definitions();
        assert_eq!(definitions[0].name, "echo");
        assert_eq!(definitions[0].parameters["required"], json!(["message"]));
    }

    #[tokio::test]
    async fn test_registry_execute() {
        let (ctx, _reader) = test_context(EchoModel::new()).await;
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool);

        let call = ToolCallPart::new("c1", "echo", json!({"message": "hello"}));
        let result = registry.execute(&ctx, &call).await;

        assert_eq!(result.tool_call_id, "c1");
        assert_eq!(result.result, json!({"message": "hello"}));
        assert_eq!(result.is_error, None);
    }

    #[tokio::test]
    async fn test_registry_failures_become_error_results() {
        let (ctx, _reader) = test_context(EchoModel::new()).await;
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool);

        let missing = registry
            .execute(&ctx, &ToolCallPart::new("c1", "nonexistent", json!({})))
            .await;
        assert_eq!(missing.is_error, Some(true));
        assert!(missing.result["error"]
            .as_str()
            .unwrap()
            .contains("Tool not found"));

        let bad_args = registry
            .execute(&ctx, &ToolCallPart::new("c2", "echo", json!({})))
            .await;
        assert_eq!(bad_args.is_error, Some(true));
        assert!(bad_args.result["error"]
            .as_str()
            .unwrap()
            .contains("message"));
    }
}
