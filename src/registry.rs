//! Tool registry and dispatch.
//!
//! The registry is assembled once at startup and never mutated afterwards.
//! Dispatch is infallible at the protocol level: every failure becomes a
//! tool result with the error flag set, so agent sessions survive bad
//! calls and upstream outages.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use rmcp::model::{CallToolResult, Content, JsonObject, Tool};

use crate::arguments::{self, ArgumentMap};
use crate::error::{BridgeError, InvokeError, Result};
use crate::projection::ToolDefinition;

/// One callable tool body. Implementations hold whatever upstream client
/// and identifiers they need.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn call(&self, args: ArgumentMap) -> std::result::Result<CallToolResult, InvokeError>;
}

struct RegisteredTool {
    definition: ToolDefinition,
    handler: Arc<dyn ToolHandler>,
}

/// Name-addressed tool table, insertion ordered.
#[derive(Default)]
pub struct ToolRegistry {
    entries: Vec<RegisteredTool>,
    index: HashMap<String, usize>,
}

// Handlers are trait objects, so only the tool names are rendered.
impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolRegistry").field("tools", &self.names()).finish()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool. Names are unique; a second registration under the same
    /// name is refused so one tool cannot silently shadow another.
    pub fn register(
        &mut self,
        definition: ToolDefinition,
        handler: Arc<dyn ToolHandler>,
    ) -> Result<()> {
        if self.index.contains_key(&definition.name) {
            return Err(BridgeError::DuplicateTool(definition.name.clone()));
        }

        self.index.insert(definition.name.clone(), self.entries.len());
        self.entries.push(RegisteredTool { definition, handler });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries
            .iter()
            .map(|entry| entry.definition.name.as_str())
            .collect()
    }

    /// Render the registry in protocol form, in registration order.
    pub fn tool_listing(&self) -> Vec<Tool> {
        self.entries
            .iter()
            .map(|entry| {
                Tool::new(
                    entry.definition.name.clone(),
                    entry.definition.description.clone(),
                    Arc::new(entry.definition.input_schema()),
                )
            })
            .collect()
    }

    /// Run one tool call. Unknown names, malformed arguments and handler
    /// failures all come back as error-flagged results, never as Err.
    pub async fn dispatch(&self, name: &str, raw_args: Option<JsonObject>) -> CallToolResult {
        metrics::counter!("tool_invocations_total").increment(1);
        let started = Instant::now();

        let Some(entry) = self.index.get(name).map(|&i| &self.entries[i]) else {
            tracing::warn!(tool = name, "call for unknown tool");
            metrics::counter!("tool_invocation_errors_total").increment(1);
            return CallToolResult::error(vec![Content::text(format!("Unknown tool: {name}"))]);
        };

        let outcome = async {
            let args = arguments::from_request_object(raw_args)?;
            arguments::validate(&args, &entry.definition.params)?;
            entry.handler.call(args).await
        }
        .await;

        let elapsed = started.elapsed().as_secs_f64();
        metrics::histogram!("tool_invocation_duration_seconds").record(elapsed);

        match outcome {
            Ok(result) => {
                tracing::debug!(tool = name, elapsed_secs = elapsed, "tool call completed");
                result
            }
            Err(err) => {
                tracing::warn!(tool = name, error = %err, "tool call failed");
                metrics::counter!("tool_invocation_errors_total").increment(1);
                CallToolResult::error(vec![Content::text(err.to_string())])
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::{ParamKind, ParamSpec, ParameterSchema};
    use serde_json::{json, Value};

    struct Echo;

    #[async_trait]
    impl ToolHandler for Echo {
        async fn call(
            &self,
            args: ArgumentMap,
        ) -> std::result::Result<CallToolResult, InvokeError> {
            Ok(CallToolResult::success(vec![Content::text(format!(
                "{} args",
                args.len()
            ))]))
        }
    }

    struct Failing;

    #[async_trait]
    impl ToolHandler for Failing {
        async fn call(
            &self,
            _args: ArgumentMap,
        ) -> std::result::Result<CallToolResult, InvokeError> {
            Err(InvokeError::Arguments("handler exploded".to_string()))
        }
    }

    fn definition(name: &str, params: ParameterSchema) -> ToolDefinition {
        ToolDefinition {
            name: name.to_string(),
            description: format!("{name} test tool"),
            params,
        }
    }

    fn first_text(result: &CallToolResult) -> String {
        result
            .content
            .first()
            .and_then(|content| content.as_text())
            .map(|text| text.text.clone())
            .unwrap_or_default()
    }

    fn args(value: Value) -> Option<JsonObject> {
        value.as_object().cloned()
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut registry = ToolRegistry::new();
        registry
            .register(definition("echo", ParameterSchema::Open), Arc::new(Echo))
            .unwrap();

        let err = registry
            .register(definition("echo", ParameterSchema::Open), Arc::new(Echo))
            .unwrap_err();
        assert!(matches!(err, BridgeError::DuplicateTool(name) if name == "echo"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_listing_preserves_registration_order() {
        let mut registry = ToolRegistry::new();
        registry
            .register(definition("zed", ParameterSchema::Open), Arc::new(Echo))
            .unwrap();
        registry
            .register(definition("alpha", ParameterSchema::Open), Arc::new(Echo))
            .unwrap();

        let names: Vec<_> = registry
            .tool_listing()
            .iter()
            .map(|tool| tool.name.to_string())
            .collect();
        assert_eq!(names, vec!["zed", "alpha"]);
    }

    #[test]
    fn test_debug_output_names_registered_tools() {
        let mut registry = ToolRegistry::new();
        registry
            .register(definition("echo", ParameterSchema::Open), Arc::new(Echo))
            .unwrap();

        let rendered = format!("{registry:?}");
        assert!(rendered.contains("ToolRegistry"));
        assert!(rendered.contains("echo"));
    }

    #[tokio::test]
    async fn test_unknown_tool_is_error_result() {
        let registry = ToolRegistry::new();
        let result = registry.dispatch("nope", None).await;

        assert_eq!(result.is_error, Some(true));
        assert!(first_text(&result).contains("Unknown tool: nope"));
    }

    #[tokio::test]
    async fn test_dispatch_runs_handler() {
        let mut registry = ToolRegistry::new();
        registry
            .register(definition("echo", ParameterSchema::Open), Arc::new(Echo))
            .unwrap();

        let result = registry.dispatch("echo", args(json!({"a": 1, "b": 2}))).await;
        assert_eq!(result.is_error, Some(false));
        assert_eq!(first_text(&result), "2 args");
    }

    #[tokio::test]
    async fn test_invalid_arguments_become_error_result() {
        let mut registry = ToolRegistry::new();
        let schema = ParameterSchema::Declared(vec![ParamSpec::required(
            "date",
            ParamKind::String,
            "Day to query",
        )]);
        registry
            .register(definition("slots", schema), Arc::new(Echo))
            .unwrap();

        let result = registry.dispatch("slots", args(json!({}))).await;
        assert_eq!(result.is_error, Some(true));
        assert!(first_text(&result).contains("missing required argument"));

        let result = registry.dispatch("slots", args(json!({"date": ["nested"]}))).await;
        assert_eq!(result.is_error, Some(true));
    }

    #[tokio::test]
    async fn test_handler_error_folds_into_result() {
        let mut registry = ToolRegistry::new();
        registry
            .register(definition("boom", ParameterSchema::Open), Arc::new(Failing))
            .unwrap();

        let result = registry.dispatch("boom", None).await;
        assert_eq!(result.is_error, Some(true));
        assert!(first_text(&result).contains("handler exploded"));
    }
}
