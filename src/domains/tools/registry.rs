//! Tool Registry - central registration and dispatch for all tools.
//!
//! This module provides:
//! - A registry of all available tools, fixed at process start
//! - Dispatch of tool calls with argument validation and failure isolation
//! - Tool metadata for listing
//!
//! Every transport goes through [`ToolRegistry::dispatch`], so STDIO, TCP and
//! HTTP clients see identical behavior.

use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use rmcp::model::{JsonObject, Tool};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::core::config::Config;
use crate::core::error::{Error, Result};

use super::definitions::{
    CalculateTool, DataConverterTool, DatetimeTool, TextProcessorTool, UrlFetchTool,
};
use super::error::ToolError;
use super::handlers::{ToolHandler, ToolOutput};
use super::validation::validate_arguments;

// ============================================================================
// Tool Registry
// ============================================================================

/// Tool registry - manages all available tools.
///
/// Immutable once built. Cloning is cheap and shares the handlers.
#[derive(Clone)]
pub struct ToolRegistry {
    tools: HashMap<&'static str, Arc<dyn ToolHandler>>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tool_names())
            .finish()
    }
}

impl ToolRegistry {
    /// Create the registry holding every built-in tool.
    pub fn new(config: &Config) -> Result<Self> {
        let handlers: Vec<Arc<dyn ToolHandler>> = vec![
            Arc::new(CalculateTool::new()),
            Arc::new(DatetimeTool::new()),
            Arc::new(TextProcessorTool::new(config.limits.max_text_length)),
            Arc::new(UrlFetchTool::new(config)?),
            Arc::new(DataConverterTool::new()),
        ];

        let registry = Self::with_handlers(handlers)?;
        info!("Registered {} tools: {:?}", registry.len(), registry.tool_names());
        Ok(registry)
    }

    /// Create a registry from an explicit list of handlers.
    ///
    /// Two handlers sharing a name is a configuration error.
    pub fn with_handlers(handlers: impl IntoIterator<Item = Arc<dyn ToolHandler>>) -> Result<Self> {
        let mut tools: HashMap<&'static str, Arc<dyn ToolHandler>> = HashMap::new();

        for handler in handlers {
            let name = handler.name();
            if tools.insert(name, handler).is_some() {
                return Err(Error::config(format!("Duplicate tool name: {}", name)));
            }
        }

        Ok(Self { tools })
    }

    /// Get all tool names, sorted.
    pub fn tool_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.tools.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Get all tools as Tool models (metadata), sorted by name.
    ///
    /// This is the single source of truth for all available tools.
    pub fn catalog(&self) -> Vec<Tool> {
        self.tool_names()
            .into_iter()
            .filter_map(|name| self.tools.get(name))
            .map(|handler| handler.descriptor())
            .collect()
    }

    /// Check whether a tool is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Dispatch a tool call.
    ///
    /// Never fails: lookup, validation and execution errors, including
    /// panics inside a tool, come back as a failed [`ToolOutput`].
    pub async fn dispatch(&self, name: &str, arguments: Value) -> ToolOutput {
        let Some(handler) = self.tools.get(name) else {
            warn!("Unknown tool requested: {}", name);
            return ToolError::not_found(name).into();
        };

        let arguments = match prepare_arguments(handler.as_ref(), arguments) {
            Ok(arguments) => arguments,
            Err(e) => {
                debug!(tool = name, error = %e, "Rejected tool arguments");
                return e.into();
            }
        };

        debug!(tool = name, "Executing tool");

        match AssertUnwindSafe(handler.execute(arguments)).catch_unwind().await {
            Ok(Ok(output)) => {
                if !output.success {
                    debug!(tool = name, error = ?output.error, "Tool reported failure");
                }
                output
            }
            Ok(Err(e)) => {
                warn!(tool = name, error = %e, "Tool execution failed");
                e.into()
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                error!(tool = name, "Tool panicked: {}", message);
                ToolError::internal(message).into()
            }
        }
    }
}

/// Normalize the raw argument payload and validate it against the schema.
fn prepare_arguments(handler: &dyn ToolHandler, arguments: Value) -> std::result::Result<JsonObject, ToolError> {
    let arguments = match arguments {
        Value::Null => JsonObject::new(),
        Value::Object(map) => map,
        other => {
            return Err(ToolError::invalid_arguments(format!(
                "expected an object, got {}",
                json_type(&other)
            )));
        }
    };

    let descriptor = handler.descriptor();
    validate_arguments(&descriptor.input_schema, arguments)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "tool panicked".to_string()
    }
}
