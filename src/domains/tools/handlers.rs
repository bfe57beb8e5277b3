//! Tool handler contract and result type.
//!
//! Every tool implements [`ToolHandler`] and reports its outcome as a
//! [`ToolOutput`]. The registry only ever talks to tools through this trait.

use rmcp::{
    handler::server::tool::schema_for_type,
    model::{CallToolResult, Content, JsonObject, Tool},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use super::error::ToolError;

/// Output from a tool execution.
///
/// Serialized flat: `{"success": true, ...payload}` on success and
/// `{"success": false, "error": "..."}` on failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOutput {
    /// Whether the execution was successful.
    pub success: bool,

    /// Error message if execution failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// The result data from the tool.
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl ToolOutput {
    /// Create a successful tool output.
    ///
    /// Object payloads are spread into the output; any other value is
    /// stored under `result`.
    pub fn success(data: Value) -> Self {
        let payload = match data {
            Value::Object(map) => map,
            other => {
                let mut map = Map::new();
                map.insert("result".to_string(), other);
                map
            }
        };

        Self {
            success: true,
            error: None,
            payload,
        }
    }

    /// Create a failed tool output.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            payload: Map::new(),
        }
    }

    /// Look up a payload field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }

    /// The output as a single JSON object.
    pub fn to_value(&self) -> Value {
        let mut map = Map::with_capacity(self.payload.len() + 2);
        map.insert("success".to_string(), Value::Bool(self.success));
        if let Some(error) = &self.error {
            map.insert("error".to_string(), Value::String(error.clone()));
        }
        map.extend(self.payload.clone());
        Value::Object(map)
    }

    /// Convert into an MCP tool result: pretty JSON text plus structured
    /// content, flagged as an error when the tool failed.
    pub fn into_call_tool_result(self) -> CallToolResult {
        let value = self.to_value();
        let text = serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string());

        CallToolResult {
            content: vec![Content::text(text)],
            structured_content: Some(value),
            is_error: Some(!self.success),
            meta: None,
        }
    }
}

impl From<ToolError> for ToolOutput {
    fn from(error: ToolError) -> Self {
        Self::failure(error.to_string())
    }
}

/// Trait implemented by every tool.
///
/// Handlers are stateless with respect to calls: any configuration they
/// hold is fixed at construction, so concurrent calls never interact.
#[async_trait::async_trait]
pub trait ToolHandler: Send + Sync {
    /// Get the name of this tool.
    fn name(&self) -> &'static str;

    /// Get the descriptor (name, description, parameter schema).
    fn descriptor(&self) -> Tool;

    /// Execute the tool with already validated arguments.
    async fn execute(&self, arguments: JsonObject) -> Result<ToolOutput, ToolError>;
}

/// Build a descriptor whose input schema is derived from `P`.
pub fn tool_descriptor<P: JsonSchema + 'static>(
    name: &'static str,
    description: &'static str,
) -> Tool {
    Tool {
        name: name.into(),
        description: Some(description.into()),
        input_schema: schema_for_type::<P>().into(),
        annotations: None,
        output_schema: None,
        icons: None,
        meta: None,
        title: None,
    }
}

/// Deserialize validated arguments into a tool's parameter struct.
pub fn parse_params<P: DeserializeOwned>(arguments: JsonObject) -> Result<P, ToolError> {
    serde_json::from_value(Value::Object(arguments))
        .map_err(|e| ToolError::invalid_arguments(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmcp::model::RawContent;
    use serde_json::json;

    #[test]
    fn test_success_serializes_flat() {
        let output = ToolOutput::success(json!({ "result": 4.0, "operation": "add" }));
        let value = serde_json::to_value(&output).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["result"], 4.0);
        assert!(value.get("error").is_none());
        assert_eq!(value, output.to_value());
    }

    #[test]
    fn test_non_object_payload_is_wrapped() {
        let output = ToolOutput::success(json!(42));
        assert_eq!(output.get("result"), Some(&json!(42)));
    }

    #[test]
    fn test_failure_serializes_error() {
        let output = ToolOutput::failure("boom");
        assert_eq!(output.to_value(), json!({ "success": false, "error": "boom" }));
    }

    #[test]
    fn test_round_trips_through_serde() {
        let output = ToolOutput::success(json!({ "count": 3 }));
        let text = serde_json::to_string(&output).unwrap();
        let back: ToolOutput = serde_json::from_str(&text).unwrap();
        assert_eq!(back, output);
    }

    #[test]
    fn test_into_call_tool_result_flags_errors() {
        let result = ToolOutput::failure("nope").into_call_tool_result();
        assert_eq!(result.is_error, Some(true));
        assert_eq!(
            result.structured_content,
            Some(json!({ "success": false, "error": "nope" }))
        );
        match &result.content[0].raw {
            RawContent::Text(t) => assert!(t.text.contains("nope")),
            _ => panic!("Expected text content"),
        }

        let result = ToolOutput::success(json!({ "count": 0 })).into_call_tool_result();
        assert_eq!(result.is_error, Some(false));
    }

    #[test]
    fn test_parse_params_reports_serde_error() {
        #[derive(Debug, Deserialize)]
        struct P {
            #[allow(dead_code)]
            a: f64,
        }
        let err = parse_params::<P>(JsonObject::new()).unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
        assert!(err.to_string().contains("a"));
    }
}
