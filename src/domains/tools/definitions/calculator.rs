//! Calculator tool definition.
//!
//! Basic arithmetic on two operands.

use rmcp::model::{JsonObject, Tool};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument};

use crate::domains::tools::{ToolError, ToolHandler, ToolOutput, parse_params, tool_descriptor};

// ============================================================================
// Tool Parameters
// ============================================================================

/// Parameters for the calculate tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CalculateParams {
    /// Operation to execute.
    #[schemars(description = "Operation to execute: add, subtract, multiply, divide, power")]
    pub operation: String,

    /// First operand.
    #[schemars(description = "First operand")]
    pub a: f64,

    /// Second operand.
    #[schemars(description = "Second operand")]
    pub b: f64,
}

/// The closed set of supported operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::Add,
        Operation::Subtract,
        Operation::Multiply,
        Operation::Divide,
        Operation::Power,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Add => "add",
            Operation::Subtract => "subtract",
            Operation::Multiply => "multiply",
            Operation::Divide => "divide",
            Operation::Power => "power",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_str() == name)
    }

    /// Apply the operator. Division by zero and non-finite results are
    /// reported as errors.
    pub fn apply(&self, a: f64, b: f64) -> Result<f64, String> {
        let result = match self {
            Operation::Add => a + b,
            Operation::Subtract => a - b,
            Operation::Multiply => a * b,
            Operation::Divide => {
                if b == 0.0 {
                    return Err("Division by zero not allowed".to_string());
                }
                a / b
            }
            Operation::Power => a.powf(b),
        };

        if result.is_finite() {
            Ok(result)
        } else {
            Err(format!(
                "Result of {} on {} and {} is not a finite number",
                self.as_str(),
                a,
                b
            ))
        }
    }
}

fn supported_operations() -> String {
    Operation::ALL
        .iter()
        .map(Operation::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

// ============================================================================
// Tool Definition
// ============================================================================

/// Calculate tool - basic math on two operands.
#[derive(Debug, Clone, Default)]
pub struct CalculateTool;

impl CalculateTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "calculate";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Execute a basic math operation (add, subtract, multiply, divide, power) on two operands. Returns the operation, the operands and the result.";

    pub fn new() -> Self {
        Self
    }

    /// Execute the tool logic.
    #[instrument(skip_all, fields(operation = %params.operation))]
    pub fn execute(params: &CalculateParams) -> ToolOutput {
        let Some(operation) = Operation::parse(&params.operation) else {
            return ToolOutput::failure(format!(
                "Operation '{}' not supported. Use: {}",
                params.operation,
                supported_operations()
            ));
        };

        match operation.apply(params.a, params.b) {
            Ok(result) => {
                debug!("{} {} {} = {}", params.a, operation.as_str(), params.b, result);
                ToolOutput::success(json!({
                    "operation": operation.as_str(),
                    "operands": { "a": params.a, "b": params.b },
                    "result": result,
                }))
            }
            Err(message) => ToolOutput::failure(message),
        }
    }

    /// Create a Tool model for this tool (metadata).
    pub fn to_tool() -> Tool {
        tool_descriptor::<CalculateParams>(Self::NAME, Self::DESCRIPTION)
    }
}

#[async_trait::async_trait]
impl ToolHandler for CalculateTool {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn descriptor(&self) -> Tool {
        Self::to_tool()
    }

    async fn execute(&self, arguments: JsonObject) -> Result<ToolOutput, ToolError> {
        let params: CalculateParams = parse_params(arguments)?;
        Ok(Self::execute(&params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calc(operation: &str, a: f64, b: f64) -> ToolOutput {
        CalculateTool::execute(&CalculateParams {
            operation: operation.to_string(),
            a,
            b,
        })
    }

    #[test]
    fn test_each_operation() {
        let cases = [
            ("add", 2.0, 3.0, 5.0),
            ("subtract", 2.0, 3.0, -1.0),
            ("multiply", -4.0, 2.5, -10.0),
            ("divide", 7.0, 2.0, 3.5),
            ("power", 2.0, 10.0, 1024.0),
            ("power", 9.0, 0.5, 3.0),
        ];

        for (op, a, b, expected) in cases {
            let output = calc(op, a, b);
            assert!(output.success, "{} failed: {:?}", op, output.error);
            assert_eq!(output.get("result"), Some(&json!(expected)), "{}", op);
            assert_eq!(output.get("operation"), Some(&json!(op)));
            assert_eq!(output.get("operands"), Some(&json!({ "a": a, "b": b })));
        }
    }

    #[test]
    fn test_divide_by_zero_is_failure() {
        let output = calc("divide", 1.0, 0.0);
        assert!(!output.success);
        assert_eq!(output.error.as_deref(), Some("Division by zero not allowed"));

        assert!(!calc("divide", 0.0, -0.0).success);
    }

    #[test]
    fn test_unknown_operation_is_failure() {
        let output = calc("modulo", 1.0, 2.0);
        assert!(!output.success);
        let error = output.error.unwrap();
        assert!(error.contains("'modulo' not supported"));
        assert!(error.contains("add, subtract, multiply, divide, power"));
    }

    #[test]
    fn test_operation_names_are_case_sensitive() {
        assert!(!calc("ADD", 1.0, 2.0).success);
    }

    #[test]
    fn test_non_finite_results_are_failures() {
        assert!(!calc("power", 10.0, 400.0).success);
        assert!(!calc("power", -8.0, 0.5).success);
        assert!(!calc("multiply", f64::MAX, 2.0).success);
    }

    #[test]
    fn test_descriptor_schema_lists_parameters() {
        let tool = CalculateTool::to_tool();
        assert_eq!(tool.name, "calculate");
        let properties = tool.input_schema["properties"].as_object().unwrap();
        assert!(properties.contains_key("operation"));
        assert!(properties.contains_key("a"));
        assert!(properties.contains_key("b"));
    }

    #[tokio::test]
    async fn test_handler_parses_arguments() {
        let args = json!({ "operation": "add", "a": 1, "b": 2 })
            .as_object()
            .cloned()
            .unwrap();
        let output = ToolHandler::execute(&CalculateTool, args).await.unwrap();
        assert_eq!(output.get("result"), Some(&json!(3.0)));
    }
}
