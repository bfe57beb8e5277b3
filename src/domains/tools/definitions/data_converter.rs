//! Data conversion tool definition.
//!
//! Converts between JSON, Base64 and Hex representations.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rmcp::model::{JsonObject, Tool};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, instrument};

use crate::domains::tools::{ToolError, ToolHandler, ToolOutput, parse_params, tool_descriptor};

// ============================================================================
// Tool Parameters
// ============================================================================

/// Parameters for the convert_data tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ConvertDataParams {
    /// Data to convert.
    #[schemars(description = "Data to convert")]
    pub data: String,

    /// Source format.
    #[schemars(description = "Source format: json, base64, hex")]
    pub from_format: String,

    /// Target format.
    #[schemars(description = "Target format: json, base64, hex")]
    pub to_format: String,
}

/// A supported data representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    Json,
    Base64,
    Hex,
}

/// Intermediate value between decoding and encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    /// A parsed JSON document.
    Json(Value),
    /// UTF-8 text recovered from bytes.
    Text(String),
}

impl Decoded {
    /// Text form used by the byte encodings. JSON values, strings included,
    /// are serialized compactly so decoding them back yields the same value.
    fn into_text(self) -> String {
        match self {
            Decoded::Json(value) => value.to_string(),
            Decoded::Text(text) => text,
        }
    }
}

impl DataFormat {
    pub const ALL: [DataFormat; 3] = [DataFormat::Json, DataFormat::Base64, DataFormat::Hex];

    pub fn as_str(&self) -> &'static str {
        match self {
            DataFormat::Json => "json",
            DataFormat::Base64 => "base64",
            DataFormat::Hex => "hex",
        }
    }

    /// Case-insensitive lookup.
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim().to_lowercase();
        Self::ALL.into_iter().find(|f| f.as_str() == name)
    }

    pub fn decode(&self, data: &str) -> Result<Decoded, String> {
        let data = data.trim();
        match self {
            DataFormat::Json => serde_json::from_str(data)
                .map(Decoded::Json)
                .map_err(|e| format!("JSON parse error: {}", e)),
            DataFormat::Base64 => {
                let bytes = STANDARD
                    .decode(data)
                    .map_err(|e| format!("Decode error: {}", e))?;
                utf8_text(bytes)
            }
            DataFormat::Hex => {
                let bytes = hex::decode(data).map_err(|e| format!("Decode error: {}", e))?;
                utf8_text(bytes)
            }
        }
    }

    pub fn encode(&self, decoded: Decoded) -> Result<String, String> {
        match self {
            DataFormat::Json => {
                let value = match decoded {
                    Decoded::Json(value) => value,
                    Decoded::Text(text) => {
                        serde_json::from_str(&text).unwrap_or(Value::String(text))
                    }
                };
                serde_json::to_string_pretty(&value).map_err(|e| format!("Encode error: {}", e))
            }
            DataFormat::Base64 => Ok(STANDARD.encode(decoded.into_text())),
            DataFormat::Hex => Ok(hex::encode(decoded.into_text())),
        }
    }
}

fn utf8_text(bytes: Vec<u8>) -> Result<Decoded, String> {
    String::from_utf8(bytes)
        .map(Decoded::Text)
        .map_err(|e| format!("Decode error: {}", e))
}

// ============================================================================
// Tool Definition
// ============================================================================

/// Data conversion tool.
#[derive(Debug, Clone, Default)]
pub struct DataConverterTool;

impl DataConverterTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "convert_data";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Convert data between formats: json, base64, hex.";

    pub fn new() -> Self {
        Self
    }

    /// Execute the tool logic.
    #[instrument(skip_all, fields(from = %params.from_format, to = %params.to_format))]
    pub fn execute(params: &ConvertDataParams) -> ToolOutput {
        let (Some(from), Some(to)) = (
            DataFormat::parse(&params.from_format),
            DataFormat::parse(&params.to_format),
        ) else {
            return ToolOutput::failure("Supported formats: json, base64, hex");
        };

        let result = from.decode(&params.data).and_then(|decoded| to.encode(decoded));

        match result {
            Ok(result) => {
                debug!(bytes = result.len(), "Conversion complete");
                ToolOutput::success(json!({
                    "from_format": from.as_str(),
                    "to_format": to.as_str(),
                    "result": result,
                }))
            }
            Err(message) => ToolOutput::failure(message),
        }
    }

    /// Create a Tool model for this tool (metadata).
    pub fn to_tool() -> Tool {
        tool_descriptor::<ConvertDataParams>(Self::NAME, Self::DESCRIPTION)
    }
}

#[async_trait::async_trait]
impl ToolHandler for DataConverterTool {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn descriptor(&self) -> Tool {
        Self::to_tool()
    }

    async fn execute(&self, arguments: JsonObject) -> Result<ToolOutput, ToolError> {
        let params: ConvertDataParams = parse_params(arguments)?;
        Ok(Self::execute(&params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert(data: &str, from: &str, to: &str) -> ToolOutput {
        DataConverterTool::execute(&ConvertDataParams {
            data: data.to_string(),
            from_format: from.to_string(),
            to_format: to.to_string(),
        })
    }

    fn result(output: &ToolOutput) -> &str {
        assert!(output.success, "{:?}", output.error);
        output.get("result").and_then(Value::as_str).unwrap()
    }

    #[test]
    fn test_json_to_base64_and_back() {
        let original = json!({ "name": "café", "tags": [1, 2] });
        let encoded = convert(&original.to_string(), "json", "base64");
        let decoded = convert(result(&encoded), "base64", "json");

        let back: Value = serde_json::from_str(result(&decoded)).unwrap();
        assert_eq!(back, original);
    }

    #[test]
    fn test_json_scalars_survive_byte_encodings() {
        for original in [json!("123"), json!("true"), json!("[1,2]"), json!(42), Value::Null] {
            for format in ["base64", "hex"] {
                let encoded = convert(&original.to_string(), "json", format);
                let decoded = convert(result(&encoded), format, "json");

                let back: Value = serde_json::from_str(result(&decoded)).unwrap();
                assert_eq!(back, original, "{} via {}", original, format);
            }
        }
    }

    #[test]
    fn test_json_string_keeps_its_quotes() {
        let output = convert(r#""hi""#, "json", "hex");
        assert_eq!(result(&output), "22686922");
    }

    #[test]
    fn test_hex_to_base64_and_back() {
        let encoded = convert("48656c6c6f2c20776f726c64", "hex", "base64");
        assert_eq!(result(&encoded), "SGVsbG8sIHdvcmxk");

        let back = convert(result(&encoded), "base64", "hex");
        assert_eq!(result(&back), "48656c6c6f2c20776f726c64");
    }

    #[test]
    fn test_json_output_is_pretty_and_unescaped() {
        let output = convert(&STANDARD.encode(r#"{"a":"é"}"#), "base64", "json");
        assert_eq!(result(&output), "{\n  \"a\": \"é\"\n}");
    }

    #[test]
    fn test_plain_text_becomes_json_string() {
        let output = convert("68656c6c6f", "hex", "json");
        assert_eq!(result(&output), "\"hello\"");
    }

    #[test]
    fn test_formats_are_case_insensitive() {
        let output = convert("  aGk= \n", "BASE64", "Hex");
        assert_eq!(result(&output), "6869");
        assert_eq!(output.get("from_format"), Some(&json!("base64")));
        assert_eq!(output.get("to_format"), Some(&json!("hex")));
    }

    #[test]
    fn test_hex_output_is_lowercase() {
        let output = convert("4A4B", "hex", "hex");
        assert_eq!(result(&output), "4a4b");
    }

    #[test]
    fn test_unsupported_format() {
        let output = convert("x", "yaml", "json");
        assert!(!output.success);
        assert_eq!(output.error.as_deref(), Some("Supported formats: json, base64, hex"));
    }

    #[test]
    fn test_malformed_input() {
        let output = convert("{not json", "json", "base64");
        assert!(output.error.unwrap().starts_with("JSON parse error:"));

        let output = convert("abc", "hex", "json");
        assert!(output.error.unwrap().starts_with("Decode error:"));

        let output = convert("!!!", "base64", "json");
        assert!(output.error.unwrap().starts_with("Decode error:"));

        // 0xff is not valid UTF-8
        let output = convert("ff", "hex", "base64");
        assert!(output.error.unwrap().starts_with("Decode error:"));
    }
}
