//! Text processing tool definition.
//!
//! Counting, case transformations, pattern extraction and summary statistics
//! over a bounded piece of text.

use std::sync::LazyLock;

use regex::Regex;
use rmcp::model::{JsonObject, Tool};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, instrument};

use crate::domains::tools::{ToolError, ToolHandler, ToolOutput, parse_params, tool_descriptor};

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\w.-]+@[\w.-]+\.\w+").expect("valid email regex"));

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://[^\s]+").expect("valid url regex"));

// ============================================================================
// Tool Parameters
// ============================================================================

/// Parameters for the process_text tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ProcessTextParams {
    /// Text to process.
    #[schemars(description = "Text to process")]
    pub text: String,

    /// Operation to apply.
    #[schemars(
        description = "Operation: word_count, char_count, reverse, uppercase, lowercase, title_case, extract_emails, extract_urls, summarize_stats"
    )]
    pub operation: String,
}

/// Supported text operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextOperation {
    WordCount,
    CharCount,
    Reverse,
    Uppercase,
    Lowercase,
    TitleCase,
    ExtractEmails,
    ExtractUrls,
    SummarizeStats,
}

impl TextOperation {
    pub const ALL: [TextOperation; 9] = [
        TextOperation::WordCount,
        TextOperation::CharCount,
        TextOperation::Reverse,
        TextOperation::Uppercase,
        TextOperation::Lowercase,
        TextOperation::TitleCase,
        TextOperation::ExtractEmails,
        TextOperation::ExtractUrls,
        TextOperation::SummarizeStats,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TextOperation::WordCount => "word_count",
            TextOperation::CharCount => "char_count",
            TextOperation::Reverse => "reverse",
            TextOperation::Uppercase => "uppercase",
            TextOperation::Lowercase => "lowercase",
            TextOperation::TitleCase => "title_case",
            TextOperation::ExtractEmails => "extract_emails",
            TextOperation::ExtractUrls => "extract_urls",
            TextOperation::SummarizeStats => "summarize_stats",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_str() == name)
    }

    /// Operation-specific result fields.
    pub fn apply(&self, text: &str) -> Value {
        match self {
            TextOperation::WordCount => json!({ "count": text.split_whitespace().count() }),
            TextOperation::CharCount => json!({
                "count": text.chars().count(),
                "count_no_spaces": text.chars().filter(|c| *c != ' ').count(),
            }),
            TextOperation::Reverse => json!({ "result": text.chars().rev().collect::<String>() }),
            TextOperation::Uppercase => json!({ "result": text.to_uppercase() }),
            TextOperation::Lowercase => json!({ "result": text.to_lowercase() }),
            TextOperation::TitleCase => json!({ "result": title_case(text) }),
            TextOperation::ExtractEmails => json!({ "emails": find_all(&EMAIL_RE, text) }),
            TextOperation::ExtractUrls => json!({ "urls": find_all(&URL_RE, text) }),
            TextOperation::SummarizeStats => summarize_stats(text),
        }
    }
}

// ============================================================================
// Tool Definition
// ============================================================================

/// Text processing tool.
#[derive(Debug, Clone)]
pub struct TextProcessorTool {
    max_text_length: usize,
}

impl TextProcessorTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "process_text";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Process text: word_count, char_count, reverse, uppercase, lowercase, title_case, extract_emails, extract_urls, summarize_stats.";

    pub fn new(max_text_length: usize) -> Self {
        Self { max_text_length }
    }

    /// Execute the tool logic.
    #[instrument(skip_all, fields(operation = %params.operation))]
    pub fn execute(&self, params: &ProcessTextParams) -> ToolOutput {
        let length = params.text.chars().count();
        if length > self.max_text_length {
            return ToolOutput::failure(format!(
                "Text too long. Max {} chars",
                self.max_text_length
            ));
        }

        let Some(operation) = TextOperation::parse(&params.operation) else {
            let supported: Vec<&str> = TextOperation::ALL.iter().map(TextOperation::as_str).collect();
            return ToolOutput::failure(format!(
                "Operation '{}' not supported. Use: {}",
                params.operation,
                supported.join(", ")
            ));
        };

        debug!(chars = length, "Processing text");

        let mut output = ToolOutput::success(json!({ "operation": operation.as_str() }));
        if let Value::Object(fields) = operation.apply(&params.text) {
            output.payload.extend(fields);
        }
        output
    }

    /// Create a Tool model for this tool (metadata).
    pub fn to_tool() -> Tool {
        tool_descriptor::<ProcessTextParams>(Self::NAME, Self::DESCRIPTION)
    }
}

#[async_trait::async_trait]
impl ToolHandler for TextProcessorTool {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn descriptor(&self) -> Tool {
        Self::to_tool()
    }

    async fn execute(&self, arguments: JsonObject) -> Result<ToolOutput, ToolError> {
        let params: ProcessTextParams = parse_params(arguments)?;
        Ok(TextProcessorTool::execute(self, &params))
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Capitalize the first letter of every run of letters and lowercase the rest.
fn title_case(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut in_word = false;

    for c in text.chars() {
        if c.is_alphabetic() {
            if in_word {
                result.extend(c.to_lowercase());
            } else {
                result.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            result.push(c);
            in_word = false;
        }
    }

    result
}

fn find_all(re: &Regex, text: &str) -> Vec<String> {
    re.find_iter(text).map(|m| m.as_str().to_string()).collect()
}

fn summarize_stats(text: &str) -> Value {
    let words: Vec<&str> = text.split_whitespace().collect();
    let letters: usize = words.iter().map(|w| w.chars().count()).sum();
    let average = letters as f64 / words.len().max(1) as f64;

    json!({
        "total_chars": text.chars().count(),
        "total_words": words.len(),
        "total_lines": text.lines().count(),
        "avg_word_length": (average * 100.0).round() / 100.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn process(text: &str, operation: &str) -> ToolOutput {
        TextProcessorTool::new(100_000).execute(&ProcessTextParams {
            text: text.to_string(),
            operation: operation.to_string(),
        })
    }

    #[test]
    fn test_counts() {
        let output = process("hello  big\tworld\n", "word_count");
        assert!(output.success);
        assert_eq!(output.get("operation"), Some(&json!("word_count")));
        assert_eq!(output.get("count"), Some(&json!(3)));

        let output = process("héllo wörld", "char_count");
        assert_eq!(output.get("count"), Some(&json!(11)));
        assert_eq!(output.get("count_no_spaces"), Some(&json!(10)));
    }

    #[test]
    fn test_case_transformations() {
        assert_eq!(process("Straße", "uppercase").get("result"), Some(&json!("STRASSE")));
        assert_eq!(process("ABC def", "lowercase").get("result"), Some(&json!("abc def")));
        assert_eq!(
            process("hello wORLD it's 3rd", "title_case").get("result"),
            Some(&json!("Hello World It'S 3Rd"))
        );
        assert_eq!(process("añb", "reverse").get("result"), Some(&json!("bña")));
    }

    #[test]
    fn test_extractions() {
        let output = process(
            "Write to john.doe@example.com or ops-team@mail.example.org today",
            "extract_emails",
        );
        assert_eq!(
            output.get("emails"),
            Some(&json!(["john.doe@example.com", "ops-team@mail.example.org"]))
        );

        let output = process(
            "See https://example.com/a?b=1 and http://test.org, not ftp://x.y",
            "extract_urls",
        );
        assert_eq!(
            output.get("urls"),
            Some(&json!(["https://example.com/a?b=1", "http://test.org,"]))
        );
    }

    #[test]
    fn test_summarize_stats() {
        let output = process("one two three\nfour", "summarize_stats");
        assert_eq!(output.get("total_chars"), Some(&json!(18)));
        assert_eq!(output.get("total_words"), Some(&json!(4)));
        assert_eq!(output.get("total_lines"), Some(&json!(2)));
        assert_eq!(output.get("avg_word_length"), Some(&json!(3.75)));

        let output = process("ab abc abc", "summarize_stats");
        assert_eq!(output.get("avg_word_length"), Some(&json!(2.67)));
    }

    #[test]
    fn test_empty_text_is_valid() {
        assert_eq!(process("", "word_count").get("count"), Some(&json!(0)));
        assert_eq!(process("", "extract_emails").get("emails"), Some(&json!([])));
        assert_eq!(process("", "extract_urls").get("urls"), Some(&json!([])));

        let stats = process("", "summarize_stats");
        assert!(stats.success);
        assert_eq!(stats.get("total_words"), Some(&json!(0)));
        assert_eq!(stats.get("total_lines"), Some(&json!(0)));
        assert_eq!(stats.get("avg_word_length"), Some(&json!(0.0)));
    }

    #[test]
    fn test_text_length_limit_counts_chars() {
        let tool = TextProcessorTool::new(1000);
        let at_limit = "é".repeat(1000);
        let output = tool.execute(&ProcessTextParams {
            text: at_limit.clone(),
            operation: "word_count".to_string(),
        });
        assert!(output.success);

        let output = tool.execute(&ProcessTextParams {
            text: format!("{}x", at_limit),
            operation: "word_count".to_string(),
        });
        assert!(!output.success);
        assert_eq!(output.error.as_deref(), Some("Text too long. Max 1000 chars"));
    }

    #[test]
    fn test_unknown_operation_lists_supported() {
        let output = process("abc", "shout");
        assert!(!output.success);
        let error = output.error.unwrap();
        assert!(error.contains("'shout' not supported"));
        assert!(error.contains("summarize_stats"));
    }
}
