//! URL fetch tool definition.
//!
//! Performs a bounded GET or HEAD request against an external URL through a
//! single shared HTTP client. The client is built once at startup with the
//! configured timeout and connection pool size.

use std::time::Duration;

use reqwest::{Client, Method, header::HeaderMap};
use rmcp::model::{JsonObject, Tool};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::{debug, instrument, warn};

use crate::core::config::{Config, FetchConfig};
use crate::core::error::{Error, Result};
use crate::core::security::validate_url;
use crate::domains::tools::{ToolError, ToolHandler, ToolOutput, parse_params, tool_descriptor};

// ============================================================================
// Tool Parameters
// ============================================================================

/// Parameters for the fetch_url tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct FetchUrlParams {
    /// URL to fetch.
    #[schemars(description = "URL to fetch (http:// or https://)")]
    pub url: String,

    /// HTTP method.
    #[serde(default = "default_method")]
    #[schemars(description = "HTTP method: GET or HEAD (default: GET)")]
    pub method: String,
}

fn default_method() -> String {
    "GET".to_string()
}

// ============================================================================
// Tool Definition
// ============================================================================

/// URL fetch tool.
#[derive(Debug, Clone)]
pub struct UrlFetchTool {
    client: Client,
    fetch: FetchConfig,
    max_content: usize,
}

impl UrlFetchTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "fetch_url";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Fetch an external URL with GET or HEAD. Returns the status code, response headers and a truncated preview of the body.";

    /// Build the tool and its shared HTTP client.
    pub fn new(config: &Config) -> Result<Self> {
        let client = build_client(
            config.http_client.timeout()?,
            config.http_client.max_idle_per_host,
        )?;

        Ok(Self {
            client,
            fetch: config.fetch.clone(),
            max_content: config.limits.max_url_content,
        })
    }

    /// Execute the tool logic.
    #[instrument(skip_all, fields(url = %params.url, method = %params.method))]
    pub async fn fetch(&self, params: &FetchUrlParams) -> ToolOutput {
        if !self.fetch.enabled {
            return ToolOutput::failure(format!("Tool {} disabled", Self::NAME));
        }

        let method = match params.method.trim().to_uppercase().as_str() {
            "GET" => Method::GET,
            "HEAD" => Method::HEAD,
            other => {
                return ToolOutput::failure(format!(
                    "Method '{}' not supported. Use: GET, HEAD",
                    other
                ));
            }
        };

        let url = match validate_url(&params.url, &self.fetch) {
            Ok(url) => url,
            Err(e) => return ToolOutput::failure(e.to_string()),
        };

        debug!("Sending request");

        let response = match self.client.request(method.clone(), url).send().await {
            Ok(response) => response,
            Err(e) => return request_failure(e),
        };

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Upstream returned an error status");
            return ToolOutput::failure(format!(
                "HTTP {} {} for {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown"),
                params.url.trim()
            ));
        }

        let headers = headers_to_json(response.headers());

        let (content_preview, content_length) = if method == Method::HEAD {
            (Value::Null, Value::Null)
        } else {
            match response.text().await {
                Ok(body) => {
                    let preview: String = body.chars().take(self.max_content).collect();
                    (Value::String(preview), json!(body.chars().count()))
                }
                Err(e) => return request_failure(e),
            }
        };

        ToolOutput::success(json!({
            "url": params.url.trim(),
            "method": method.as_str(),
            "status_code": status.as_u16(),
            "headers": headers,
            "content_preview": content_preview,
            "content_length": content_length,
        }))
    }

    /// Create a Tool model for this tool (metadata).
    pub fn to_tool() -> Tool {
        tool_descriptor::<FetchUrlParams>(Self::NAME, Self::DESCRIPTION)
    }
}

#[async_trait::async_trait]
impl ToolHandler for UrlFetchTool {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn descriptor(&self) -> Tool {
        Self::to_tool()
    }

    async fn execute(&self, arguments: JsonObject) -> std::result::Result<ToolOutput, ToolError> {
        let params: FetchUrlParams = parse_params(arguments)?;
        Ok(self.fetch(&params).await)
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn build_client(timeout: Duration, max_idle_per_host: usize) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .pool_max_idle_per_host(max_idle_per_host)
        .build()
        .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))
}

fn request_failure(error: reqwest::Error) -> ToolOutput {
    if error.is_timeout() {
        warn!("Request timed out");
        ToolError::Timeout.into()
    } else {
        warn!(error = %error, "Request failed");
        ToolOutput::failure(format!("Request failed: {}", error))
    }
}

/// Repeated headers are joined with ", ".
fn headers_to_json(headers: &HeaderMap) -> Value {
    let mut map = Map::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        match map.get_mut(name.as_str()) {
            Some(Value::String(existing)) => {
                existing.push_str(", ");
                existing.push_str(&value);
            }
            _ => {
                map.insert(name.as_str().to_string(), Value::String(value));
            }
        }
    }
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn tool_with(configure: impl FnOnce(&mut Config)) -> UrlFetchTool {
        let mut config = Config::new();
        configure(&mut config);
        UrlFetchTool::new(&config).unwrap()
    }

    fn params(url: &str, method: &str) -> FetchUrlParams {
        FetchUrlParams {
            url: url.to_string(),
            method: method.to_string(),
        }
    }

    #[tokio::test]
    async fn test_get_returns_truncated_preview() {
        let server = MockServer::start().await;
        let body = "a".repeat(150);

        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(body)
                    .insert_header("x-test", "yes"),
            )
            .mount(&server)
            .await;

        let tool = tool_with(|c| c.limits.max_url_content = 100);
        let url = format!("{}/page", server.uri());
        let output = tool.fetch(&params(&url, "get")).await;

        assert!(output.success, "{:?}", output.error);
        assert_eq!(output.get("method"), Some(&json!("GET")));
        assert_eq!(output.get("status_code"), Some(&json!(200)));
        assert_eq!(output.get("content_length"), Some(&json!(150)));
        assert_eq!(output.get("content_preview"), Some(&json!("a".repeat(100))));
        assert_eq!(output.get("headers").unwrap()["x-test"], "yes");
        assert_eq!(output.get("url"), Some(&json!(url)));
    }

    #[tokio::test]
    async fn test_head_has_no_content() {
        let server = MockServer::start().await;

        Mock::given(method("HEAD"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let tool = tool_with(|_| {});
        let output = tool.fetch(&params(&format!("{}/", server.uri()), "HEAD")).await;

        assert!(output.success, "{:?}", output.error);
        assert_eq!(output.get("status_code"), Some(&json!(204)));
        assert_eq!(output.get("content_preview"), Some(&Value::Null));
        assert_eq!(output.get("content_length"), Some(&Value::Null));
    }

    #[tokio::test]
    async fn test_error_status_is_failure() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Not found"))
            .mount(&server)
            .await;

        let tool = tool_with(|_| {});
        let url = format!("{}/missing", server.uri());
        let output = tool.fetch(&params(&url, "GET")).await;

        assert!(!output.success);
        assert_eq!(output.error, Some(format!("HTTP 404 Not Found for {}", url)));
    }

    #[tokio::test]
    async fn test_timeout_is_reported() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let tool = tool_with(|c| c.http_client.timeout_secs = 0.2);
        let output = tool.fetch(&params(&server.uri(), "GET")).await;

        assert!(!output.success);
        assert_eq!(output.error.as_deref(), Some("Request timeout"));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_request_failure() {
        let tool = tool_with(|c| c.http_client.timeout_secs = 2.0);
        let output = tool.fetch(&params("http://127.0.0.1:1/", "GET")).await;

        assert!(!output.success);
        assert!(output.error.unwrap().starts_with("Request failed:"));
    }

    #[tokio::test]
    async fn test_rejects_before_any_request() {
        let tool = tool_with(|_| {});

        let output = tool.fetch(&params("ftp://example.com", "GET")).await;
        assert_eq!(
            output.error.as_deref(),
            Some("URL must start with http:// or https://")
        );

        let output = tool.fetch(&params("https://example.com", "POST")).await;
        assert_eq!(
            output.error.as_deref(),
            Some("Method 'POST' not supported. Use: GET, HEAD")
        );
    }

    #[tokio::test]
    async fn test_domain_allow_list() {
        let tool = tool_with(|c| c.fetch.allowed_domains = Some(vec!["example.com".to_string()]));
        let output = tool.fetch(&params("https://evil.org/x", "GET")).await;

        assert!(!output.success);
        assert!(output.error.unwrap().contains("Domain not allowed"));
    }

    #[tokio::test]
    async fn test_disabled_tool() {
        let tool = tool_with(|c| c.fetch.enabled = false);
        let output = tool.fetch(&params("https://example.com", "GET")).await;

        assert_eq!(output.error.as_deref(), Some("Tool fetch_url disabled"));
    }

    #[test]
    fn test_repeated_headers_are_joined() {
        let mut headers = HeaderMap::new();
        headers.append("set-cookie", "a=1".parse().unwrap());
        headers.append("set-cookie", "b=2".parse().unwrap());
        assert_eq!(headers_to_json(&headers), json!({ "set-cookie": "a=1, b=2" }));
    }
}
