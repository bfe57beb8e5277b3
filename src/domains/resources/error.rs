//! Resource-specific error types.

use thiserror::Error;

/// Errors that can occur during resource operations.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// The requested resource was not found.
    #[error("Resource not found: {0}")]
    NotFound(String),
}

impl ResourceError {
    /// Create a new "not found" error.
    pub fn not_found(uri: impl Into<String>) -> Self {
        Self::NotFound(uri.into())
    }

    /// The MCP error reported to clients.
    pub fn to_mcp_error(&self) -> rmcp::ErrorData {
        match self {
            Self::NotFound(uri) => rmcp::ErrorData::resource_not_found(
                self.to_string(),
                Some(serde_json::json!({ "uri": uri })),
            ),
        }
    }
}
