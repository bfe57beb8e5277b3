//! Utility MCP Server Library
//!
//! This crate provides a Model Context Protocol (MCP) server exposing a fixed
//! set of utility tools: arithmetic, date/time formatting, text analysis,
//! bounded URL fetching and JSON/Base64/Hex conversion.
//!
//! # Architecture
//!
//! The server is organized into the following modules:
//!
//! - **core**: Core infrastructure including configuration, error handling,
//!   URL security, the server handler and transports
//! - **domains**: Business logic organized by bounded contexts
//!   - **tools**: the tool registry, dispatcher and tool definitions
//!   - **resources**: the `status://server` resource
//!
//! # Example
//!
//! ```rust,no_run
//! use utility_mcp_server::core::{Config, McpServer, TransportService};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let server = McpServer::new(config.clone())?;
//!     TransportService::new(config.transport).run(server).await?;
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{Config, Error, McpServer, Result};
pub use domains::tools::{ToolOutput, ToolRegistry};
