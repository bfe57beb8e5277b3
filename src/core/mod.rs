//! Core module containing shared infrastructure components.
//!
//! This module provides the foundational building blocks for the MCP server,
//! including error handling, configuration, URL security checks, the server
//! handler and transport layer abstractions.

pub mod config;
pub mod error;
pub mod security;
pub mod server;
pub mod transport;

pub use config::Config;
pub use error::{Error, Result};
pub use security::{UrlSecurityError, validate_url};
pub use server::McpServer;
pub use transport::{TransportConfig, TransportService};
