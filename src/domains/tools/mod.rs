//! Tools domain module.
//!
//! This module handles all tool-related functionality for the MCP server.
//! Tools are executable functions that can be called by MCP clients to perform
//! specific actions or computations.
//!
//! ## Architecture
//!
//! - `definitions/` - Individual tool implementations (one file per tool)
//! - `handlers.rs` - The `ToolHandler` trait and the `ToolOutput` result type
//! - `validation.rs` - Argument checks against each tool's parameter schema
//! - `registry.rs` - Central tool registry and dispatch for every transport
//! - `error.rs` - Tool-specific error types
//!
//! ## Adding a New Tool
//!
//! 1. Create a new file in `definitions/` (e.g., `my_tool.rs`)
//! 2. Define params, a `NAME`, `to_tool()` and implement `ToolHandler`
//! 3. Export in `definitions/mod.rs`
//! 4. Add the handler to `ToolRegistry::new`

pub mod definitions;
mod error;
mod handlers;
mod registry;
pub mod validation;

pub use error::ToolError;
pub use handlers::*;
pub use registry::ToolRegistry;
pub use validation::validate_arguments;
