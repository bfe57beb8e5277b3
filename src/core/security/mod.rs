// Security module for outbound request validation
//
// This module provides utilities to ensure that network operations
// initiated by tools only target permitted schemes and hosts.

pub mod url_validator;

pub use url_validator::{validate_url, UrlSecurityError};
