//! Configuration management for the MCP server.
//!
//! This module provides a centralized configuration structure that can be
//! populated from environment variables (optionally via a `.env` file) or
//! defaults. All variables use the `MCP_` prefix.

use super::error::{Error, Result};
use super::transport::TransportConfig;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

/// Main configuration structure for the MCP server.
///
/// This struct contains all configurable aspects of the server, organized
/// by concern for clarity and maintainability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Transport configuration.
    pub transport: TransportConfig,

    /// Outbound HTTP client settings used by `fetch_url`.
    pub http_client: HttpClientConfig,

    /// Input and output size limits for tools.
    pub limits: LimitsConfig,

    /// `fetch_url` feature flag and domain allow-list.
    pub fetch: FetchConfig,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The name of the server as reported to clients.
    pub name: String,

    /// The version of the server.
    pub version: String,

    /// Debug mode: verbose request tracing on network transports.
    pub debug: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,

    /// Whether to include timestamps in log output.
    pub with_timestamps: bool,
}

/// Outbound HTTP client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpClientConfig {
    /// Total request timeout in seconds (connect through body read).
    pub timeout_secs: f64,

    /// Idle pooled connections kept per host. Not a cap on open connections.
    pub max_idle_per_host: usize,
}

/// Tool input/output limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Maximum number of characters accepted by `process_text`.
    pub max_text_length: usize,

    /// Maximum number of characters returned in a `fetch_url` preview.
    pub max_url_content: usize,
}

/// Configuration for the `fetch_url` tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Whether the tool accepts requests at all.
    pub enabled: bool,

    /// Allowed domains. `None` allows every host; subdomains of an
    /// allowed entry are accepted.
    pub allowed_domains: Option<Vec<String>>,
}

impl HttpClientConfig {
    /// The timeout as a `Duration`.
    ///
    /// Fails for values a `Duration` cannot hold (negative, NaN or too large).
    pub fn timeout(&self) -> Result<Duration> {
        Duration::try_from_secs_f64(self.timeout_secs).map_err(|_| {
            Error::config(format!("MCP_HTTP_TIMEOUT out of range: {}", self.timeout_secs))
        })
    }
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30.0,
            max_idle_per_host: 100,
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_text_length: 100_000,
            max_url_content: 2000,
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allowed_domains: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "mcp-server".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                debug: false,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                with_timestamps: true,
            },
            transport: TransportConfig::default(),
            http_client: HttpClientConfig::default(),
            limits: LimitsConfig::default(),
            fetch: FetchConfig::default(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is loaded first if present.
    /// Environment variables are expected to be prefixed with `MCP_`.
    /// For example: `MCP_SERVER_NAME`, `MCP_LOG_LEVEL`, `MCP_HTTP_TIMEOUT`.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(name) = std::env::var("MCP_SERVER_NAME") {
            config.server.name = name;
        }
        if let Some(debug) = env_bool("MCP_DEBUG")? {
            config.server.debug = debug;
        }

        if let Ok(level) = std::env::var("MCP_LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Some(with_timestamps) = env_bool("MCP_LOG_TIMESTAMPS")? {
            config.logging.with_timestamps = with_timestamps;
        }

        config.transport = TransportConfig::from_env()?;

        if let Some(timeout) = env_parse::<f64>("MCP_HTTP_TIMEOUT")? {
            config.http_client.timeout_secs = timeout;
        }
        if let Some(max) = env_parse::<usize>("MCP_HTTP_MAX_CONNECTIONS")? {
            config.http_client.max_idle_per_host = max;
        }

        if let Some(max) = env_parse::<usize>("MCP_MAX_TEXT_LENGTH")? {
            config.limits.max_text_length = max;
        }
        if let Some(max) = env_parse::<usize>("MCP_MAX_URL_CONTENT")? {
            config.limits.max_url_content = max;
        }

        if let Some(enabled) = env_bool("MCP_ENABLE_FETCH_TOOL")? {
            config.fetch.enabled = enabled;
        }
        if let Ok(raw) = std::env::var("MCP_ALLOWED_FETCH_DOMAINS") {
            config.fetch.allowed_domains = parse_domain_list(&raw)?;
            info!("Fetch domain allow-list: {:?}", config.fetch.allowed_domains);
        }

        config.validate()?;
        Ok(config)
    }

    /// Check value constraints. Violations are fatal at startup.
    pub fn validate(&self) -> Result<()> {
        if !(self.http_client.timeout_secs.is_finite() && self.http_client.timeout_secs > 0.0) {
            return Err(Error::config("MCP_HTTP_TIMEOUT must be greater than 0"));
        }
        self.http_client.timeout()?;
        if self.http_client.max_idle_per_host < 1 {
            return Err(Error::config("MCP_HTTP_MAX_CONNECTIONS must be at least 1"));
        }
        if self.limits.max_text_length < 1000 {
            return Err(Error::config("MCP_MAX_TEXT_LENGTH must be at least 1000"));
        }
        if self.limits.max_url_content < 100 {
            return Err(Error::config("MCP_MAX_URL_CONTENT must be at least 100"));
        }
        Ok(())
    }
}

/// Parse an optional environment variable into `T`.
fn env_parse<T: FromStr>(key: &str) -> Result<Option<T>> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| Error::config(format!("Invalid value for {}: '{}'", key, raw))),
        Err(_) => Ok(None),
    }
}

/// Parse an optional boolean environment variable.
///
/// Accepts `true/false`, `1/0`, `yes/no` and `on/off` in any case.
fn env_bool(key: &str) -> Result<Option<bool>> {
    match std::env::var(key) {
        Ok(raw) => match raw.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(Some(true)),
            "false" | "0" | "no" | "off" => Ok(Some(false)),
            _ => Err(Error::config(format!("Invalid value for {}: '{}'", key, raw))),
        },
        Err(_) => Ok(None),
    }
}

/// Accepts either a JSON array (`["a.com","b.org"]`) or a comma-separated
/// list. An empty list means "no restriction".
fn parse_domain_list(raw: &str) -> Result<Option<Vec<String>>> {
    let trimmed = raw.trim();
    let domains: Vec<String> = if trimmed.starts_with('[') {
        serde_json::from_str(trimmed).map_err(|e| {
            Error::config(format!("Invalid MCP_ALLOWED_FETCH_DOMAINS: {}", e))
        })?
    } else {
        trimmed.split(',').map(str::to_string).collect()
    };

    let domains: Vec<String> = domains
        .into_iter()
        .map(|d| d.trim().trim_start_matches('.').to_lowercase())
        .filter(|d| !d.is_empty())
        .collect();

    Ok(if domains.is_empty() { None } else { Some(domains) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Mutex to ensure env var tests run serially
    static ENV_TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.server.name, "mcp-server");
        assert_eq!(config.http_client.timeout().unwrap(), Duration::from_secs(30));
        assert_eq!(config.http_client.max_idle_per_host, 100);
        assert_eq!(config.limits.max_text_length, 100_000);
        assert_eq!(config.limits.max_url_content, 2000);
        assert!(config.fetch.enabled);
        assert!(config.fetch.allowed_domains.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_huge_timeout_is_a_config_error() {
        let mut config = Config::default();
        config.http_client.timeout_secs = 1e20;
        assert!(matches!(config.http_client.timeout(), Err(Error::Config(_))));

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("MCP_HTTP_TIMEOUT"));
    }

    #[test]
    fn test_from_env_overrides() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        unsafe {
            std::env::set_var("MCP_SERVER_NAME", "utility-test");
            std::env::set_var("MCP_HTTP_TIMEOUT", "2.5");
            std::env::set_var("MCP_ENABLE_FETCH_TOOL", "False");
            std::env::set_var("MCP_ALLOWED_FETCH_DOMAINS", "example.com, .Docs.rs");
        }
        let config = Config::from_env();
        unsafe {
            std::env::remove_var("MCP_SERVER_NAME");
            std::env::remove_var("MCP_HTTP_TIMEOUT");
            std::env::remove_var("MCP_ENABLE_FETCH_TOOL");
            std::env::remove_var("MCP_ALLOWED_FETCH_DOMAINS");
        }

        let config = config.unwrap();
        assert_eq!(config.server.name, "utility-test");
        assert_eq!(config.http_client.timeout().unwrap(), Duration::from_millis(2500));
        assert!(!config.fetch.enabled);
        assert_eq!(
            config.fetch.allowed_domains,
            Some(vec!["example.com".to_string(), "docs.rs".to_string()])
        );
    }

    #[test]
    fn test_from_env_rejects_invalid_number() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        unsafe {
            std::env::set_var("MCP_MAX_TEXT_LENGTH", "lots");
        }
        let result = Config::from_env();
        unsafe {
            std::env::remove_var("MCP_MAX_TEXT_LENGTH");
        }
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_small_limits() {
        let mut config = Config::default();
        config.limits.max_text_length = 10;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.http_client.timeout_secs = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_domain_list_json_array() {
        let domains = parse_domain_list(r#"["example.com", "api.github.com"]"#).unwrap();
        assert_eq!(
            domains,
            Some(vec!["example.com".to_string(), "api.github.com".to_string()])
        );
    }

    #[test]
    fn test_domain_list_empty_means_unrestricted() {
        assert_eq!(parse_domain_list("  ").unwrap(), None);
        assert_eq!(parse_domain_list("[]").unwrap(), None);
    }
}
