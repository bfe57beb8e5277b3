//! Server status resource definition.

use chrono::{DateTime, SecondsFormat, Utc};

use super::ResourceDefinition;
use crate::core::config::Config;
use crate::domains::resources::service::{DynamicResourceType, ResourceContent};

/// Live status of the running server (dynamic).
pub struct ServerStatusResource;

impl ResourceDefinition for ServerStatusResource {
    const URI: &'static str = "status://server";
    const NAME: &'static str = "Server Status";
    const DESCRIPTION: &'static str = "Status, configuration and available tools of this MCP server";
    const MIME_TYPE: &'static str = "text/plain";

    fn content() -> ResourceContent {
        ResourceContent::Dynamic(DynamicResourceType::ServerStatus)
    }
}

impl ServerStatusResource {
    /// Render the status report as of `now`.
    pub fn render(config: &Config, tools: &[&str], now: DateTime<Utc>) -> String {
        let allowed = match &config.fetch.allowed_domains {
            Some(domains) if !domains.is_empty() => domains.join(", "),
            _ => "All".to_string(),
        };

        format!(
            "MCP Server Status\n\
             =================\n\
             Name: {name}\n\
             Version: {version}\n\
             Status: Running\n\
             Debug: {debug}\n\
             Timestamp: {timestamp}\n\
             \n\
             Configuration:\n\
             - HTTP Timeout: {timeout}s\n\
             - Max Text Length: {max_text}\n\
             - Max URL Content: {max_url}\n\
             - Fetch Enabled: {fetch}\n\
             - Allowed Domains: {allowed}\n\
             \n\
             Available Tools: {tools}\n",
            name = config.server.name,
            version = config.server.version,
            debug = config.server.debug,
            timestamp = now.to_rfc3339_opts(SecondsFormat::Secs, true),
            timeout = config.http_client.timeout_secs,
            max_text = config.limits.max_text_length,
            max_url = config.limits.max_url_content,
            fetch = config.fetch.enabled,
            allowed = allowed,
            tools = tools.join(", "),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_server_status_metadata() {
        assert_eq!(ServerStatusResource::URI, "status://server");
        assert_eq!(ServerStatusResource::MIME_TYPE, "text/plain");
    }

    #[test]
    fn test_render_reports_configuration() {
        let mut config = Config::default();
        config.server.name = "utility".to_string();
        config.fetch.allowed_domains = Some(vec!["example.com".to_string(), "docs.rs".to_string()]);

        let now = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let text = ServerStatusResource::render(&config, &["calculate", "fetch_url"], now);

        assert!(text.starts_with("MCP Server Status\n"));
        assert!(text.contains("Name: utility\n"));
        assert!(text.contains("Status: Running\n"));
        assert!(text.contains("Timestamp: 2024-01-02T03:04:05Z\n"));
        assert!(text.contains("- HTTP Timeout: 30s\n"));
        assert!(text.contains("- Allowed Domains: example.com, docs.rs\n"));
        assert!(text.contains("Available Tools: calculate, fetch_url\n"));
    }

    #[test]
    fn test_render_without_allow_list() {
        let text = ServerStatusResource::render(&Config::default(), &[], Utc::now());
        assert!(text.contains("- Allowed Domains: All\n"));
        assert!(text.contains("- Fetch Enabled: true\n"));
    }
}
