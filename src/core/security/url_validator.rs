use url::Url;

use crate::core::config::FetchConfig;

/// Errors that can occur during URL validation
#[derive(Debug, thiserror::Error)]
pub enum UrlSecurityError {
    #[error("URL must start with http:// or https://")]
    UnsupportedScheme,

    #[error("Invalid URL '{url}': {error}")]
    Malformed { url: String, error: url::ParseError },

    #[error("URL '{url}' has no host")]
    MissingHost { url: String },

    #[error("Domain not allowed: {host}. Allowed: {allowed}")]
    DomainNotAllowed { host: String, allowed: String },
}

/// Validates that a URL is safe to fetch under the configured policy.
///
/// This function performs the following checks:
/// 1. The scheme is `http` or `https`
/// 2. The URL parses and carries a host
/// 3. If an allow-list is configured, the host equals an allowed domain
///    or is a subdomain of one
///
/// # Returns
///
/// * `Ok(Url)` - The parsed URL
/// * `Err(UrlSecurityError)` - If validation fails
///
/// # Examples
///
/// ```rust,ignore
/// let config = Config::from_env()?;
/// let url = validate_url("https://docs.rs/serde", &config.fetch)?;
/// ```
pub fn validate_url(input: &str, config: &FetchConfig) -> Result<Url, UrlSecurityError> {
    let input = input.trim();
    let lowered = input.to_ascii_lowercase();
    if !(lowered.starts_with("http://") || lowered.starts_with("https://")) {
        return Err(UrlSecurityError::UnsupportedScheme);
    }

    let url = Url::parse(input).map_err(|error| UrlSecurityError::Malformed {
        url: input.to_string(),
        error,
    })?;

    let host = url
        .host_str()
        .ok_or_else(|| UrlSecurityError::MissingHost {
            url: input.to_string(),
        })?
        .to_lowercase();

    if let Some(allowed) = &config.allowed_domains {
        if !is_domain_allowed(&host, allowed) {
            return Err(UrlSecurityError::DomainNotAllowed {
                host,
                allowed: allowed.join(", "),
            });
        }
    }

    Ok(url)
}

/// Exact match or subdomain match (`api.example.com` under `example.com`).
fn is_domain_allowed(host: &str, allowed: &[String]) -> bool {
    allowed.iter().any(|domain| {
        let domain = domain.trim_start_matches('.');
        host == domain || host.ends_with(&format!(".{}", domain))
    })
}
