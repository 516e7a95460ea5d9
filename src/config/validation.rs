use crate::config::types::{Config, CrawlConfig, UserAgentConfig};
use crate::url::canonicalize;
use crate::ConfigError;
use url::Url;

/// Replaces every invalid configuration value with its default
///
/// Each replacement is logged at warn level. The result always passes [`validate`].
pub fn sanitize(mut config: Config) -> Config {
    let defaults = Config::default();

    if let Err(e) = validate_start_url(&config.crawl.start_url) {
        tracing::warn!("{}; using default start URL", e);
        config.crawl.start_url = defaults.crawl.start_url.clone();
    }

    config.crawl.allowed_domains = sanitize_domains(&config.crawl);
    config.crawl.allowed_extensions = config
        .crawl
        .allowed_extensions
        .iter()
        .filter_map(|ext| normalize_extension(ext))
        .collect();

    if config.crawl.request_timeout_secs == 0 {
        tracing::warn!(
            "request-timeout-secs must be >= 1; using {}",
            defaults.crawl.request_timeout_secs
        );
        config.crawl.request_timeout_secs = defaults.crawl.request_timeout_secs;
    }

    if let Err(e) = validate_user_agent_config(&config.user_agent) {
        tracing::warn!("{}; using default user agent", e);
        config.user_agent = defaults.user_agent.clone();
    }

    if let Some(root) = &config.graph.root_url {
        if let Err(e) = validate_start_url(root) {
            tracing::warn!("Invalid root-url: {}; using the start URL", e);
            config.graph.root_url = None;
        }
    }

    config
}

/// Validates the entire configuration, stopping at the first problem
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    match validation_issues(config).into_iter().next() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Collects every problem in the configuration without changing it
///
/// An empty result means [`sanitize`] would leave the config untouched apart from
/// normalizing domain and extension spelling.
pub fn validation_issues(config: &Config) -> Vec<ConfigError> {
    let mut issues = crawl_config_issues(&config.crawl);

    if let Err(e) = validate_user_agent_config(&config.user_agent) {
        issues.push(e);
    }

    if let Some(root) = &config.graph.root_url {
        if let Err(e) = validate_start_url(root) {
            issues.push(e);
        }
    }

    issues
}

fn crawl_config_issues(config: &CrawlConfig) -> Vec<ConfigError> {
    let mut issues = Vec::new();

    if let Err(e) = validate_start_url(&config.start_url) {
        issues.push(e);
    }

    if config.allowed_domains.is_empty() {
        issues.push(ConfigError::Validation(
            "allowed-domains cannot be empty".to_string(),
        ));
    }

    issues.extend(
        config
            .allowed_domains
            .iter()
            .filter_map(|domain| validate_domain_pattern(domain).err()),
    );

    if config.request_timeout_secs == 0 {
        issues.push(ConfigError::Validation(
            "request-timeout-secs must be >= 1".to_string(),
        ));
    }

    issues
}

fn validate_start_url(raw: &str) -> Result<(), ConfigError> {
    let canonical = canonicalize(raw, None)
        .map_err(|e| ConfigError::InvalidUrl(format!("'{}': {}", raw, e)))?;
    let url = canonical
        .parse()
        .map_err(|e| ConfigError::InvalidUrl(format!("'{}': {}", raw, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "'{}' must use http or https",
            raw
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!("'{}' has no host", raw)));
    }

    Ok(())
}

/// Keeps valid domain patterns (lowercased), falling back to the start URL's host
fn sanitize_domains(config: &CrawlConfig) -> Vec<String> {
    let mut domains: Vec<String> = Vec::new();
    for pattern in &config.allowed_domains {
        let pattern = pattern.trim().to_lowercase();
        match validate_domain_pattern(&pattern) {
            Ok(()) => {
                if !domains.contains(&pattern) {
                    domains.push(pattern);
                }
            }
            Err(e) => tracing::warn!("Ignoring allowed domain: {}", e),
        }
    }

    if domains.is_empty() {
        if let Some(host) = canonicalize(&config.start_url, None)
            .ok()
            .and_then(|url| url.host())
        {
            tracing::warn!(
                "No valid allowed-domains configured; restricting crawl to {}",
                host
            );
            domains.push(host);
        }
    }

    domains
}

fn normalize_extension(ext: &str) -> Option<String> {
    let ext = ext.trim().trim_start_matches('.').to_lowercase();
    if ext.is_empty() {
        return None;
    }
    Some(format!(".{}", ext))
}

fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler-name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler-name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    if let Some(contact) = &config.contact_url {
        Url::parse(contact)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact-url: {}", e)))?;
    }

    Ok(())
}

/// Validates a domain pattern (supports `*.` wildcards)
fn validate_domain_pattern(pattern: &str) -> Result<(), ConfigError> {
    if pattern.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain pattern cannot be empty".to_string(),
        ));
    }

    match pattern.strip_prefix("*.") {
        Some(domain) => validate_domain_string(domain),
        None => validate_domain_string(pattern),
    }
}

fn validate_domain_string(domain: &str) -> Result<(), ConfigError> {
    if domain.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain cannot be empty".to_string(),
        ));
    }

    if !domain
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' contains invalid characters",
            domain
        )));
    }

    if domain.starts_with('.')
        || domain.ends_with('.')
        || domain.starts_with('-')
        || domain.ends_with('-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot start or end with '.' or '-'",
            domain
        )));
    }

    if domain.contains("..") {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot contain consecutive dots",
            domain
        )));
    }

    Ok(())
}
