use crate::config::types::Config;
use crate::config::validation::{sanitize, validation_issues};
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// Individual invalid values are replaced by their defaults (with a warning);
/// an unreadable or unparseable file is an error.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use sitegraph::config::load_config;
///
/// let config = load_config(Path::new("sitegraph.toml")).unwrap();
/// println!("Start URL: {}", config.crawl.start_url);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses configuration from TOML text
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    Ok(sanitize(config))
}

/// Computes a SHA-256 hash of the configuration file content
///
/// This is logged at startup so a crawl can be matched to the config it ran with.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    Ok(hash_content(&content))
}

fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

/// Parses a configuration file as written, without replacing invalid values
///
/// Returns the raw config, its hash, and every validation problem found. An
/// unreadable or unparseable file is still an error.
pub fn check_config(path: &Path) -> Result<(Config, String, Vec<ConfigError>), ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    let issues = validation_issues(&config);
    Ok((config, hash_content(&content), issues))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

/// Loads a configuration, falling back to defaults instead of failing
///
/// A missing file is logged at warn level, a malformed one at error level; in both
/// cases the pipeline proceeds with [`Config::default`].
pub fn load_config_or_default(path: &Path) -> Config {
    if !path.exists() {
        tracing::warn!("Config file {} not found, using defaults", path.display());
        return Config::default();
    }

    match load_config_with_hash(path) {
        Ok((config, hash)) => {
            tracing::info!(
                "Loaded configuration from {} (hash: {})",
                path.display(),
                hash
            );
            config
        }
        Err(e) => {
            tracing::error!(
                "Failed to load config {}: {}; using defaults",
                path.display(),
                e
            );
            Config::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DuplicateRecordPolicy, SelfLinkPolicy};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let config_content = r#"
[crawl]
start-url = "https://example.edu"
allowed-domains = ["example.edu", "www.example.edu"]
max-pages = 25
request-delay-ms = 100
request-timeout-secs = 5
allowed-extensions = [".html", "PDF"]

[user-agent]
crawler-name = "TestCrawler"
crawler-version = "1.0"

[output]
raw-dir = "/tmp/raw"
processed-dir = "/tmp/processed"

[extract]
snippet-chars = 120
self-links = "keep"
duplicate-records = "keep-first"

[graph]
root-url = "https://example.edu/"
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.crawl.start_url, "https://example.edu");
        assert_eq!(config.crawl.allowed_domains.len(), 2);
        assert_eq!(config.crawl.max_pages, 25);
        assert_eq!(config.crawl.allowed_extensions, vec![".html", ".pdf"]);
        assert_eq!(config.user_agent.crawler_name, "TestCrawler");
        assert_eq!(config.extract.snippet_chars, 120);
        assert_eq!(config.extract.self_links, SelfLinkPolicy::Keep);
        assert_eq!(
            config.extract.duplicate_records,
            DuplicateRecordPolicy::KeepFirst
        );
        assert_eq!(
            config.output.metadata_path(),
            std::path::PathBuf::from("/tmp/raw/metadata.tsv")
        );
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let file = create_temp_config("");
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.crawl.max_pages, -1);
        assert_eq!(config.crawl.request_delay_ms, 250);
        assert_eq!(config.extract.snippet_chars, 600);
        assert_eq!(config.extract.self_links, SelfLinkPolicy::Drop);
        assert_eq!(config.root_url(), "https://www.bgsu.edu");
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/sitegraph.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_malformed_config_falls_back_to_defaults() {
        let file = create_temp_config("[crawl]\nmax-pages = \"many\"\n");
        let config = load_config_or_default(file.path());
        assert_eq!(config.crawl.max_pages, -1);
        assert_eq!(config.crawl.start_url, "https://www.bgsu.edu");
    }

    #[test]
    fn test_missing_config_falls_back_to_defaults() {
        let config = load_config_or_default(Path::new("/nonexistent/sitegraph.toml"));
        assert_eq!(config.crawl.request_timeout_secs, 20);
    }

    #[test]
    fn test_check_config_reports_values_that_loading_would_replace() {
        let file = create_temp_config(
            "[crawl]\nstart-url = \"ftp://files.example.edu\"\nrequest-timeout-secs = 0\n",
        );

        let (config, hash, issues) = check_config(file.path()).unwrap();
        assert_eq!(config.crawl.start_url, "ftp://files.example.edu");
        assert_eq!(hash, compute_config_hash(file.path()).unwrap());
        assert_eq!(issues.len(), 2);
        assert!(matches!(issues[0], ConfigError::InvalidUrl(_)));
        assert!(matches!(issues[1], ConfigError::Validation(_)));

        let loaded = load_config(file.path()).unwrap();
        assert_eq!(loaded.crawl.start_url, "https://www.bgsu.edu");
    }

    #[test]
    fn test_check_config_accepts_valid_file() {
        let file = create_temp_config("[crawl]\nstart-url = \"https://example.edu\"\n");
        let (_, _, issues) = check_config(file.path()).unwrap();
        assert!(issues.is_empty());
    }

    #[test]
    fn test_compute_config_hash() {
        let file = create_temp_config("test content");

        let hash1 = compute_config_hash(file.path()).unwrap();
        let hash2 = compute_config_hash(file.path()).unwrap();

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_different_content_different_hash() {
        let file1 = create_temp_config("content 1");
        let file2 = create_temp_config("content 2");

        let hash1 = compute_config_hash(file1.path()).unwrap();
        let hash2 = compute_config_hash(file2.path()).unwrap();

        assert_ne!(hash1, hash2);
    }
}
