//! Sitegraph: a polite site crawler and link-graph builder
//!
//! This crate crawls a bounded set of hosts breadth-first, persists every fetched
//! document alongside an append-only metadata log, extracts clean text and links from
//! HTML, PDF and DOCX artifacts, and derives a directed link graph annotated with
//! degree, PageRank, betweenness and depth-from-root metrics.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod graph;
pub mod model;
pub mod output;
pub mod robots;
pub mod storage;
pub mod url;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Sitegraph operations
#[derive(Debug, Error)]
pub enum SitegraphError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Metadata log not found at {}; run a crawl first", path.display())]
    MissingMetadata { path: PathBuf },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid domain pattern: {0}")]
    InvalidPattern(String),
}

/// URL-specific errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UrlError {
    #[error("Empty URL")]
    Empty,

    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Missing host in URL: {0}")]
    MissingHost(String),
}

/// Result type alias for Sitegraph operations
pub type Result<T> = std::result::Result<T, SitegraphError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use model::{Edge, Node, NodeMetrics};
pub use url::{canonicalize, CanonicalUrl, UrlPolicy};
