//! Configuration module for Sitegraph
//!
//! This module handles loading, parsing, and sanitizing TOML configuration files.
//! Every key is optional, and invalid values fall back to documented defaults so a
//! bad config never stops a run.
//!
//! # Example
//!
//! ```no_run
//! use sitegraph::config::load_config_or_default;
//! use std::path::Path;
//!
//! let config = load_config_or_default(Path::new("sitegraph.toml"));
//! println!("Crawling from: {}", config.crawl.start_url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlConfig, DuplicateRecordPolicy, ExtractConfig, GraphConfig, OutputConfig,
    ScanConfig, SelfLinkPolicy, UserAgentConfig, DEFAULT_ALLOWED_EXTENSIONS,
};

// Re-export parser functions
pub use parser::{
    check_config, compute_config_hash, load_config, load_config_or_default, load_config_with_hash,
    parse_config,
};
pub use validation::{sanitize, validate, validation_issues};
