//! URL handling module for Sitegraph
//!
//! This module provides URL canonicalization, host extraction, wildcard domain
//! matching and the crawl/download policy filter.

mod domain;
mod matcher;
mod normalize;

use crate::config::CrawlConfig;
use std::collections::HashSet;
use url::Url;

pub use domain::{extract_domain, has_download_marker, path_extension};
pub use matcher::matches_wildcard;
pub use normalize::{canonicalize, CanonicalUrl};

/// Domain and extension policy for the crawl
///
/// Robots.txt is not consulted here; see [`crate::robots::RobotsCache`].
#[derive(Debug, Clone)]
pub struct UrlPolicy {
    allowed_domains: Vec<String>,
    allowed_extensions: HashSet<String>,
}

impl UrlPolicy {
    /// Creates a policy from domain patterns and dotted extensions
    pub fn new<D, E>(allowed_domains: D, allowed_extensions: E) -> Self
    where
        D: IntoIterator,
        D::Item: AsRef<str>,
        E: IntoIterator,
        E::Item: AsRef<str>,
    {
        Self {
            allowed_domains: allowed_domains
                .into_iter()
                .map(|d| d.as_ref().trim().to_lowercase())
                .collect(),
            allowed_extensions: allowed_extensions
                .into_iter()
                .map(|e| e.as_ref().to_lowercase())
                .collect(),
        }
    }

    pub fn from_config(config: &CrawlConfig) -> Self {
        Self::new(&config.allowed_domains, &config.allowed_extensions)
    }

    /// Whether a (lowercase) host is in the allowed-domain set
    pub fn is_allowed_host(&self, host: &str) -> bool {
        self.allowed_domains
            .iter()
            .any(|pattern| matches_wildcard(pattern, host))
    }

    /// Whether the URL's host is in the allowed-domain set
    pub fn is_allowed_domain(&self, url: &Url) -> bool {
        extract_domain(url).is_some_and(|host| self.is_allowed_host(&host))
    }

    /// Scheme and host checks for fetch eligibility
    ///
    /// The robots check completes fetch eligibility and needs network access, so
    /// callers combine this with [`crate::robots::RobotsCache::is_allowed`].
    pub fn is_crawlable(&self, url: &Url) -> bool {
        matches!(url.scheme(), "http" | "https") && self.is_allowed_domain(url)
    }

    /// Whether a link target should be queued as a download
    ///
    /// The host must be allowed, and the URL must have an allow-listed extension,
    /// carry a download marker in its query, or have no extension at all.
    pub fn is_download_eligible(&self, url: &Url) -> bool {
        if !self.is_allowed_domain(url) {
            return false;
        }

        match path_extension(url) {
            None => true,
            Some(ext) => self.allowed_extensions.contains(&ext) || has_download_marker(url),
        }
    }
}
