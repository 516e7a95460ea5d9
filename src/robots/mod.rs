//! Robots.txt handling module
//!
//! Fetches robots.txt once per host and answers allow/deny questions for the
//! crawler's agent token. Any failure to obtain robots.txt means "allow all".

mod cache;
mod parser;

pub use cache::RobotsCache;
pub use parser::ParsedRobots;

use reqwest::Client;
use url::Url;

/// Fetches and parses robots.txt for the origin of `url`
///
/// Never fails: a network error or non-2xx status is logged and yields
/// [`ParsedRobots::allow_all`].
pub async fn fetch_robots(client: &Client, url: &Url) -> ParsedRobots {
    let robots_url = match url.join("/robots.txt") {
        Ok(u) => u,
        Err(e) => {
            tracing::debug!("Cannot build robots.txt URL for {}: {}", url, e);
            return ParsedRobots::allow_all();
        }
    };

    let response = match client.get(robots_url.clone()).send().await {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!("Failed to fetch {}: {}; allowing all", robots_url, e);
            return ParsedRobots::allow_all();
        }
    };

    if !response.status().is_success() {
        tracing::info!(
            "{} returned {}; allowing all",
            robots_url,
            response.status()
        );
        return ParsedRobots::allow_all();
    }

    match response.text().await {
        Ok(body) => {
            tracing::debug!("Loaded {} ({} bytes)", robots_url, body.len());
            ParsedRobots::from_content(&body)
        }
        Err(e) => {
            tracing::warn!("Failed to read {}: {}; allowing all", robots_url, e);
            ParsedRobots::allow_all()
        }
    }
}
