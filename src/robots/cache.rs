//! Per-host robots.txt cache
//!
//! Rules are fetched lazily the first time a host is checked and kept for the
//! rest of the run.

use crate::robots::{fetch_robots, ParsedRobots};
use reqwest::Client;
use std::collections::HashMap;
use url::Url;

/// Lazily populated robots.txt rules, keyed by origin
#[derive(Debug)]
pub struct RobotsCache {
    agent_token: String,
    entries: HashMap<String, ParsedRobots>,
}

impl RobotsCache {
    /// Creates an empty cache matching rules against `agent_token`
    pub fn new(agent_token: impl Into<String>) -> Self {
        Self {
            agent_token: agent_token.into(),
            entries: HashMap::new(),
        }
    }

    pub fn agent_token(&self) -> &str {
        &self.agent_token
    }

    /// Number of hosts whose rules have been fetched
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Seeds the rules for the origin of `url` without fetching
    pub fn insert(&mut self, url: &Url, rules: ParsedRobots) {
        self.entries.insert(origin_key(url), rules);
    }

    /// Checks `url` against its host's robots.txt, fetching it on first use
    ///
    /// A robots.txt that cannot be fetched allows everything.
    pub async fn is_allowed(&mut self, client: &Client, url: &Url) -> bool {
        let key = origin_key(url);
        if !self.entries.contains_key(&key) {
            let rules = fetch_robots(client, url).await;
            self.entries.insert(key.clone(), rules);
        }

        self.entries
            .get(&key)
            .map_or(true, |rules| rules.is_allowed(url.as_str(), &self.agent_token))
    }
}

fn origin_key(url: &Url) -> String {
    url.origin().ascii_serialization()
}
