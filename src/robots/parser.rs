//! Robots.txt rule matching
//!
//! Matching is delegated to the `robotstxt` crate, which implements Google's
//! longest-match semantics for `Allow`/`Disallow` groups.

use robotstxt::DefaultMatcher;

/// Robots.txt rules for one host
#[derive(Debug, Clone, Default)]
pub struct ParsedRobots {
    /// Raw robots.txt body; `None` means everything is allowed
    content: Option<String>,
}

impl ParsedRobots {
    /// Creates rules from a raw robots.txt body
    pub fn from_content(content: &str) -> Self {
        Self {
            content: Some(content.to_string()),
        }
    }

    /// Creates permissive rules, used when robots.txt is missing or unreachable
    pub fn allow_all() -> Self {
        Self { content: None }
    }

    pub fn is_allow_all(&self) -> bool {
        self.content.as_deref().map_or(true, |c| c.trim().is_empty())
    }

    /// Checks whether `url` may be fetched by the crawler identified by `agent_token`
    ///
    /// # Arguments
    ///
    /// * `url` - The absolute URL to check
    /// * `agent_token` - The product token matched against `User-agent` lines
    pub fn is_allowed(&self, url: &str, agent_token: &str) -> bool {
        match &self.content {
            Some(content) if !content.trim().is_empty() => {
                let mut matcher = DefaultMatcher::default();
                matcher.one_agent_allowed_by_robots(content, agent_token, url)
            }
            _ => true,
        }
    }
}
