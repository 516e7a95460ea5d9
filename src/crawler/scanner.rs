//! Link-map scan: a crawl that records structure but persists nothing
//!
//! Useful for estimating crawl size before a full run.

use crate::config::Config;
use crate::crawler::coordinator::{Coordinator, PageSink};
use crate::crawler::frontier::PageBudget;
use crate::output::write_json_atomic;
use crate::url::CanonicalUrl;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tokio_util::sync::CancellationToken;

/// Page sink that keeps only visited pages and unique (page, link) pairs
#[derive(Debug, Default)]
pub struct LinkMapSink {
    pages: BTreeSet<CanonicalUrl>,
    edges: BTreeSet<(CanonicalUrl, CanonicalUrl)>,
}

impl PageSink for LinkMapSink {
    fn accept(&mut self, url: &CanonicalUrl, _content_type: &str, _body: &[u8]) -> Result<()> {
        self.pages.insert(url.clone());
        Ok(())
    }

    fn on_links(&mut self, page: &CanonicalUrl, links: &[CanonicalUrl]) {
        for link in links {
            self.edges.insert((page.clone(), link.clone()));
        }
    }
}

impl LinkMapSink {
    /// Builds the report; nodes and edges come out sorted
    ///
    /// `pages_processed` counts every URL requested, failed fetches included,
    /// while `unique_urls` counts the pages that were fetched.
    pub fn into_link_map(self, pages_processed: usize) -> LinkMap {
        LinkMap {
            stats: LinkMapStats {
                pages_processed,
                unique_urls: self.pages.len(),
                unique_edges: self.edges.len(),
            },
            nodes: self.pages.into_iter().collect(),
            edges: self
                .edges
                .into_iter()
                .map(|(source, target)| LinkPair { source, target })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkMapStats {
    pub pages_processed: usize,
    pub unique_urls: usize,
    pub unique_edges: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkPair {
    pub source: CanonicalUrl,
    pub target: CanonicalUrl,
}

/// JSON document written by [`run_scan`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkMap {
    pub stats: LinkMapStats,
    pub nodes: Vec<CanonicalUrl>,
    pub edges: Vec<LinkPair>,
}

/// Scans the site breadth-first under `scan.max-pages` and writes the link map
pub async fn run_scan(config: &Config, cancel: CancellationToken) -> Result<LinkMap> {
    let budget = PageBudget::from_limit(config.scan.max_pages);
    let mut coordinator = Coordinator::new(config, budget, LinkMapSink::default(), cancel)?;

    let report = coordinator.run().await?;
    let requested = report.pages_fetched + report.fetch_failures;
    let link_map = coordinator
        .into_sink()
        .into_link_map(usize::try_from(requested).unwrap_or(usize::MAX));

    let path = &config.output.link_map_path;
    write_json_atomic(path, &link_map)?;
    tracing::info!(
        "Link map written to {} (pages={}, unique_urls={}, unique_edges={}{})",
        path.display(),
        link_map.stats.pages_processed,
        link_map.stats.unique_urls,
        link_map.stats.unique_edges,
        if report.cancelled { ", cancelled" } else { "" }
    );
    Ok(link_map)
}
