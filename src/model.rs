//! Records shared between the pipeline stages
//!
//! A [`CrawlRecord`] is produced by the crawl, a [`Node`] and its [`Edge`]s by
//! extraction, and [`NodeMetrics`] are attached by the graph builder.

use crate::url::CanonicalUrl;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Maximum number of characters kept from an anchor's text
pub const MAX_ANCHOR_CHARS: usize = 200;

/// `doc_type` of nodes synthesized for never-fetched link targets
pub const EXTERNAL_DOC_TYPE: &str = "external";

/// One successfully fetched URL, as written to the metadata log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlRecord {
    pub url: CanonicalUrl,
    pub stored_path: PathBuf,
    pub content_type: String,
}

/// A document in the link graph, keyed by canonical URL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub url: CanonicalUrl,
    pub stored_path: String,
    pub content_type: String,
    pub doc_type: String,
    pub title: String,
    pub word_count: usize,
    pub clean_text: String,
    pub snippet: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<NodeMetrics>,
}

impl Node {
    /// Creates a content-free node for a link target that was never crawled
    pub fn stub(url: CanonicalUrl) -> Self {
        Self {
            url,
            stored_path: String::new(),
            content_type: String::new(),
            doc_type: EXTERNAL_DOC_TYPE.to_string(),
            title: String::new(),
            word_count: 0,
            clean_text: String::new(),
            snippet: String::new(),
            metrics: None,
        }
    }

    pub fn is_stub(&self) -> bool {
        self.doc_type == EXTERNAL_DOC_TYPE && self.stored_path.is_empty()
    }
}

/// Graph metrics attached to a node by the graph builder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeMetrics {
    pub in_degree: usize,
    pub out_degree: usize,
    pub pagerank: f64,
    pub betweenness: f64,
    /// BFS hops from the root URL; `None` when unreachable or the root is absent
    pub depth_from_root: Option<u32>,
}

/// A hyperlink between two nodes; parallel edges are allowed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub source: CanonicalUrl,
    pub target: CanonicalUrl,
    pub anchor_text: String,
}

impl Edge {
    pub fn is_self_link(&self) -> bool {
        self.source == self.target
    }
}

/// Truncates anchor text to [`MAX_ANCHOR_CHARS`] characters
pub fn truncate_anchor(text: &str) -> String {
    text.chars().take(MAX_ANCHOR_CHARS).collect()
}
