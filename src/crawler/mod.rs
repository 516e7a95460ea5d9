//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching
//! - The breadth-first frontier and page budget
//! - Overall crawl coordination
//! - The link-map scan

mod coordinator;
mod fetcher;
mod frontier;
mod scanner;

pub use coordinator::{run_crawl, Coordinator, PageSink};
pub use fetcher::{build_http_client, fetch, mime_essence, FetchFailure, FetchOutcome};
pub use frontier::{Frontier, PageBudget};
pub use scanner::{run_scan, LinkMap, LinkMapSink, LinkMapStats, LinkPair};
