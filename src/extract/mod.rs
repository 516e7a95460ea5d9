//! Content extraction module
//!
//! Converts stored artifacts into [`Node`]s (clean text, title, word count,
//! snippet) and [`Edge`]s (outbound links of HTML pages), merging the result into
//! the existing `clean_nodes.json` / `clean_edges.json` snapshot.
//!
//! The merge is keyed by URL: processing a record replaces that URL's node and
//! every edge whose source is that URL. Nodes for URLs absent from the metadata
//! log are left untouched, and output ordering is fully determined by the URLs, so
//! running twice on unchanged input produces byte-identical files.

mod docx;
mod html;
mod pdf;

pub use docx::extract_docx_text;
pub use html::{extract_html, outbound_links, ExtractedLink, HtmlDocument};
pub use pdf::extract_pdf_text;

use crate::config::{Config, DuplicateRecordPolicy, ExtractConfig, OutputConfig, SelfLinkPolicy};
use crate::model::{CrawlRecord, Edge, Node};
use crate::output::{read_snapshot, write_snapshot};
use crate::storage::{is_html_content_type, read_metadata};
use crate::url::{CanonicalUrl, UrlPolicy};
use crate::{Result, SitegraphError};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

const HTML_EXTENSIONS: &[&str] = &["html", "htm", "php", "asp", "aspx", "jsp"];
const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// How a stored artifact is turned into text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Html,
    Pdf,
    Docx,
    Unsupported,
}

impl DocumentKind {
    /// Classifies an artifact from its content type and stored path
    ///
    /// HTML wins on either a `text/html` content type or an HTML-like file
    /// extension. PDF and DOCX are recognized by extension or content type.
    pub fn classify(content_type: &str, stored_path: &Path) -> Self {
        let content_type = content_type.to_ascii_lowercase();
        let extension = file_extension(stored_path);
        let extension = extension.as_deref().unwrap_or("");

        if is_html_content_type(&content_type) || HTML_EXTENSIONS.contains(&extension) {
            Self::Html
        } else if extension == "pdf" || content_type == "application/pdf" {
            Self::Pdf
        } else if extension == "docx" || content_type == DOCX_CONTENT_TYPE {
            Self::Docx
        } else {
            Self::Unsupported
        }
    }
}

/// Counters from one extraction run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionSummary {
    pub records_read: usize,
    pub records_processed: usize,
    pub duplicate_records: usize,
    pub off_domain_edges_dropped: usize,
    pub self_links_dropped: usize,
    pub total_nodes: usize,
    pub total_edges: usize,
}

/// The outcome of processing one crawl record
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedRecord {
    pub node: Node,
    pub edges: Vec<Edge>,
    pub off_domain_dropped: usize,
    pub self_links_dropped: usize,
}

/// Incremental, checkpointed extractor over the crawl metadata log
#[derive(Debug)]
pub struct ContentExtractor {
    policy: UrlPolicy,
    settings: ExtractConfig,
    output: OutputConfig,
    nodes: BTreeMap<CanonicalUrl, Node>,
    edges: BTreeMap<CanonicalUrl, Vec<Edge>>,
}

impl ContentExtractor {
    pub fn new(config: &Config) -> Self {
        Self {
            policy: UrlPolicy::from_config(&config.crawl),
            settings: config.extract.clone(),
            output: config.output.clone(),
            nodes: BTreeMap::new(),
            edges: BTreeMap::new(),
        }
    }

    /// Runs extraction over every record in the metadata log
    ///
    /// # Returns
    ///
    /// * `Ok(ExtractionSummary)` - The snapshot was written
    /// * `Err(SitegraphError::MissingMetadata)` - No metadata log exists; nothing is written
    pub fn run(&mut self) -> Result<ExtractionSummary> {
        let metadata_path = self.output.metadata_path();
        if !metadata_path.exists() {
            return Err(SitegraphError::MissingMetadata {
                path: metadata_path,
            });
        }

        let records = read_metadata(&metadata_path)?;
        if records.is_empty() {
            tracing::warn!("No records in {}", metadata_path.display());
        }

        self.load_existing();

        let records_read = records.len();
        let records = select_records(records, self.settings.duplicate_records);
        let mut summary = ExtractionSummary {
            records_read,
            duplicate_records: records_read - records.len(),
            ..Default::default()
        };

        let total = records.len();
        tracing::info!("Extracting {} records", total);

        for (idx, record) in records.iter().enumerate() {
            let processed = self.process_record(record);
            summary.off_domain_edges_dropped += processed.off_domain_dropped;
            summary.self_links_dropped += processed.self_links_dropped;
            summary.records_processed += 1;

            self.merge(processed);

            let done = idx + 1;
            let interval = self.settings.checkpoint_interval;
            if interval > 0 && done % interval == 0 && done < total {
                tracing::info!("Processing [{}/{}]: {}", done, total, record.url);
                self.write_outputs()?;
                tracing::info!(
                    "Checkpoint: {} nodes / {} edges written",
                    self.nodes.len(),
                    self.edge_count()
                );
            }
        }

        self.write_outputs()?;
        summary.total_nodes = self.nodes.len();
        summary.total_edges = self.edge_count();

        tracing::info!(
            "Wrote {} nodes and {} edges to {} / {}",
            summary.total_nodes,
            summary.total_edges,
            self.output.clean_nodes_path().display(),
            self.output.clean_edges_path().display()
        );
        if summary.duplicate_records > 0 {
            tracing::info!(
                "Ignored {} duplicate metadata record(s)",
                summary.duplicate_records
            );
        }

        Ok(summary)
    }

    /// Converts one crawl record into a node and its retained edges
    pub fn process_record(&self, record: &CrawlRecord) -> ProcessedRecord {
        let kind = DocumentKind::classify(&record.content_type, &record.stored_path);

        let mut node = Node {
            url: record.url.clone(),
            stored_path: record.stored_path.to_string_lossy().into_owned(),
            content_type: record.content_type.clone(),
            doc_type: infer_doc_type(&record.stored_path, &record.content_type),
            title: String::new(),
            word_count: 0,
            clean_text: String::new(),
            snippet: String::new(),
            metrics: None,
        };

        let mut edges = Vec::new();
        let mut off_domain_dropped = 0;
        let mut self_links_dropped = 0;

        let text = match kind {
            DocumentKind::Html => {
                let document = self.read_html(record);
                node.title = document.title;
                for link in document.links {
                    let edge = Edge {
                        source: record.url.clone(),
                        target: link.target,
                        anchor_text: link.anchor_text,
                    };
                    if !self.is_allowed_target(&edge.target) {
                        off_domain_dropped += 1;
                        continue;
                    }
                    if edge.is_self_link() && self.settings.self_links == SelfLinkPolicy::Drop {
                        self_links_dropped += 1;
                        continue;
                    }
                    edges.push(edge);
                }
                document.text
            }
            DocumentKind::Pdf => extract_pdf_text(&record.stored_path),
            DocumentKind::Docx => extract_docx_text(&record.stored_path),
            DocumentKind::Unsupported => {
                tracing::debug!("Skipping unsupported asset {}", record.stored_path.display());
                String::new()
            }
        };

        if kind != DocumentKind::Html {
            node.title = record
                .stored_path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
        }

        node.word_count = text.split_whitespace().count();
        node.snippet = text.chars().take(self.settings.snippet_chars).collect();
        node.clean_text = text;

        ProcessedRecord {
            node,
            edges,
            off_domain_dropped,
            self_links_dropped,
        }
    }

    fn read_html(&self, record: &CrawlRecord) -> HtmlDocument {
        let bytes = match std::fs::read(&record.stored_path) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(
                    "HTML file {} unreadable during extraction: {}",
                    record.stored_path.display(),
                    e
                );
                return HtmlDocument::default();
            }
        };

        match record.url.parse() {
            Ok(page_url) => extract_html(&String::from_utf8_lossy(&bytes), &page_url),
            Err(e) => {
                tracing::warn!("Cannot resolve links on {}: {}", record.url, e);
                HtmlDocument::default()
            }
        }
    }

    fn is_allowed_target(&self, target: &CanonicalUrl) -> bool {
        target
            .host()
            .is_some_and(|host| self.policy.is_allowed_host(&host))
    }

    fn merge(&mut self, processed: ProcessedRecord) {
        let url = processed.node.url.clone();
        self.nodes.insert(url.clone(), processed.node);
        if processed.edges.is_empty() {
            self.edges.remove(&url);
        } else {
            self.edges.insert(url, processed.edges);
        }
    }

    /// Loads the previous snapshot; an unreadable one is logged and ignored
    fn load_existing(&mut self) {
        let nodes_path = self.output.clean_nodes_path();
        let edges_path = self.output.clean_edges_path();
        if !nodes_path.exists() || !edges_path.exists() {
            return;
        }

        match read_snapshot(&nodes_path, &edges_path) {
            Ok((nodes, edges)) => {
                for node in nodes {
                    self.nodes.insert(node.url.clone(), node);
                }
                for edge in edges {
                    self.edges.entry(edge.source.clone()).or_default().push(edge);
                }
                tracing::info!(
                    "Loaded {} existing cleaned nodes and {} edges",
                    self.nodes.len(),
                    self.edge_count()
                );
            }
            Err(e) => tracing::warn!("Failed to load existing cleaned snapshot: {}", e),
        }
    }

    fn write_outputs(&self) -> Result<()> {
        let nodes: Vec<Node> = self.nodes.values().cloned().collect();
        let edges: Vec<Edge> = self.edges.values().flatten().cloned().collect();
        write_snapshot(
            &self.output.clean_nodes_path(),
            &self.output.clean_edges_path(),
            &nodes,
            &edges,
        )
    }

    fn edge_count(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }
}

/// Applies the duplicate-record policy, preserving log order of the survivors
pub fn select_records(records: Vec<CrawlRecord>, policy: DuplicateRecordPolicy) -> Vec<CrawlRecord> {
    let mut winner: HashMap<CanonicalUrl, usize> = HashMap::new();
    for (idx, record) in records.iter().enumerate() {
        match policy {
            DuplicateRecordPolicy::LastWriteWins => {
                winner.insert(record.url.clone(), idx);
            }
            DuplicateRecordPolicy::KeepFirst => {
                winner.entry(record.url.clone()).or_insert(idx);
            }
        }
    }

    records
        .into_iter()
        .enumerate()
        .filter(|(idx, record)| winner.get(&record.url) == Some(idx))
        .map(|(_, record)| record)
        .collect()
}

/// `doc_type` from the stored file's extension, else the MIME subtype, else `unknown`
pub fn infer_doc_type(stored_path: &Path, content_type: &str) -> String {
    if let Some(extension) = file_extension(stored_path) {
        return extension;
    }
    match content_type.trim().rsplit('/').next() {
        Some(subtype) if !content_type.trim().is_empty() => subtype.to_ascii_lowercase(),
        _ => "unknown".to_string(),
    }
}

fn file_extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
}

/// Joins all whitespace-separated tokens with single spaces
pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
