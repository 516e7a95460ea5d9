//! Storage module for persisting crawl data
//!
//! This module owns everything the crawl writes to disk:
//! - The artifact store holding fetched HTML and binary bodies
//! - The append-only metadata log recording each successful fetch
//! - The [`Persister`] page sink tying the two together

mod artifacts;
mod metadata;

pub use artifacts::{artifact_file_name, ArtifactKind, ArtifactStore};
pub use metadata::{read_metadata, MetadataLog, METADATA_HEADER};

use crate::config::OutputConfig;
use crate::model::CrawlRecord;
use crate::url::CanonicalUrl;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while writing or reading crawl data
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to write artifact {path}: {source}")]
    Artifact {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Metadata log {path}: {source}")]
    Log {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Writes fetched bodies to the artifact store and records them in the log
///
/// Each call to [`Persister::persist`] completes both writes before returning, so
/// the log never references an artifact that was not written.
#[derive(Debug)]
pub struct Persister {
    store: ArtifactStore,
    log: MetadataLog,
}

impl Persister {
    pub fn open(output: &OutputConfig) -> StorageResult<Self> {
        let store = ArtifactStore::new(output.html_dir(), output.files_dir());
        store.ensure_dirs()?;
        let log = MetadataLog::open(&output.metadata_path())?;
        Ok(Self { store, log })
    }

    pub fn persist(
        &mut self,
        url: &CanonicalUrl,
        content_type: &str,
        body: &[u8],
    ) -> StorageResult<CrawlRecord> {
        let stored_path = if is_html_content_type(content_type) {
            self.store.write_html(url, body)?
        } else {
            self.store.write_binary(url, body)?
        };

        let record = CrawlRecord {
            url: url.clone(),
            stored_path,
            content_type: content_type.to_string(),
        };
        self.log.append(&record)?;

        tracing::debug!(
            "Stored {} ({}, {} bytes) at {}",
            url,
            content_type,
            body.len(),
            record.stored_path.display()
        );
        Ok(record)
    }
}

/// Whether a MIME essence denotes an HTML page
pub fn is_html_content_type(content_type: &str) -> bool {
    content_type.to_ascii_lowercase().contains("text/html")
}
