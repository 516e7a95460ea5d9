//! Append-only crawl metadata log
//!
//! One tab-separated line per successful fetch under the header
//! `url\tpath\tcontent_type`. The log is never rewritten; readers tolerate a
//! truncated or hand-edited file by skipping lines that do not have three columns.

use crate::model::CrawlRecord;
use crate::storage::{StorageError, StorageResult};
use crate::url::canonicalize;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

pub const METADATA_HEADER: &str = "url\tpath\tcontent_type";

/// Writer half of the metadata log
#[derive(Debug)]
pub struct MetadataLog {
    path: PathBuf,
    file: File,
}

impl MetadataLog {
    /// Opens the log for appending, writing the header if the file is new or empty
    pub fn open(path: &Path) -> StorageResult<Self> {
        let log_err = |source| StorageError::Log {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(log_err)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(log_err)?;

        if file.metadata().map_err(log_err)?.len() == 0 {
            file.write_all(format!("{}\n", METADATA_HEADER).as_bytes())
                .and_then(|_| file.flush())
                .map_err(log_err)?;
        }

        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one record as a single write and flushes it
    pub fn append(&mut self, record: &CrawlRecord) -> StorageResult<()> {
        let line = format!(
            "{}\t{}\t{}\n",
            sanitize_field(record.url.as_str()),
            sanitize_field(&record.stored_path.to_string_lossy()),
            sanitize_field(&record.content_type)
        );

        self.file
            .write_all(line.as_bytes())
            .and_then(|_| self.file.flush())
            .map_err(|source| StorageError::Log {
                path: self.path.clone(),
                source,
            })
    }
}

/// Reads every well-formed record from the log, in append order
///
/// The header and lines that are not UTF-8, lack exactly three columns, or carry
/// an unparseable URL are skipped. Duplicate URLs are returned as they appear.
pub fn read_metadata(path: &Path) -> StorageResult<Vec<CrawlRecord>> {
    let file = File::open(path).map_err(|source| StorageError::Log {
        path: path.to_path_buf(),
        source,
    })?;

    let mut records = Vec::new();
    let mut skipped = 0usize;

    for chunk in BufReader::new(file).split(b'\n') {
        let chunk = chunk?;
        let Ok(line) = std::str::from_utf8(&chunk) else {
            skipped += 1;
            continue;
        };
        let line = line.trim_end_matches('\r');
        if line == METADATA_HEADER || line.trim().is_empty() {
            continue;
        }

        match parse_line(line) {
            Some(record) => records.push(record),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        tracing::warn!(
            "Skipped {} malformed line(s) in {}",
            skipped,
            path.display()
        );
    }

    Ok(records)
}

fn parse_line(line: &str) -> Option<CrawlRecord> {
    let parts: Vec<&str> = line.split('\t').collect();
    let [url, stored_path, content_type] = parts.as_slice() else {
        return None;
    };

    let url = canonicalize(url, None).ok()?;
    Some(CrawlRecord {
        url,
        stored_path: PathBuf::from(stored_path.trim()),
        content_type: content_type.trim().to_string(),
    })
}

fn sanitize_field(value: &str) -> String {
    value.replace(['\t', '\n', '\r'], " ")
}
