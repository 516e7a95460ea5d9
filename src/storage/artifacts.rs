//! On-disk store for fetched bodies
//!
//! HTML goes to the text store as UTF-8 (invalid sequences replaced), everything
//! else to the binary store byte for byte. File names are derived from the URL
//! alone, so fetching the same URL again overwrites its artifact.

use crate::storage::{StorageError, StorageResult};
use crate::url::{extract_domain, path_extension, CanonicalUrl};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

const MAX_SAFE_PATH_CHARS: usize = 200;
const HASH_CHARS: usize = 12;

/// Which store an artifact belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Html,
    Binary,
}

impl ArtifactKind {
    fn prefix(&self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Binary => "file",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ArtifactStore {
    html_dir: PathBuf,
    files_dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(html_dir: impl Into<PathBuf>, files_dir: impl Into<PathBuf>) -> Self {
        Self {
            html_dir: html_dir.into(),
            files_dir: files_dir.into(),
        }
    }

    /// Creates both store directories
    pub fn ensure_dirs(&self) -> StorageResult<()> {
        for dir in [&self.html_dir, &self.files_dir] {
            std::fs::create_dir_all(dir).map_err(|source| StorageError::Artifact {
                path: dir.clone(),
                source,
            })?;
        }
        Ok(())
    }

    /// Returns where the artifact for `url` is (or would be) stored
    pub fn artifact_path(&self, url: &CanonicalUrl, kind: ArtifactKind) -> PathBuf {
        let dir = match kind {
            ArtifactKind::Html => &self.html_dir,
            ArtifactKind::Binary => &self.files_dir,
        };
        dir.join(artifact_file_name(url, kind))
    }

    /// Stores an HTML body and returns its path
    pub fn write_html(&self, url: &CanonicalUrl, body: &[u8]) -> StorageResult<PathBuf> {
        let path = self.artifact_path(url, ArtifactKind::Html);
        let text = String::from_utf8_lossy(body);
        write_file(&path, text.as_bytes())?;
        Ok(path)
    }

    /// Stores a non-HTML body and returns its path
    pub fn write_binary(&self, url: &CanonicalUrl, body: &[u8]) -> StorageResult<PathBuf> {
        let path = self.artifact_path(url, ArtifactKind::Binary);
        write_file(&path, body)?;
        Ok(path)
    }
}

fn write_file(path: &Path, contents: &[u8]) -> StorageResult<()> {
    std::fs::write(path, contents).map_err(|source| StorageError::Artifact {
        path: path.to_path_buf(),
        source,
    })
}

/// Builds `<prefix>__<host>_<safe path+query>-<hash><ext>`
///
/// The hash is the first 12 hex characters of SHA-256 over the canonical URL, so
/// URLs that sanitize to the same text still get distinct files.
pub fn artifact_file_name(url: &CanonicalUrl, kind: ArtifactKind) -> String {
    let parsed = url.parse().ok();

    let host = parsed
        .as_ref()
        .and_then(|u| {
            let host = extract_domain(u)?;
            Some(match u.port() {
                Some(port) => format!("{}_{}", host, port),
                None => host,
            })
        })
        .unwrap_or_else(|| "unknown".to_string());

    let extension = match kind {
        ArtifactKind::Html => ".html".to_string(),
        ArtifactKind::Binary => parsed
            .as_ref()
            .and_then(path_extension)
            .unwrap_or_else(|| ".bin".to_string()),
    };

    let mut safe_path = parsed
        .as_ref()
        .map(|u| {
            let mut text = u.path().trim_matches('/').to_string();
            if text.is_empty() {
                text.push_str("index");
            }
            if let Some(query) = u.query().filter(|q| !q.is_empty()) {
                text.push('_');
                text.push_str(query);
            }
            text
        })
        .unwrap_or_else(|| "index".to_string());

    if safe_path.to_lowercase().ends_with(&extension) {
        safe_path.truncate(safe_path.len() - extension.len());
    }

    let safe_path: String = sanitize(&safe_path).chars().take(MAX_SAFE_PATH_CHARS).collect();

    format!(
        "{}__{}_{}-{}{}",
        kind.prefix(),
        sanitize(&host),
        safe_path,
        url_hash(url),
        extension
    )
}

fn url_hash(url: &CanonicalUrl) -> String {
    let digest = Sha256::digest(url.as_str().as_bytes());
    let mut hash = hex::encode(digest);
    hash.truncate(HASH_CHARS);
    hash
}

fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
