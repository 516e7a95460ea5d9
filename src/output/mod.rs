//! Output module for pipeline artifacts and reports
//!
//! This module handles:
//! - Writing JSON snapshots atomically (temp file + rename)
//! - Reading node/edge snapshots back for incremental runs
//! - Crawl reports and graph statistics

pub mod stats;

pub use stats::{print_statistics, CrawlReport, GraphStatistics};

use crate::model::{Edge, Node};
use crate::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// Serializes `value` as pretty JSON and atomically replaces `path` with it
///
/// The parent directory is created if needed. Readers never observe a partially
/// written file: the JSON goes to a sibling temp file that is renamed into place.
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut json = serde_json::to_vec_pretty(value)?;
    json.push(b'\n');

    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    {
        let mut file = std::fs::File::create(&tmp_path)?;
        file.write_all(&json)?;
        file.sync_all()?;
    }
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Reads and deserializes a JSON file
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read(path)?;
    Ok(serde_json::from_slice(&content)?)
}

/// Writes a node file and an edge file
pub fn write_snapshot(nodes_path: &Path, edges_path: &Path, nodes: &[Node], edges: &[Edge]) -> Result<()> {
    write_json_atomic(nodes_path, nodes)?;
    write_json_atomic(edges_path, edges)?;
    Ok(())
}

/// Reads a node file and an edge file written by [`write_snapshot`]
pub fn read_snapshot(nodes_path: &Path, edges_path: &Path) -> Result<(Vec<Node>, Vec<Edge>)> {
    let nodes = read_json(nodes_path)?;
    let edges = read_json(edges_path)?;
    Ok((nodes, edges))
}
