//! Snapshot Loading
//!
//! Builds a [`MemoryGraph`] from JSON snapshot files. A snapshot holds a
//! list of vertices and a list of edges:
//!
//! ```json
//! {
//!   "vertices": [{ "id": "v1", "label": "RelationalTable", "properties": { "guid": "..." } }],
//!   "edges": [{ "label": "TableDataFlow", "source": "v1", "target": "v2" }]
//! }
//! ```
//!
//! Several snapshots can be merged by loading a directory; edges are only
//! resolved after every file has been read, so a snapshot may reference
//! vertices defined in another one.

use anyhow::Context;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

use super::{Edge, MemoryGraph, Vertex};

/// Configuration for snapshot loading
#[derive(Debug, Clone)]
pub struct LoadConfig {
    /// Skip snapshot files matching these path prefixes
    pub skip_prefixes: Vec<String>,
    /// Only load snapshot files matching these path prefixes
    pub include_prefixes: Vec<String>,
    /// Fail on edges whose endpoints are unknown instead of dropping them
    pub strict_edges: bool,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            skip_prefixes: vec![
                "target/".to_string(),
                ".git/".to_string(),
            ],
            include_prefixes: Vec::new(),
            strict_edges: false,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Snapshot {
    #[serde(default)]
    vertices: Vec<Vertex>,
    #[serde(default)]
    edges: Vec<Edge>,
}

/// Load a single snapshot file
pub fn load_from_file(path: &Path, config: &LoadConfig) -> anyhow::Result<MemoryGraph> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot {}", path.display()))?;

    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());

    let snapshot = parse_snapshot(&content, path)?;
    let mut pending_edges = Vec::with_capacity(snapshot.edges.len());
    let mut graph = MemoryGraph::new();

    absorb(&mut graph, snapshot, &mut pending_edges);
    link(&mut graph, pending_edges, config)?;

    graph.bundle_hash = format!("{:x}", hasher.finalize());
    Ok(graph)
}

/// Load and merge every `*.json` snapshot below a directory
pub fn load_from_directory(snapshot_dir: &Path, config: &LoadConfig) -> anyhow::Result<MemoryGraph> {
    let mut files: Vec<_> = WalkDir::new(snapshot_dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .filter(|e| e.path().extension().map(|ext| ext == "json").unwrap_or(false))
        .map(|e| e.into_path())
        .collect();
    // Stable order keeps the bundle hash deterministic
    files.sort();

    let mut graph = MemoryGraph::new();
    let mut hasher = Sha256::new();
    let mut pending_edges = Vec::new();

    for path in files {
        let relative_path = path.strip_prefix(snapshot_dir)?.to_path_buf();
        let relative_str = relative_path.to_string_lossy();

        if !config.include_prefixes.is_empty()
            && !config.include_prefixes.iter().any(|p| relative_str.starts_with(p))
        {
            continue;
        }
        if config.skip_prefixes.iter().any(|p| relative_str.starts_with(p)) {
            continue;
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
        hasher.update(content.as_bytes());

        let snapshot = parse_snapshot(&content, &path)?;
        debug!(
            file = %relative_str,
            vertices = snapshot.vertices.len(),
            edges = snapshot.edges.len(),
            "loaded snapshot"
        );
        absorb(&mut graph, snapshot, &mut pending_edges);
    }

    link(&mut graph, pending_edges, config)?;

    graph.bundle_hash = format!("{:x}", hasher.finalize());
    Ok(graph)
}

fn parse_snapshot(content: &str, path: &Path) -> anyhow::Result<Snapshot> {
    serde_json::from_str(content)
        .map_err(|e| anyhow::anyhow!("Failed to parse snapshot {}: {}", path.display(), e))
}

fn absorb(graph: &mut MemoryGraph, snapshot: Snapshot, pending_edges: &mut Vec<Edge>) {
    for vertex in snapshot.vertices {
        graph.add_vertex(vertex);
    }
    pending_edges.extend(snapshot.edges);
}

fn link(graph: &mut MemoryGraph, pending_edges: Vec<Edge>, config: &LoadConfig) -> anyhow::Result<()> {
    for edge in pending_edges {
        let (label, source, target) = (edge.label.clone(), edge.source.clone(), edge.target.clone());
        if let Err(e) = graph.add_edge(edge) {
            if config.strict_edges {
                anyhow::bail!("Edge {} {} -> {} is invalid: {}", label, source, target, e);
            }
            warn!(%label, %source, %target, "dropping edge with unknown endpoint");
        }
    }
    Ok(())
}
