//! Graph Access Port
//!
//! The lineage engine never talks to a graph database directly. It consumes
//! the [`GraphAccess`] capability: vertex lookup by entity guid, adjacent
//! edge retrieval filtered by label and direction, and property retrieval.
//! Everything here is read-only.
//!
//! [`MemoryGraph`] is a petgraph-backed implementation used by tests and by
//! callers that keep metadata in process. The [`loader`] builds one from JSON
//! snapshot files.

pub mod labels;
pub mod loader;
pub mod memory;

pub use loader::{load_from_directory, load_from_file, LoadConfig};
pub use memory::MemoryGraph;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use tracing::warn;

use crate::error::GraphAccessError;

/// Result type for graph access primitives
pub type AccessResult<T> = std::result::Result<T, GraphAccessError>;

/// Identifier of a vertex inside the graph store (not the business guid)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VertexId(pub String);

impl VertexId {
    pub fn new(id: impl Into<String>) -> Self {
        VertexId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VertexId {
    fn from(id: &str) -> Self {
        VertexId(id.to_string())
    }
}

/// Traversal direction relative to a vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Edges ending at the vertex
    In,
    /// Edges starting at the vertex
    Out,
    Both,
}

/// A vertex as stored: label plus raw property values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub id: VertexId,
    pub label: String,
    #[serde(default)]
    pub properties: serde_json::Map<String, serde_json::Value>,
}

impl Vertex {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: VertexId::new(id),
            label: label.into(),
            properties: serde_json::Map::new(),
        }
    }

    /// Builder-style property setter
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// String value of a property, if present and a string
    pub fn property_str(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(|v| v.as_str())
    }

    pub fn guid(&self) -> Option<&str> {
        self.property_str(labels::PROPERTY_GUID)
    }
}

/// A directed, labelled edge between two stored vertices
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub label: String,
    pub source: VertexId,
    pub target: VertexId,
}

impl Edge {
    pub fn new(label: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            source: VertexId::new(source),
            target: VertexId::new(target),
        }
    }

    /// The endpoint that is not `id` (the source for a self loop)
    pub fn other_end(&self, id: &VertexId) -> &VertexId {
        if &self.source == id {
            &self.target
        } else {
            &self.source
        }
    }
}

/// Raw vertices and edges extracted from the store
#[derive(Debug, Clone, Default)]
pub struct Subgraph {
    pub vertices: HashMap<VertexId, Vertex>,
    pub edges: HashSet<Edge>,
}

impl Subgraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_vertex(&mut self, vertex: Vertex) {
        self.vertices.entry(vertex.id.clone()).or_insert(vertex);
    }

    pub fn add_edge(&mut self, edge: Edge) {
        self.edges.insert(edge);
    }

    /// Absorb another subgraph; vertices already present are kept
    pub fn extend(&mut self, other: Subgraph) {
        for (_, vertex) in other.vertices {
            self.add_vertex(vertex);
        }
        self.edges.extend(other.edges);
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn contains(&self, id: &VertexId) -> bool {
        self.vertices.contains_key(id)
    }
}

/// Read-only capability over a labelled property graph.
///
/// Implementations must give every call a consistent view of the store.
/// Errors are reported, never retried, by the engine.
pub trait GraphAccess {
    /// Vertex carrying the given entity guid
    fn vertex_by_guid(&self, guid: &str) -> AccessResult<Option<Vertex>>;

    /// Vertex by store id
    fn vertex(&self, id: &VertexId) -> AccessResult<Option<Vertex>>;

    /// Edges adjacent to `id` in `direction` whose label is in `labels`.
    /// An empty `labels` slice matches every label.
    fn edges(&self, id: &VertexId, labels: &[&str], direction: Direction) -> AccessResult<Vec<Edge>>;

    /// The vertex, its matching edges, and the vertices at their other ends.
    fn subgraph(&self, id: &VertexId, labels: &[&str], direction: Direction) -> AccessResult<Subgraph> {
        let mut graph = Subgraph::new();
        let Some(start) = self.vertex(id)? else {
            return Err(GraphAccessError::MissingVertex(id.to_string()));
        };
        graph.add_vertex(start);

        for edge in self.edges(id, labels, direction)? {
            let other = edge.other_end(id).clone();
            if !graph.contains(&other) {
                match self.vertex(&other)? {
                    Some(vertex) => graph.add_vertex(vertex),
                    None => {
                        warn!(vertex = %other, edge = %edge.label, "skipping edge to unmaterialized vertex");
                        continue;
                    }
                }
            }
            graph.add_edge(edge);
        }
        Ok(graph)
    }

    /// All vertices for the given ids; ids the store does not know are skipped
    fn vertices_by_ids(&self, ids: &[VertexId]) -> AccessResult<Subgraph> {
        let mut graph = Subgraph::new();
        for id in ids {
            if let Some(vertex) = self.vertex(id)? {
                graph.add_vertex(vertex);
            }
        }
        Ok(graph)
    }

    /// Flattened string properties of a vertex
    fn vertex_properties(&self, vertex: &Vertex) -> AccessResult<BTreeMap<String, String>> {
        Ok(flatten_properties(&vertex.properties))
    }
}

impl<G: GraphAccess + ?Sized> GraphAccess for &G {
    fn vertex_by_guid(&self, guid: &str) -> AccessResult<Option<Vertex>> {
        (**self).vertex_by_guid(guid)
    }

    fn vertex(&self, id: &VertexId) -> AccessResult<Option<Vertex>> {
        (**self).vertex(id)
    }

    fn edges(&self, id: &VertexId, labels: &[&str], direction: Direction) -> AccessResult<Vec<Edge>> {
        (**self).edges(id, labels, direction)
    }

    fn subgraph(&self, id: &VertexId, labels: &[&str], direction: Direction) -> AccessResult<Subgraph> {
        (**self).subgraph(id, labels, direction)
    }

    fn vertices_by_ids(&self, ids: &[VertexId]) -> AccessResult<Subgraph> {
        (**self).vertices_by_ids(ids)
    }

    fn vertex_properties(&self, vertex: &Vertex) -> AccessResult<BTreeMap<String, String>> {
        (**self).vertex_properties(vertex)
    }
}

/// Flatten raw property values into string pairs.
///
/// Nested objects expand into `parent.child` keys and arrays into
/// `parent.0`, `parent.1`, ... Null values are dropped.
pub fn flatten_properties(
    properties: &serde_json::Map<String, serde_json::Value>,
) -> BTreeMap<String, String> {
    let mut flat = BTreeMap::new();
    for (key, value) in properties {
        flatten_value(key, value, &mut flat);
    }
    flat
}

fn flatten_value(key: &str, value: &serde_json::Value, flat: &mut BTreeMap<String, String>) {
    match value {
        serde_json::Value::Null => {}
        serde_json::Value::String(s) => {
            flat.insert(key.to_string(), s.clone());
        }
        serde_json::Value::Bool(_) | serde_json::Value::Number(_) => {
            flat.insert(key.to_string(), value.to_string());
        }
        serde_json::Value::Object(obj) => {
            for (child, nested) in obj {
                flatten_value(&format!("{}.{}", key, child), nested, flat);
            }
        }
        serde_json::Value::Array(arr) => {
            for (i, nested) in arr.iter().enumerate() {
                flatten_value(&format!("{}.{}", key, i), nested, flat);
            }
        }
    }
}
