//! In-memory Property Graph
//!
//! petgraph-backed [`GraphAccess`] implementation. Vertex data lives in a
//! side table indexed by store id, the petgraph `DiGraph` holds topology and
//! edge labels, and a guid index gives O(1) entity lookup.

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;

use crate::error::GraphAccessError;

use super::{AccessResult, Direction, Edge, GraphAccess, Vertex, VertexId};

/// Labelled property graph held in process memory
#[derive(Debug, Default)]
pub struct MemoryGraph {
    /// Topology; node weights are store ids, edge weights are labels
    pub(crate) graph: DiGraph<VertexId, String>,

    /// Vertex data indexed by store id
    pub(crate) vertices: HashMap<VertexId, Vertex>,

    /// Node index lookup: store id -> NodeIndex
    pub(crate) node_indices: HashMap<VertexId, NodeIndex>,

    /// Index: entity guid -> store id
    pub(crate) by_guid: HashMap<String, VertexId>,

    /// Hash of the snapshot files this graph was loaded from (empty if built in code)
    pub bundle_hash: String,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a vertex, replacing the data of an existing vertex with the same id
    pub fn add_vertex(&mut self, vertex: Vertex) -> NodeIndex {
        if let Some(stale) = self.vertices.get(&vertex.id).and_then(Vertex::guid) {
            self.by_guid.remove(stale);
        }
        if let Some(guid) = vertex.guid() {
            self.by_guid.insert(guid.to_string(), vertex.id.clone());
        }

        let idx = match self.node_indices.get(&vertex.id) {
            Some(&idx) => idx,
            None => {
                let idx = self.graph.add_node(vertex.id.clone());
                self.node_indices.insert(vertex.id.clone(), idx);
                idx
            }
        };
        self.vertices.insert(vertex.id.clone(), vertex);
        idx
    }

    /// Builder-style vertex insertion
    pub fn with_vertex(mut self, vertex: Vertex) -> Self {
        self.add_vertex(vertex);
        self
    }

    /// Connect two existing vertices
    pub fn add_edge(&mut self, edge: Edge) -> AccessResult<()> {
        let from = self.index_of(&edge.source)?;
        let to = self.index_of(&edge.target)?;
        self.graph.add_edge(from, to, edge.label);
        Ok(())
    }

    /// Builder-style edge insertion; panics on unknown endpoints
    pub fn with_edge(mut self, label: &str, source: &str, target: &str) -> Self {
        if let Err(e) = self.add_edge(Edge::new(label, source, target)) {
            panic!("invalid edge {} -> {}: {}", source, target, e);
        }
        self
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// All stored vertices
    pub fn all_vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.values()
    }

    fn index_of(&self, id: &VertexId) -> AccessResult<NodeIndex> {
        self.node_indices
            .get(id)
            .copied()
            .ok_or_else(|| GraphAccessError::MissingVertex(id.to_string()))
    }

    fn collect_edges(
        &self,
        idx: NodeIndex,
        labels: &[&str],
        direction: petgraph::Direction,
        out: &mut Vec<Edge>,
    ) {
        for edge in self.graph.edges_directed(idx, direction) {
            let label = edge.weight();
            if !labels.is_empty() && !labels.iter().any(|l| *l == label.as_str()) {
                continue;
            }
            if let (Some(source), Some(target)) = (
                self.graph.node_weight(edge.source()),
                self.graph.node_weight(edge.target()),
            ) {
                out.push(Edge {
                    label: label.clone(),
                    source: source.clone(),
                    target: target.clone(),
                });
            }
        }
    }
}

impl GraphAccess for MemoryGraph {
    fn vertex_by_guid(&self, guid: &str) -> AccessResult<Option<Vertex>> {
        Ok(self
            .by_guid
            .get(guid)
            .and_then(|id| self.vertices.get(id))
            .cloned())
    }

    fn vertex(&self, id: &VertexId) -> AccessResult<Option<Vertex>> {
        Ok(self.vertices.get(id).cloned())
    }

    fn edges(&self, id: &VertexId, labels: &[&str], direction: Direction) -> AccessResult<Vec<Edge>> {
        let idx = self.index_of(id)?;
        let mut edges = Vec::new();

        match direction {
            Direction::In => self.collect_edges(idx, labels, petgraph::Direction::Incoming, &mut edges),
            Direction::Out => self.collect_edges(idx, labels, petgraph::Direction::Outgoing, &mut edges),
            Direction::Both => {
                self.collect_edges(idx, labels, petgraph::Direction::Incoming, &mut edges);
                self.collect_edges(idx, labels, petgraph::Direction::Outgoing, &mut edges);
            }
        }
        Ok(edges)
    }
}
