//! Lineage result model

use serde::{Deserialize, Serialize};
use std::collections::{hash_map, BTreeMap, HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use crate::error::GraphAccessError;
use crate::graph::{labels, GraphAccess, Vertex};

/// Which lineage view a query computes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Scope {
    EndToEnd,
    UltimateSource,
    UltimateDestination,
    Vertical,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EndToEnd => "END_TO_END",
            Self::UltimateSource => "ULTIMATE_SOURCE",
            Self::UltimateDestination => "ULTIMATE_DESTINATION",
            Self::Vertical => "VERTICAL",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = String;

    /// Accepts `END_TO_END` as well as `end-to-end`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().replace('-', "_").as_str() {
            "END_TO_END" => Ok(Self::EndToEnd),
            "ULTIMATE_SOURCE" => Ok(Self::UltimateSource),
            "ULTIMATE_DESTINATION" => Ok(Self::UltimateDestination),
            "VERTICAL" => Ok(Self::Vertical),
            _ => Err(format!("unknown lineage scope: {}", s)),
        }
    }
}

/// One vertex of a lineage result
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineageVertex {
    #[serde(rename = "nodeID")]
    pub node_id: String,
    pub guid: String,
    pub label: String,
    pub display_name: String,
    pub qualified_name: String,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

impl LineageVertex {
    pub fn new(node_id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            guid: String::new(),
            label: label.into(),
            display_name: String::new(),
            qualified_name: String::new(),
            properties: BTreeMap::new(),
        }
    }

    /// Build from a stored vertex, flattening its properties through the port
    pub fn from_vertex<G: GraphAccess + ?Sized>(
        graph: &G,
        vertex: &Vertex,
    ) -> Result<Self, GraphAccessError> {
        let properties = graph.vertex_properties(vertex)?;
        let field = |key: &str| properties.get(key).cloned().unwrap_or_default();

        Ok(Self {
            node_id: vertex.id.to_string(),
            guid: field(labels::PROPERTY_GUID),
            label: vertex.label.clone(),
            display_name: field(labels::PROPERTY_DISPLAY_NAME),
            qualified_name: field(labels::PROPERTY_QUALIFIED_NAME),
            properties,
        })
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }
}

/// One directed edge of a lineage result
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineageEdge {
    pub label: String,
    #[serde(rename = "sourceNodeID")]
    pub source_node_id: String,
    #[serde(rename = "destinationNodeID")]
    pub destination_node_id: String,
}

impl LineageEdge {
    pub fn new(
        label: impl Into<String>,
        source_node_id: impl Into<String>,
        destination_node_id: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            source_node_id: source_node_id.into(),
            destination_node_id: destination_node_id.into(),
        }
    }

    pub fn touches(&self, node_id: &str) -> bool {
        self.source_node_id == node_id || self.destination_node_id == node_id
    }
}

/// Lineage vertices indexed by node id.
///
/// Serializes as a plain list. At most one vertex per node id is held;
/// inserting a vertex replaces any vertex with the same node id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<LineageVertex>", into = "Vec<LineageVertex>")]
pub struct VertexSet {
    by_node_id: HashMap<String, LineageVertex>,
}

impl VertexSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.by_node_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_node_id.is_empty()
    }

    /// Insert or replace by node id; returns the replaced vertex
    pub fn insert(&mut self, vertex: LineageVertex) -> Option<LineageVertex> {
        self.by_node_id.insert(vertex.node_id.clone(), vertex)
    }

    pub fn get(&self, node_id: &str) -> Option<&LineageVertex> {
        self.by_node_id.get(node_id)
    }

    pub fn contains_node(&self, node_id: &str) -> bool {
        self.by_node_id.contains_key(node_id)
    }

    /// Whether this exact vertex (all fields equal) is present
    pub fn contains(&self, vertex: &LineageVertex) -> bool {
        self.get(&vertex.node_id) == Some(vertex)
    }

    pub fn remove(&mut self, node_id: &str) -> Option<LineageVertex> {
        self.by_node_id.remove(node_id)
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&LineageVertex) -> bool) {
        self.by_node_id.retain(|_, vertex| keep(vertex));
    }

    pub fn iter(&self) -> hash_map::Values<'_, String, LineageVertex> {
        self.by_node_id.values()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.by_node_id.keys().map(String::as_str)
    }
}

impl Extend<LineageVertex> for VertexSet {
    fn extend<I: IntoIterator<Item = LineageVertex>>(&mut self, vertices: I) {
        for vertex in vertices {
            self.insert(vertex);
        }
    }
}

impl FromIterator<LineageVertex> for VertexSet {
    fn from_iter<I: IntoIterator<Item = LineageVertex>>(vertices: I) -> Self {
        let mut set = Self::new();
        set.extend(vertices);
        set
    }
}

impl IntoIterator for VertexSet {
    type Item = LineageVertex;
    type IntoIter = hash_map::IntoValues<String, LineageVertex>;

    fn into_iter(self) -> Self::IntoIter {
        self.by_node_id.into_values()
    }
}

impl<'a> IntoIterator for &'a VertexSet {
    type Item = &'a LineageVertex;
    type IntoIter = hash_map::Values<'a, String, LineageVertex>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl From<Vec<LineageVertex>> for VertexSet {
    fn from(vertices: Vec<LineageVertex>) -> Self {
        vertices.into_iter().collect()
    }
}

impl From<VertexSet> for Vec<LineageVertex> {
    fn from(set: VertexSet) -> Self {
        set.into_iter().collect()
    }
}

/// The vertices and edges of one lineage query
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineageVerticesAndEdges {
    pub vertices: VertexSet,
    pub edges: HashSet<LineageEdge>,
}

impl LineageVerticesAndEdges {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.edges.is_empty()
    }

    /// Vertex with the given node id
    pub fn vertex(&self, node_id: &str) -> Option<&LineageVertex> {
        self.vertices.get(node_id)
    }

    pub fn node_ids(&self) -> HashSet<&str> {
        self.vertices.node_ids().collect()
    }

    /// Merge a vertex by node id.
    ///
    /// An equal vertex is left alone. A vertex with the same node id but
    /// different content keeps its own values and gains the properties it
    /// was missing. Otherwise the vertex is inserted.
    pub fn merge_vertex(&mut self, vertex: LineageVertex) {
        match self.vertices.by_node_id.entry(vertex.node_id.clone()) {
            hash_map::Entry::Occupied(mut current) => {
                for (key, value) in vertex.properties {
                    current.get_mut().properties.entry(key).or_insert(value);
                }
            }
            hash_map::Entry::Vacant(slot) => {
                slot.insert(vertex);
            }
        }
    }

    /// Edges whose endpoints are not both present as vertices
    pub fn dangling_edges(&self) -> Vec<&LineageEdge> {
        self.edges
            .iter()
            .filter(|e| {
                !self.vertices.contains_node(&e.source_node_id)
                    || !self.vertices.contains_node(&e.destination_node_id)
            })
            .collect()
    }

    /// Export to GraphViz DOT, sorted for stable output
    pub fn to_dot(&self) -> String {
        let mut output = String::new();
        output.push_str("digraph Lineage {\n");
        output.push_str("  rankdir=LR;\n");
        output.push_str("  node [shape=box, style=\"rounded\", fontname=\"Helvetica\", fontsize=10];\n");
        output.push_str("  edge [fontname=\"Helvetica\", fontsize=8];\n\n");

        let mut vertices: Vec<&LineageVertex> = self.vertices.iter().collect();
        vertices.sort_by(|a, b| a.node_id.cmp(&b.node_id));
        for vertex in vertices {
            let shape = if vertex.label == labels::CONDENSED { ", shape=ellipse" } else { "" };
            output.push_str(&format!(
                "  \"{}\" [label=\"{}\\n({})\"{}];\n",
                escape(&vertex.node_id),
                escape(&vertex.display_name),
                escape(&vertex.label),
                shape
            ));
        }

        output.push('\n');

        let mut edges: Vec<&LineageEdge> = self.edges.iter().collect();
        edges.sort_by(|a, b| {
            (&a.source_node_id, &a.destination_node_id, &a.label)
                .cmp(&(&b.source_node_id, &b.destination_node_id, &b.label))
        });
        for edge in edges {
            output.push_str(&format!(
                "  \"{}\" -> \"{}\" [label=\"{}\"];\n",
                escape(&edge.source_node_id),
                escape(&edge.destination_node_id),
                escape(&edge.label)
            ));
        }

        output.push_str("}\n");
        output
    }
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
