//! Traversal Engine
//!
//! Repeated-frontier walks over the graph port. Each directed walk keeps a
//! visited set, so a vertex is expanded at most once per walk: paths stay
//! simple, cycles terminate, and work is bounded by the reachable vertices.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::LazyLock;
use tracing::{debug, error, warn};

use crate::graph::labels::{self, *};
use crate::graph::{AccessResult, Direction, GraphAccess, Subgraph, Vertex, VertexId};
use crate::model::Scope;

/// One-hop semantic traversal used for vertical lineage
#[derive(Debug, Clone, Copy)]
struct VerticalPlan {
    /// Followed in both directions from the queried vertex
    labels: &'static [&'static str],
    /// Follow one inbound `AssetSchemaType` edge to the owning asset
    owner_hop: bool,
}

const TERM_EDGES: &[&str] = &[SEMANTIC_ASSIGNMENT, RELATED_TERM, CLASSIFICATION];
const COLUMN_SEMANTIC_EDGES: &[&str] = &[SEMANTIC_ASSIGNMENT, CLASSIFICATION];

static VERTICAL_PLANS: LazyLock<HashMap<&'static str, VerticalPlan>> = LazyLock::new(|| {
    let relational = VerticalPlan { labels: COLUMN_SEMANTIC_EDGES, owner_hop: false };
    let tabular = VerticalPlan { labels: COLUMN_SEMANTIC_EDGES, owner_hop: true };

    HashMap::from([
        (GLOSSARY_TERM, VerticalPlan { labels: TERM_EDGES, owner_hop: false }),
        (RELATIONAL_COLUMN, relational),
        (TABULAR_COLUMN, tabular),
        (TABULAR_FILE_COLUMN, tabular),
    ])
});

/// Vertices and edges reached by one directed walk
#[derive(Debug, Default)]
struct Walk {
    graph: Subgraph,
    /// Reached vertices with no matching edge in the walk direction
    terminals: Vec<VertexId>,
}

/// Runs lineage traversals against a graph port
pub struct TraversalEngine<'g, G: ?Sized> {
    graph: &'g G,
}

impl<'g, G: GraphAccess + ?Sized> TraversalEngine<'g, G> {
    pub fn new(graph: &'g G) -> Self {
        Self { graph }
    }

    /// Raw subgraph for `scope` starting at `start`.
    ///
    /// For the ultimate scopes the subgraph holds only the terminal
    /// vertices. `None` means the scope does not apply to this vertex, the
    /// walk found nothing, or the graph failed underneath us.
    pub fn run(&self, scope: Scope, start: &Vertex) -> Option<Subgraph> {
        let outcome = match scope {
            Scope::EndToEnd => self.end_to_end(start),
            Scope::UltimateSource => self.ultimate(start, Direction::In),
            Scope::UltimateDestination => self.ultimate(start, Direction::Out),
            Scope::Vertical => self.vertical(start),
        };

        match outcome {
            Ok(Some(graph)) => Some(graph),
            Ok(None) => {
                debug!(%scope, vertex = %start.id, label = %start.label, "no lineage for vertex");
                None
            }
            Err(e) => {
                error!(
                    %scope,
                    guid = start.guid().unwrap_or_default(),
                    vertex = %start.id,
                    edge_labels = ?attempted_labels(scope, &start.label),
                    error = %e,
                    "graph access failed during lineage traversal"
                );
                None
            }
        }
    }

    /// Everything upstream and downstream of `start`, with the paths between
    pub fn end_to_end(&self, start: &Vertex) -> AccessResult<Option<Subgraph>> {
        let Some(edge_labels) = labels::edge_label_set(&start.label) else {
            return Ok(None);
        };

        let mut graph = self.walk(start, edge_labels, Direction::In)?.graph;
        graph.extend(self.walk(start, edge_labels, Direction::Out)?.graph);

        if graph.edges.is_empty() {
            return Ok(None);
        }
        Ok(Some(graph))
    }

    /// The vertices at the far end of every inbound (`In`) or outbound
    /// (`Out`) data-flow path from `start`
    pub fn ultimate(&self, start: &Vertex, direction: Direction) -> AccessResult<Option<Subgraph>> {
        let Some(edge_labels) = labels::edge_label_set(&start.label) else {
            return Ok(None);
        };

        let walk = self.walk(start, edge_labels, direction)?;
        let mut terminals = Subgraph::new();
        for id in &walk.terminals {
            if let Some(vertex) = walk.graph.vertices.get(id) {
                terminals.add_vertex(vertex.clone());
            }
        }
        Ok(Some(terminals))
    }

    /// Semantic neighbourhood of a glossary term or column
    pub fn vertical(&self, start: &Vertex) -> AccessResult<Option<Subgraph>> {
        let Some(plan) = VERTICAL_PLANS.get(start.label.as_str()) else {
            return Ok(None);
        };

        let mut graph = self.graph.subgraph(&start.id, plan.labels, Direction::Both)?;
        if plan.owner_hop {
            graph.extend(self.graph.subgraph(&start.id, &[ASSET_SCHEMA_TYPE], Direction::In)?);
        }

        if graph.edges.is_empty() {
            return Ok(None);
        }
        Ok(Some(graph))
    }

    fn walk(&self, start: &Vertex, edge_labels: &[&str], direction: Direction) -> AccessResult<Walk> {
        let mut walk = Walk::default();
        walk.graph.add_vertex(start.clone());

        let mut visited: HashSet<VertexId> = HashSet::from([start.id.clone()]);
        let mut frontier = VecDeque::from([start.id.clone()]);

        while let Some(id) = frontier.pop_front() {
            let edges = self.graph.edges(&id, edge_labels, direction)?;
            if edges.is_empty() {
                walk.terminals.push(id);
                continue;
            }

            for edge in edges {
                let next = edge.other_end(&id).clone();
                if visited.insert(next.clone()) {
                    match self.graph.vertex(&next)? {
                        Some(vertex) => {
                            walk.graph.add_vertex(vertex);
                            frontier.push_back(next.clone());
                        }
                        None => {
                            warn!(vertex = %next, edge = %edge.label, "skipping edge to unmaterialized vertex");
                            continue;
                        }
                    }
                }
                if walk.graph.contains(&next) {
                    walk.graph.add_edge(edge);
                }
            }
        }

        Ok(walk)
    }
}

fn attempted_labels(scope: Scope, vertex_label: &str) -> Vec<&'static str> {
    match scope {
        Scope::Vertical => VERTICAL_PLANS
            .get(vertex_label)
            .map(|plan| {
                let mut attempted = plan.labels.to_vec();
                if plan.owner_hop {
                    attempted.push(ASSET_SCHEMA_TYPE);
                }
                attempted
            })
            .unwrap_or_default(),
        _ => labels::edge_label_set(vertex_label).map(<[_]>::to_vec).unwrap_or_default(),
    }
}
