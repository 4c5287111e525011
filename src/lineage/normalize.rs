//! Result Normalizer
//!
//! Turns raw port subgraphs into the lineage model and applies the deferred
//! enrichments: column ownership properties and the incomplete
//! classification overlay. Enrichment runs on the final vertex set so no
//! lookups are spent on vertices that condensation or filtering drop.

use tracing::{debug, warn};

use crate::graph::labels::{self, *};
use crate::graph::{AccessResult, Direction, Edge, GraphAccess, Subgraph, VertexId};
use crate::model::{LineageEdge, LineageVertex, LineageVerticesAndEdges};

/// Convert a raw subgraph into lineage vertices and edges.
///
/// With `include_processes` off, intermediate process vertices (those with
/// both an inbound and an outbound edge in the result) are removed and every
/// path through them is bridged by a direct edge. Processes at the ends of
/// the result and the `queried` vertex are kept.
pub fn normalize<G: GraphAccess + ?Sized>(
    graph: &G,
    raw: &Subgraph,
    include_processes: bool,
    queried: &VertexId,
) -> LineageVerticesAndEdges {
    let mut result = LineageVerticesAndEdges::new();

    for vertex in raw.vertices.values() {
        match LineageVertex::from_vertex(graph, vertex) {
            Ok(lineage_vertex) => {
                result.vertices.insert(lineage_vertex);
            }
            Err(e) => warn!(vertex = %vertex.id, error = %e, "skipping vertex without readable properties"),
        }
    }

    for edge in &raw.edges {
        if result.vertices.contains_node(edge.source.as_str())
            && result.vertices.contains_node(edge.target.as_str())
        {
            result.edges.insert(to_lineage_edge(edge));
        }
    }

    if !include_processes {
        remove_processes(&mut result, queried.as_str());
    }
    result
}

pub(crate) fn to_lineage_edge(edge: &Edge) -> LineageEdge {
    LineageEdge::new(edge.label.clone(), edge.source.to_string(), edge.target.to_string())
}

fn remove_processes(result: &mut LineageVerticesAndEdges, queried: &str) {
    let processes: Vec<String> = result
        .vertices
        .iter()
        .filter(|v| labels::is_process(&v.label) && v.node_id != queried)
        .map(|v| v.node_id.clone())
        .collect();

    for process in &processes {
        let inbound: Vec<LineageEdge> = result
            .edges
            .iter()
            .filter(|e| &e.destination_node_id == process && &e.source_node_id != process)
            .cloned()
            .collect();
        let outbound: Vec<LineageEdge> = result
            .edges
            .iter()
            .filter(|e| &e.source_node_id == process && &e.destination_node_id != process)
            .cloned()
            .collect();

        // Evaluated against the current edges so chains of processes collapse
        if inbound.is_empty() || outbound.is_empty() {
            continue;
        }

        result.edges.retain(|e| !e.touches(process));
        result.vertices.remove(process);

        for input in &inbound {
            for output in &outbound {
                if input.source_node_id != output.destination_node_id {
                    result.edges.insert(LineageEdge::new(
                        input.label.clone(),
                        input.source_node_id.clone(),
                        output.destination_node_id.clone(),
                    ));
                }
            }
        }
    }
}

/// Add owning table/file properties to every column vertex in the result
pub fn add_column_properties<G: GraphAccess + ?Sized>(graph: &G, result: &mut LineageVerticesAndEdges) {
    let columns: Vec<LineageVertex> = result
        .vertices
        .iter()
        .filter(|v| labels::is_column(&v.label))
        .cloned()
        .collect();

    for column in columns {
        let owner = match owning_asset(graph, &column.node_id) {
            Ok(Some(owner)) => owner,
            Ok(None) => {
                debug!(column = %column.node_id, "column has no owning asset");
                continue;
            }
            Err(e) => {
                warn!(column = %column.node_id, error = %e, "column property lookup failed");
                continue;
            }
        };

        let mut enriched = column.clone();
        enriched.properties.insert(PROPERTY_TABLE_GUID.to_string(), owner.guid);
        enriched.properties.insert(PROPERTY_TABLE_DISPLAY_NAME.to_string(), owner.display_name);
        enriched.properties.insert(PROPERTY_TABLE_QUALIFIED_NAME.to_string(), owner.qualified_name);

        if enriched != column {
            result.vertices.insert(enriched);
        }
    }
}

fn owning_asset<G: GraphAccess + ?Sized>(graph: &G, node_id: &str) -> AccessResult<Option<LineageVertex>> {
    let id = VertexId::new(node_id);
    let Some(edge) = graph.edges(&id, COLUMN_OWNER_EDGES, Direction::In)?.into_iter().next() else {
        return Ok(None);
    };
    match graph.vertex(&edge.source)? {
        Some(owner) => LineageVertex::from_vertex(graph, &owner).map(Some),
        None => Ok(None),
    }
}

/// Overlay `Incomplete` classifications attached to result vertices.
///
/// Each classification vertex comes with all of its edges and the vertices
/// at their other ends. Vertices merge by node id so an enriched vertex is
/// never duplicated by its raw form.
pub fn add_incomplete_classifications<G: GraphAccess + ?Sized>(
    graph: &G,
    result: &mut LineageVerticesAndEdges,
) {
    let anchors: Vec<String> = result
        .vertices
        .iter()
        .filter(|v| v.label != CONDENSED)
        .map(|v| v.node_id.clone())
        .collect();

    for anchor in anchors {
        let id = VertexId::new(anchor.as_str());
        let edges = match graph.edges(&id, &[CLASSIFICATION], Direction::Out) {
            Ok(edges) => edges,
            Err(e) => {
                warn!(vertex = %anchor, error = %e, "classification lookup failed");
                continue;
            }
        };

        let mut attached = 0usize;
        for edge in edges {
            let classification = match graph.vertex(&edge.target) {
                Ok(Some(vertex)) if vertex.label == INCOMPLETE => vertex,
                Ok(Some(_)) => continue,
                Ok(None) => {
                    warn!(vertex = %anchor, classification = %edge.target, "classification edge points to a missing vertex");
                    continue;
                }
                Err(e) => {
                    warn!(vertex = %anchor, classification = %edge.target, error = %e, "classification lookup failed");
                    continue;
                }
            };

            attached += 1;
            if let Err(e) = merge_classification(graph, result, &classification.id) {
                warn!(vertex = %anchor, classification = %classification.id, error = %e, "skipping incomplete classification");
            }
        }

        if attached > 1 {
            warn!(vertex = %anchor, count = attached, "multiple incomplete classifications attached, merging all");
        }
    }
}

fn merge_classification<G: GraphAccess + ?Sized>(
    graph: &G,
    result: &mut LineageVerticesAndEdges,
    classification: &VertexId,
) -> AccessResult<()> {
    let fragment = graph.subgraph(classification, &[], Direction::Both)?;

    // Convert everything first so a failure leaves the result untouched
    let vertices = fragment
        .vertices
        .values()
        .map(|v| LineageVertex::from_vertex(graph, v))
        .collect::<AccessResult<Vec<_>>>()?;

    for vertex in vertices {
        result.merge_vertex(vertex);
    }
    for edge in &fragment.edges {
        result.edges.insert(to_lineage_edge(edge));
    }
    Ok(())
}
