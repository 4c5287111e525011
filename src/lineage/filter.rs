//! Display-name filter applied as the last step of a query

use std::collections::HashSet;

use crate::model::LineageVerticesAndEdges;

/// Keep only vertices whose display name contains `substring`.
///
/// Matching is literal and case-sensitive. Edges touching a removed vertex
/// go with it. An empty substring keeps everything.
pub fn filter_by_display_name(result: &mut LineageVerticesAndEdges, substring: &str) {
    if substring.is_empty() {
        return;
    }

    let removed: HashSet<String> = result
        .vertices
        .iter()
        .filter(|v| !v.display_name.contains(substring))
        .map(|v| v.node_id.clone())
        .collect();
    if removed.is_empty() {
        return;
    }

    result.vertices.retain(|v| !removed.contains(&v.node_id));
    result.edges.retain(|e| {
        !removed.contains(&e.source_node_id) && !removed.contains(&e.destination_node_id)
    });
}
