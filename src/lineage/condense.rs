//! Condensation
//!
//! Ultimate-source and ultimate-destination results can fan out to any
//! number of terminals. They are rendered through one synthetic node so the
//! queried vertex always has a single edge on the condensed side.

use crate::graph::labels::CONDENSED;
use crate::model::{LineageEdge, LineageVertex, LineageVerticesAndEdges, Scope};

/// Which side of the queried vertex the condensed node sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CondensationKind {
    /// `terminal -> condensed -> queried`
    Source,
    /// `queried -> condensed -> terminal`
    Destination,
}

impl CondensationKind {
    pub fn node_id(&self) -> &'static str {
        match self {
            Self::Source => "condensedSource",
            Self::Destination => "condensedDestination",
        }
    }

    /// Condensation applied to results of `scope`, if any
    pub fn for_scope(scope: Scope) -> Option<Self> {
        match scope {
            Scope::UltimateSource => Some(Self::Source),
            Scope::UltimateDestination => Some(Self::Destination),
            Scope::EndToEnd | Scope::Vertical => None,
        }
    }

    fn edge(&self, from: &str, to: &str) -> LineageEdge {
        LineageEdge::new(CONDENSED, from, to)
    }
}

/// Wrap a terminal set around a synthetic condensed node.
///
/// An empty terminal set, or one holding only the queried vertex, is
/// returned unchanged.
pub fn condense(
    queried: LineageVertex,
    terminals: LineageVerticesAndEdges,
    kind: CondensationKind,
    display_name: &str,
) -> LineageVerticesAndEdges {
    let degenerate = terminals.vertices.is_empty()
        || (terminals.vertices.len() == 1 && terminals.vertices.iter().all(|v| v.node_id == queried.node_id));
    if degenerate {
        return terminals;
    }

    let condensed_id = kind.node_id();
    let mut result = LineageVerticesAndEdges::new();

    for terminal in &terminals.vertices {
        if terminal.node_id == queried.node_id {
            continue;
        }
        let edge = match kind {
            CondensationKind::Source => kind.edge(&terminal.node_id, condensed_id),
            CondensationKind::Destination => kind.edge(condensed_id, &terminal.node_id),
        };
        result.edges.insert(edge);
    }

    let queried_edge = match kind {
        CondensationKind::Source => kind.edge(condensed_id, &queried.node_id),
        CondensationKind::Destination => kind.edge(&queried.node_id, condensed_id),
    };
    result.edges.insert(queried_edge);

    result.vertices.extend(terminals.vertices);
    result.merge_vertex(queried);
    result
        .vertices
        .insert(LineageVertex::new(condensed_id, CONDENSED).with_display_name(display_name));
    result
}
