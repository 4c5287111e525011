//! Query Façade
//!
//! Entry point for lineage queries. Resolves the entity, runs the traversal
//! for the requested scope and assembles the final result.

use tracing::{debug, error};

use crate::config::{LineageConfig, QueryConfig};
use crate::error::{LineageError, Result};
use crate::graph::{GraphAccess, Vertex};
use crate::model::{LineageVertex, LineageVerticesAndEdges, Scope};

use super::condense::{condense, CondensationKind};
use super::filter::filter_by_display_name;
use super::normalize::{add_column_properties, add_incomplete_classifications, normalize};
use super::traversal::TraversalEngine;

/// Read-only lineage queries over a graph port.
///
/// Holds no mutable state; share it across threads when `G` is `Sync`.
#[derive(Debug)]
pub struct LineageService<G> {
    graph: G,
    config: QueryConfig,
}

impl<G: GraphAccess> LineageService<G> {
    pub fn new(graph: G) -> Self {
        Self {
            graph,
            config: QueryConfig::default(),
        }
    }

    pub fn with_config(graph: G, config: &LineageConfig) -> Self {
        Self {
            graph,
            config: config.query.clone(),
        }
    }

    pub fn graph(&self) -> &G {
        &self.graph
    }

    /// Lineage of the entity `guid` for `scope`.
    ///
    /// An empty `display_name_must_contain` disables filtering. A filter
    /// that removes every vertex still yields a successful, empty result.
    #[tracing::instrument(skip(self))]
    pub fn lineage(
        &self,
        scope: Scope,
        guid: &str,
        display_name_must_contain: &str,
        include_processes: bool,
    ) -> Result<LineageVerticesAndEdges> {
        let start = self.resolve(guid, |guid| LineageError::lineage_not_found(guid))?;

        let raw = TraversalEngine::new(&self.graph)
            .run(scope, &start)
            .ok_or_else(|| LineageError::lineage_not_found(guid))?;

        let condensation = CondensationKind::for_scope(scope);
        // Terminal sets are ends of paths, never intermediates
        let keep_processes = include_processes || condensation.is_some();
        let mut result = normalize(&self.graph, &raw, keep_processes, &start.id);

        if let Some(kind) = condensation {
            let queried = LineageVertex::from_vertex(&self.graph, &start).map_err(|e| {
                error!(guid, vertex = %start.id, error = %e, "failed to read queried vertex");
                LineageError::lineage_not_found(guid)
            })?;
            result = condense(queried, result, kind, &self.config.condensed_display_name);
        }

        if result.vertices.is_empty() {
            debug!(%scope, guid, "traversal produced no vertices");
            return Err(LineageError::lineage_not_found(guid));
        }

        add_column_properties(&self.graph, &mut result);
        add_incomplete_classifications(&self.graph, &mut result);
        filter_by_display_name(&mut result, display_name_must_contain);

        debug!(
            %scope,
            guid,
            vertices = result.vertices.len(),
            edges = result.edges.len(),
            "lineage query complete"
        );
        Ok(result)
    }

    /// [`lineage`](Self::lineage) without filtering, with the configured
    /// process inclusion
    pub fn lineage_with_defaults(&self, scope: Scope, guid: &str) -> Result<LineageVerticesAndEdges> {
        self.lineage(scope, guid, "", self.config.include_processes)
    }

    /// Flattened properties of a single entity
    #[tracing::instrument(skip(self))]
    pub fn entity_details(&self, guid: &str) -> Result<LineageVertex> {
        let vertex = self.resolve(guid, |guid| LineageError::entity_not_found(guid))?;
        LineageVertex::from_vertex(&self.graph, &vertex).map_err(|e| {
            error!(guid, vertex = %vertex.id, error = %e, "failed to read entity properties");
            LineageError::entity_not_found(guid)
        })
    }

    /// Vertex for `guid`; a port failure maps to `on_failure`
    fn resolve(&self, guid: &str, on_failure: fn(&str) -> LineageError) -> Result<Vertex> {
        match self.graph.vertex_by_guid(guid) {
            Ok(Some(vertex)) => Ok(vertex),
            Ok(None) => Err(LineageError::entity_not_found(guid)),
            Err(e) => {
                error!(guid, error = %e, "graph access failed resolving entity");
                Err(on_failure(guid))
            }
        }
    }
}
