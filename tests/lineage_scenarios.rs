//! Lineage Scenarios
//!
//! End-to-end queries against the warehouse snapshot under
//! `tests/fixtures/warehouse`: two source tables feed a report through an
//! ETL process, the report is exported to CSV, and the report's customer
//! column carries a glossary term and an incomplete classification.

use std::collections::HashSet;
use std::path::Path;

use lineage_graph::graph::labels::*;
use lineage_graph::graph::{AccessResult, LoadConfig};
use lineage_graph::{
    load_from_directory, Direction, Edge, ErrorCode, ErrorOutcome, GraphAccess, GraphAccessError,
    LineageEdge, LineageError, LineageService, LineageVerticesAndEdges, MemoryGraph, Scope, Vertex,
    VertexId,
};

fn fixtures_path() -> &'static Path {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").leak()
}

fn warehouse() -> MemoryGraph {
    load_from_directory(&fixtures_path().join("warehouse"), &LoadConfig::default())
        .expect("warehouse fixture loads")
}

fn service() -> LineageService<MemoryGraph> {
    LineageService::new(warehouse())
}

fn sorted_ids(result: &LineageVerticesAndEdges) -> Vec<&str> {
    let mut ids: Vec<&str> = result.node_ids().into_iter().collect();
    ids.sort();
    ids
}

// =============================================================================
// Loading
// =============================================================================

#[test]
fn test_fixture_edges_resolve_across_files() {
    let graph = warehouse();
    assert_eq!(graph.vertex_count(), 13);
    assert_eq!(graph.edge_count(), 15);
    assert_eq!(graph.bundle_hash.len(), 64);
}

// =============================================================================
// End-to-end
// =============================================================================

#[test]
fn test_end_to_end_with_processes() {
    let result = service().lineage(Scope::EndToEnd, "g-report", "", true).unwrap();

    assert_eq!(
        sorted_ids(&result),
        vec!["f_export", "p_etl", "t_customers", "t_orders", "t_report"]
    );
    assert_eq!(result.edges.len(), 4);
    assert!(result.dangling_edges().is_empty());
}

#[test]
fn test_end_to_end_without_processes_bridges_paths() {
    let result = service().lineage(Scope::EndToEnd, "g-report", "", false).unwrap();

    assert_eq!(sorted_ids(&result), vec!["f_export", "t_customers", "t_orders", "t_report"]);
    let expected: HashSet<LineageEdge> = [
        LineageEdge::new(TABLE_DATA_FLOW, "t_customers", "t_report"),
        LineageEdge::new(TABLE_DATA_FLOW, "t_orders", "t_report"),
        LineageEdge::new(TABLE_DATA_FLOW, "t_report", "f_export"),
    ]
    .into_iter()
    .collect();
    assert_eq!(result.edges, expected);
}

#[test]
fn test_end_to_end_column_lineage_is_enriched() {
    let result = service().lineage(Scope::EndToEnd, "g-col-report-customer", "", true).unwrap();

    assert_eq!(
        sorted_ids(&result),
        vec!["c_customer_id", "c_report_customer", "cls_incomplete", "fc_customer"]
    );
    assert_eq!(result.edges.len(), 3);
    assert!(result
        .edges
        .contains(&LineageEdge::new(CLASSIFICATION, "c_report_customer", "cls_incomplete")));

    let report_column = result.vertex("c_report_customer").unwrap();
    assert_eq!(report_column.properties[PROPERTY_TABLE_GUID], "g-report");
    assert_eq!(report_column.properties[PROPERTY_TABLE_DISPLAY_NAME], "Revenue Report");
    assert_eq!(report_column.properties[PROPERTY_TABLE_QUALIFIED_NAME], "dw.marts.revenue_report");

    // File columns are owned through AssetSchemaType
    let csv_column = result.vertex("fc_customer").unwrap();
    assert_eq!(csv_column.properties[PROPERTY_TABLE_GUID], "g-export");

    let incomplete = result.vertex("cls_incomplete").unwrap();
    assert_eq!(incomplete.properties["additionalProperties.reason"], "upstream mapping missing");
    assert!(!incomplete.properties.contains_key("additionalProperties.steward"));
}

#[test]
fn test_isolated_asset_has_no_lineage() {
    assert_eq!(
        service().lineage(Scope::EndToEnd, "g-staging", "", true).unwrap_err(),
        LineageError::lineage_not_found("g-staging")
    );
}

#[test]
fn test_end_to_end_on_glossary_term_has_no_lineage() {
    let err = service().lineage(Scope::EndToEnd, "g-term-customer", "", true).unwrap_err();
    assert_eq!(err.code(), ErrorCode::LineageNotFound);
}

// =============================================================================
// Ultimate source / destination
// =============================================================================

#[test]
fn test_ultimate_source_condenses_terminals() {
    let result = service().lineage(Scope::UltimateSource, "g-export", "", true).unwrap();

    assert_eq!(
        sorted_ids(&result),
        vec!["condensedSource", "f_export", "t_customers", "t_orders"]
    );
    assert_eq!(result.edges.len(), 3);
    assert!(result
        .edges
        .iter()
        .all(|e| e.label == CONDENSED && (e.touches("condensedSource") || e.touches("f_export"))));
    assert!(result
        .edges
        .contains(&LineageEdge::new(CONDENSED, "condensedSource", "f_export")));
}

#[test]
fn test_ultimate_destination_condenses_terminals() {
    let result = service().lineage(Scope::UltimateDestination, "g-customers", "", true).unwrap();

    assert_eq!(sorted_ids(&result), vec!["condensedDestination", "f_export", "t_customers"]);
    let expected: HashSet<LineageEdge> = [
        LineageEdge::new(CONDENSED, "t_customers", "condensedDestination"),
        LineageEdge::new(CONDENSED, "condensedDestination", "f_export"),
    ]
    .into_iter()
    .collect();
    assert_eq!(result.edges, expected);
}

#[test]
fn test_ultimate_source_of_a_source_is_itself() {
    let result = service().lineage(Scope::UltimateSource, "g-customers", "", true).unwrap();
    assert_eq!(sorted_ids(&result), vec!["t_customers"]);
    assert!(result.edges.is_empty());
}

#[test]
fn test_ultimate_source_on_two_tables() {
    let graph = MemoryGraph::new()
        .with_vertex(
            Vertex::new("a", RELATIONAL_TABLE)
                .with_property(PROPERTY_GUID, "g-a")
                .with_property(PROPERTY_DISPLAY_NAME, "A"),
        )
        .with_vertex(
            Vertex::new("b", RELATIONAL_TABLE)
                .with_property(PROPERTY_GUID, "g-b")
                .with_property(PROPERTY_DISPLAY_NAME, "B"),
        )
        .with_edge(TABLE_DATA_FLOW, "a", "b");

    let result = LineageService::new(graph)
        .lineage(Scope::UltimateSource, "g-b", "", true)
        .unwrap();
    assert_eq!(sorted_ids(&result), vec!["a", "b", "condensedSource"]);
    assert_eq!(result.edges.len(), 2);
}

// =============================================================================
// Vertical
// =============================================================================

#[test]
fn test_vertical_on_relational_column() {
    let result = service().lineage(Scope::Vertical, "g-col-report-customer", "", true).unwrap();

    assert_eq!(
        sorted_ids(&result),
        vec!["c_report_customer", "cls_confidential", "cls_incomplete", "term_customer"]
    );
    assert_eq!(result.edges.len(), 3);
    assert_eq!(
        result.vertex("c_report_customer").unwrap().properties[PROPERTY_TABLE_GUID],
        "g-report"
    );
}

#[test]
fn test_vertical_on_tabular_column_reaches_owning_file() {
    let result = service().lineage(Scope::Vertical, "g-col-csv-customer", "", true).unwrap();

    assert_eq!(sorted_ids(&result), vec!["f_export", "fc_customer", "term_customer"]);
    assert!(result
        .edges
        .contains(&LineageEdge::new(ASSET_SCHEMA_TYPE, "f_export", "fc_customer")));
}

#[test]
fn test_vertical_on_glossary_term_overlays_incomplete() {
    let result = service().lineage(Scope::Vertical, "g-term-customer", "", true).unwrap();

    assert_eq!(
        sorted_ids(&result),
        vec![
            "c_report_customer",
            "cls_confidential",
            "cls_incomplete",
            "fc_customer",
            "term_client",
            "term_customer"
        ]
    );
    assert_eq!(result.edges.len(), 5);
    assert!(result
        .edges
        .contains(&LineageEdge::new(CLASSIFICATION, "term_customer", "cls_confidential")));
    // Reached only through the overlay, not the one-hop traversal
    assert!(result
        .edges
        .contains(&LineageEdge::new(CLASSIFICATION, "c_report_customer", "cls_incomplete")));
    assert!(result.dangling_edges().is_empty());
}

#[test]
fn test_vertical_on_table_has_no_lineage() {
    assert_eq!(
        service().lineage(Scope::Vertical, "g-customers", "", true).unwrap_err(),
        LineageError::lineage_not_found("g-customers")
    );
}

// =============================================================================
// Display filter
// =============================================================================

#[test]
fn test_filter_keeps_matching_vertices_only() {
    let result = service().lineage(Scope::EndToEnd, "g-report", "Ord", false).unwrap();
    assert_eq!(sorted_ids(&result), vec!["t_orders"]);
    assert!(result.edges.is_empty());
}

#[test]
fn test_filter_applies_after_condensation() {
    let result = service().lineage(Scope::UltimateSource, "g-export", "Cust", true).unwrap();
    assert_eq!(sorted_ids(&result), vec!["t_customers"]);
    assert!(result.edges.is_empty());
}

#[test]
fn test_filter_removing_everything_is_still_success() {
    let result = service().lineage(Scope::EndToEnd, "g-report", "zzz", true).unwrap();
    assert!(result.is_empty());
}

// =============================================================================
// Entity details and errors
// =============================================================================

#[test]
fn test_entity_details_flattens_properties() {
    let service = service();

    let confidential = service.entity_details("g-cls-confidential").unwrap();
    assert_eq!(confidential.label, "Confidentiality");
    assert_eq!(confidential.properties["level"], "3");

    let report = service.entity_details("g-report").unwrap();
    assert_eq!(report.qualified_name, "dw.marts.revenue_report");
}

#[test]
fn test_unknown_guid_is_entity_not_found() {
    let service = service();
    for scope in [Scope::EndToEnd, Scope::UltimateSource, Scope::UltimateDestination, Scope::Vertical] {
        let err = service.lineage(scope, "missing", "", true).unwrap_err();
        assert_eq!(err, LineageError::entity_not_found("missing"));
    }

    let outcome = ErrorOutcome::from(service.entity_details("missing").unwrap_err());
    assert_eq!(outcome.code, ErrorCode::EntityNotFound);
    assert_eq!(outcome.guid, "missing");
}

// =============================================================================
// Port failures
// =============================================================================

/// Delegates to a [`MemoryGraph`] but fails the selected primitives and
/// cannot materialize the `hidden` vertices
struct FlakyGraph {
    inner: MemoryGraph,
    fail_lookup: bool,
    fail_edges: bool,
    hidden: &'static [&'static str],
}

impl FlakyGraph {
    fn hiding(hidden: &'static [&'static str]) -> Self {
        Self {
            inner: warehouse(),
            fail_lookup: false,
            fail_edges: false,
            hidden,
        }
    }
}

impl GraphAccess for FlakyGraph {
    fn vertex_by_guid(&self, guid: &str) -> AccessResult<Option<Vertex>> {
        if self.fail_lookup {
            return Err(GraphAccessError::Unavailable("connection reset".to_string()));
        }
        self.inner.vertex_by_guid(guid)
    }

    fn vertex(&self, id: &VertexId) -> AccessResult<Option<Vertex>> {
        if self.hidden.contains(&id.as_str()) {
            return Ok(None);
        }
        self.inner.vertex(id)
    }

    fn edges(&self, id: &VertexId, labels: &[&str], direction: Direction) -> AccessResult<Vec<Edge>> {
        if self.fail_edges {
            return Err(GraphAccessError::MalformedQuery(format!("edges of {}", id)));
        }
        self.inner.edges(id, labels, direction)
    }
}

#[test]
fn test_edge_failure_degrades_to_lineage_not_found() {
    let service = LineageService::new(FlakyGraph {
        inner: warehouse(),
        fail_lookup: false,
        fail_edges: true,
        hidden: &[],
    });

    for scope in [Scope::EndToEnd, Scope::UltimateSource, Scope::UltimateDestination, Scope::Vertical] {
        let guid = if scope == Scope::Vertical { "g-term-customer" } else { "g-report" };
        assert_eq!(
            service.lineage(scope, guid, "", true).unwrap_err(),
            LineageError::lineage_not_found(guid)
        );
    }

    // Entity details never touch edges
    assert_eq!(service.entity_details("g-report").unwrap().display_name, "Revenue Report");
}

#[test]
fn test_lookup_failure_outcomes() {
    let service = LineageService::new(FlakyGraph {
        inner: warehouse(),
        fail_lookup: true,
        fail_edges: false,
        hidden: &[],
    });

    assert_eq!(
        service.lineage(Scope::EndToEnd, "g-report", "", true).unwrap_err(),
        LineageError::lineage_not_found("g-report")
    );
    assert_eq!(
        service.entity_details("g-report").unwrap_err(),
        LineageError::entity_not_found("g-report")
    );
}

#[test]
fn test_unreadable_classification_is_skipped() {
    let service = LineageService::new(FlakyGraph::hiding(&["cls_incomplete"]));
    let result = service.lineage(Scope::EndToEnd, "g-col-report-customer", "", true).unwrap();

    assert_eq!(sorted_ids(&result), vec!["c_customer_id", "c_report_customer", "fc_customer"]);
    assert_eq!(result.edges.len(), 2);
    assert!(result.dangling_edges().is_empty());
}

#[test]
fn test_unreadable_vertex_mid_walk_is_skipped() {
    let service = LineageService::new(FlakyGraph::hiding(&["p_etl"]));
    let result = service.lineage(Scope::EndToEnd, "g-report", "", true).unwrap();

    // Upstream of the report is only reachable through the ETL process
    assert_eq!(sorted_ids(&result), vec!["f_export", "t_report"]);
    assert_eq!(
        result.edges,
        HashSet::from([LineageEdge::new(TABLE_DATA_FLOW, "t_report", "f_export")])
    );
}

#[test]
fn test_unreadable_neighbour_is_skipped_in_vertical() {
    let service = LineageService::new(FlakyGraph::hiding(&["term_client"]));
    let result = service.lineage(Scope::Vertical, "g-term-customer", "", true).unwrap();

    assert!(result.vertex("term_client").is_none());
    assert!(result.vertex("cls_confidential").is_some());
    assert_eq!(result.vertices.len(), 5);
    assert_eq!(result.edges.len(), 4);
    assert!(result.dangling_edges().is_empty());
}

#[test]
fn test_dot_export_of_condensed_result() {
    let result = service().lineage(Scope::UltimateSource, "g-export", "", true).unwrap();
    let dot = result.to_dot();
    assert!(dot.starts_with("digraph Lineage {"));
    assert!(dot.contains("\"condensedSource\" [label=\"Condensed\\n(condensed)\", shape=ellipse];"));
    assert!(dot.contains("\"condensedSource\" -> \"f_export\""));
}
