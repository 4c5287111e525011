//! Label Catalog
//!
//! Vertex labels, edge labels and property keys understood by the lineage
//! engine, plus the immutable table that maps a vertex label to the edge
//! labels carrying data flow for it.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

// --- Vertex labels ---

pub const RELATIONAL_TABLE: &str = "RelationalTable";
pub const RELATIONAL_COLUMN: &str = "RelationalColumn";
pub const TABULAR_COLUMN: &str = "TabularColumn";
pub const TABULAR_FILE_COLUMN: &str = "TabularFileColumn";
pub const EVENT_SCHEMA_ATTRIBUTE: &str = "EventSchemaAttribute";
pub const DATA_FILE: &str = "DataFile";
pub const CSV_FILE: &str = "CSVFile";
pub const AVRO_FILE: &str = "AvroFile";
pub const JSON_FILE: &str = "JSONFile";
pub const KAFKA_TOPIC: &str = "KafkaTopic";
pub const PROCESS: &str = "Process";
pub const GLOSSARY_TERM: &str = "GlossaryTerm";
pub const INCOMPLETE: &str = "Incomplete";
pub const CONDENSED: &str = "condensed";

// --- Edge labels ---

pub const COLUMN_DATA_FLOW: &str = "ColumnDataFlow";
pub const TABLE_DATA_FLOW: &str = "TableDataFlow";
pub const LINEAGE_MAPPING: &str = "LineageMapping";
pub const SEMANTIC_ASSIGNMENT: &str = "SemanticAssignment";
pub const RELATED_TERM: &str = "RelatedTerm";
pub const CLASSIFICATION: &str = "Classification";
pub const ASSET_SCHEMA_TYPE: &str = "AssetSchemaType";
pub const ATTRIBUTE_FOR_SCHEMA: &str = "AttributeForSchema";

// --- Property keys ---

pub const PROPERTY_GUID: &str = "guid";
pub const PROPERTY_DISPLAY_NAME: &str = "displayName";
pub const PROPERTY_QUALIFIED_NAME: &str = "qualifiedName";
pub const PROPERTY_TABLE_GUID: &str = "tableGuid";
pub const PROPERTY_TABLE_DISPLAY_NAME: &str = "tableDisplayName";
pub const PROPERTY_TABLE_QUALIFIED_NAME: &str = "tableQualifiedName";

/// Column-like vertex labels (use column data flow, receive column properties)
pub const COLUMN_LABELS: &[&str] = &[
    RELATIONAL_COLUMN,
    TABULAR_COLUMN,
    TABULAR_FILE_COLUMN,
    EVENT_SCHEMA_ATTRIBUTE,
];

/// Table, file and topic labels (use table data flow)
pub const DATASET_LABELS: &[&str] = &[
    RELATIONAL_TABLE,
    DATA_FILE,
    CSV_FILE,
    AVRO_FILE,
    JSON_FILE,
    KAFKA_TOPIC,
];

/// Edges from an owning asset (or its schema) down to a column
pub const COLUMN_OWNER_EDGES: &[&str] = &[ATTRIBUTE_FOR_SCHEMA, ASSET_SCHEMA_TYPE];

static ASSET_LABELS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    DATASET_LABELS
        .iter()
        .copied()
        .chain(std::iter::once(PROCESS))
        .collect()
});

static EDGE_LABEL_SETS: LazyLock<HashMap<&'static str, Vec<&'static str>>> =
    LazyLock::new(|| {
        let mut table: HashMap<&'static str, Vec<&'static str>> = HashMap::new();

        for &label in COLUMN_LABELS {
            table.insert(label, vec![COLUMN_DATA_FLOW]);
        }
        for &label in DATASET_LABELS {
            table.insert(label, vec![TABLE_DATA_FLOW]);
        }
        table.insert(PROCESS, vec![TABLE_DATA_FLOW, COLUMN_DATA_FLOW]);

        for (label, edges) in table.iter_mut() {
            if ASSET_LABELS.contains(label) {
                edges.push(LINEAGE_MAPPING);
            }
        }
        table
    });

/// Edge labels that represent data flow for a vertex label.
///
/// `None` means the vertex category does not take part in data-flow lineage.
pub fn edge_label_set(vertex_label: &str) -> Option<&'static [&'static str]> {
    EDGE_LABEL_SETS.get(vertex_label).map(Vec::as_slice)
}

pub fn is_asset(vertex_label: &str) -> bool {
    ASSET_LABELS.contains(vertex_label)
}

pub fn is_column(vertex_label: &str) -> bool {
    COLUMN_LABELS.iter().any(|label| *label == vertex_label)
}

pub fn is_process(vertex_label: &str) -> bool {
    vertex_label == PROCESS
}
