//! Lineage Graph
//!
//! Lineage queries over a metadata graph of data assets (tables, files,
//! columns, topics), the processes that move data between them, and the
//! glossary terms and classifications attached to them.
//!
//! ## Features
//!
//! - **End-to-end lineage**: everything upstream and downstream of an asset
//! - **Ultimate sources/destinations**: the far ends of every data-flow path,
//!   condensed through a single synthetic node
//! - **Vertical lineage**: glossary terms, classifications and owning assets
//! - **Incomplete classifications**: overlaid on every result
//! - **Pluggable storage**: any [`GraphAccess`] implementation; [`MemoryGraph`]
//!   loads JSON snapshots
//!
//! ## Usage
//!
//! ```no_run
//! use lineage_graph::{load_from_directory, LineageConfig, LineageService, Scope};
//!
//! let config = LineageConfig::load()?;
//! let graph = load_from_directory(std::path::Path::new("./snapshots"), &config.load_config())?;
//! let service = LineageService::with_config(graph, &config);
//!
//! let lineage = service.lineage(Scope::EndToEnd, "orders-guid", "", true)?;
//! println!("{}", lineage.to_dot());
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod config;
pub mod error;
pub mod graph;
pub mod lineage;
pub mod logging;
pub mod model;

pub use config::LineageConfig;
pub use error::{ErrorCode, ErrorOutcome, GraphAccessError, LineageError, Result};
pub use graph::{load_from_directory, load_from_file, Direction, Edge, GraphAccess, MemoryGraph, Vertex, VertexId};
pub use lineage::LineageService;
pub use model::{LineageEdge, LineageVertex, LineageVerticesAndEdges, Scope, VertexSet};
