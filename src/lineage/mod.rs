//! Lineage Query Engine
//!
//! ```text
//! guid ─► LineageService::lineage
//!           │ vertex_by_guid
//!           ▼
//!         TraversalEngine ──► raw Subgraph
//!           ▼
//!         normalize (process bridging)
//!           ▼
//!         condense (ultimate scopes only)
//!           ▼
//!         add_column_properties / add_incomplete_classifications
//!           ▼
//!         filter_by_display_name
//! ```

pub mod condense;
pub mod filter;
pub mod normalize;
pub mod service;
pub mod traversal;

pub use condense::{condense, CondensationKind};
pub use filter::filter_by_display_name;
pub use normalize::{add_column_properties, add_incomplete_classifications, normalize};
pub use service::LineageService;
pub use traversal::TraversalEngine;
