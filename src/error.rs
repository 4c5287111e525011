//! Error types for lineage queries and graph access

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for lineage operations
pub type Result<T> = std::result::Result<T, LineageError>;

/// Public outcomes of a lineage query that are not a success.
///
/// Both variants are terminal and user visible. Graph access failures are
/// folded into one of these before they leave the crate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LineageError {
    #[error("Entity not found: {guid}")]
    EntityNotFound { guid: String },

    #[error("Lineage not found for entity: {guid}")]
    LineageNotFound { guid: String },
}

impl LineageError {
    pub fn entity_not_found(guid: impl Into<String>) -> Self {
        Self::EntityNotFound { guid: guid.into() }
    }

    pub fn lineage_not_found(guid: impl Into<String>) -> Self {
        Self::LineageNotFound { guid: guid.into() }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::EntityNotFound { .. } => ErrorCode::EntityNotFound,
            Self::LineageNotFound { .. } => ErrorCode::LineageNotFound,
        }
    }

    pub fn guid(&self) -> &str {
        match self {
            Self::EntityNotFound { guid } | Self::LineageNotFound { guid } => guid,
        }
    }
}

/// Stable code of a failed outcome, for transport layers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    EntityNotFound,
    LineageNotFound,
}

/// Serializable form of a [`LineageError`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorOutcome {
    pub code: ErrorCode,
    pub guid: String,
    pub message: String,
}

impl From<&LineageError> for ErrorOutcome {
    fn from(err: &LineageError) -> Self {
        Self {
            code: err.code(),
            guid: err.guid().to_string(),
            message: err.to_string(),
        }
    }
}

impl From<LineageError> for ErrorOutcome {
    fn from(err: LineageError) -> Self {
        Self::from(&err)
    }
}

/// Failures raised by a [`GraphAccess`](crate::graph::GraphAccess) implementation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphAccessError {
    #[error("Graph store unavailable: {0}")]
    Unavailable(String),

    #[error("Malformed graph query: {0}")]
    MalformedQuery(String),

    #[error("Vertex {0} could not be materialized")]
    MissingVertex(String),
}
