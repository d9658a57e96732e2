//! Error types for row ingestion and aggregate queries.
//!
//! Whole-source failures (unreadable files, missing columns) are reported
//! through `anyhow` by the loader. The enums here cover the recoverable,
//! per-row and per-query cases.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reason a single input row was rejected during ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowError {
    /// A required field was empty or null.
    #[error("missing required field '{field}'")]
    MissingField { field: String },

    /// A timestamp field could not be parsed with any supported format.
    #[error("unparsable timestamp in '{field}': '{value}'")]
    InvalidTimestamp { field: String, value: String },

    /// A numeric field held a value that is not a finite number.
    #[error("invalid number in '{field}'")]
    InvalidNumber { field: String },

    /// Transport mode matched a configured placeholder value.
    #[error("excluded transport mode '{value}'")]
    ExcludedTransportMode { value: String },
}

impl RowError {
    /// Short stable label used when tallying rejections.
    pub fn kind(&self) -> &'static str {
        match self {
            RowError::MissingField { .. } => "missing field",
            RowError::InvalidTimestamp { .. } => "invalid timestamp",
            RowError::InvalidNumber { .. } => "invalid number",
            RowError::ExcludedTransportMode { .. } => "excluded transport mode",
        }
    }

    /// Excluded rows are filtered on purpose; everything else is malformed input.
    pub fn is_exclusion(&self) -> bool {
        matches!(self, RowError::ExcludedTransportMode { .. })
    }
}

/// Errors raised for query shapes the aggregator cannot answer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("hierarchy path must have 2 to 4 levels, got {0}")]
    InvalidHierarchyDepth(usize),

    #[error("mean aggregates cannot be rolled up into a hierarchy")]
    MeanInHierarchy,

    #[error("grouping requires at least one dimension")]
    EmptyGrouping,

    #[error("unknown field '{name}'. Available fields: {available}")]
    UnknownField { name: String, available: String },
}
