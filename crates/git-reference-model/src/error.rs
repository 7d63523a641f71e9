//! Error types for reference parsing.

use git_object_model::ObjectParseError;
use thiserror::Error;

/// Malformed `git for-each-ref` output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceParseError {
    #[error("reference record {line} is malformed: expected {expected} fields, found {found}")]
    FieldCount {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("reference record {line} has an invalid object id: {source}")]
    ObjectId {
        line: usize,
        #[source]
        source: ObjectParseError,
    },

    #[error("reference record {line} has unknown object type '{value}'")]
    ObjectType { line: usize, value: String },

    #[error("reference record {line} has an empty name")]
    EmptyName { line: usize },
}

impl ReferenceParseError {
    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::FieldCount { .. } => "reference_field_count",
            Self::ObjectId { .. } => "reference_object_id",
            Self::ObjectType { .. } => "reference_object_type",
            Self::EmptyName { .. } => "reference_empty_name",
        }
    }

    /// Zero-based record index the error refers to.
    pub fn line(&self) -> usize {
        match self {
            Self::FieldCount { line, .. }
            | Self::ObjectId { line, .. }
            | Self::ObjectType { line, .. }
            | Self::EmptyName { line } => *line,
        }
    }
}

/// Result type for reference parsing.
pub type ReferenceResult<T> = Result<T, ReferenceParseError>;
