//! Schema error types.

use krino_core::{Segment, UnknownSegment};
use thiserror::Error;

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors raised while building schemas. All of them happen at
/// configuration time, never while handling a request.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The schema map names a segment that does not exist.
    #[error(transparent)]
    UnknownSegment(#[from] UnknownSegment),

    /// The schema map does not have the expected shape.
    #[error("invalid schema map: {reason}")]
    InvalidSchemaMap {
        /// What is wrong with the map.
        reason: String,
    },

    /// A schema definition could not be compiled.
    #[error("invalid schema definition: {reason}")]
    InvalidDefinition {
        /// The engine's compile error.
        reason: String,
    },

    /// A segment's schema definition could not be compiled.
    #[error("invalid schema for segment '{segment}': {reason}")]
    Compile {
        /// The segment whose schema failed.
        segment: Segment,
        /// The engine's compile error.
        reason: String,
    },
}

impl SchemaError {
    /// Create an invalid schema map error.
    pub fn invalid_schema_map(reason: impl Into<String>) -> Self {
        Self::InvalidSchemaMap {
            reason: reason.into(),
        }
    }

    /// Create an invalid definition error.
    pub fn invalid_definition(reason: impl Into<String>) -> Self {
        Self::InvalidDefinition {
            reason: reason.into(),
        }
    }
}
