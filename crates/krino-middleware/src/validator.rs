//! Validation of a single request segment.

use krino_core::{RequestParts, Segment, ValidationFailure};
use krino_schema::{SchemaRegistry, ValidationOptions};
use tracing::{debug, trace};

/// Runs one segment's schema against the request and writes the result back.
///
/// # Behavior
///
/// - No schema for the segment: succeeds without touching the request
/// - The engine returns a value: the segment is overwritten with it, even
///   when validation failed
/// - The engine returns no value: the segment is left as it was
/// - The engine reports a failure: it is returned tagged with the segment
#[derive(Debug, Clone, Copy)]
pub struct SegmentValidator<'a> {
    registry: &'a SchemaRegistry,
    options: &'a ValidationOptions,
}

impl<'a> SegmentValidator<'a> {
    /// Creates a validator over a compiled registry.
    #[must_use]
    pub fn new(registry: &'a SchemaRegistry, options: &'a ValidationOptions) -> Self {
        Self { registry, options }
    }

    /// Validates `segment` of `parts`.
    ///
    /// # Errors
    ///
    /// Returns the engine's failure tagged with `segment`.
    pub async fn validate(
        &self,
        segment: Segment,
        parts: &mut RequestParts,
    ) -> Result<(), ValidationFailure> {
        let Some(schema) = self.registry.get(segment) else {
            trace!(segment = %segment, "no schema, skipping");
            return Ok(());
        };

        let outcome = schema.validate(parts.segment(segment), self.options).await;

        if let Some(value) = outcome.value {
            parts.set_segment(segment, value);
        }

        match outcome.failure {
            None => {
                debug!(segment = %segment, "segment valid");
                Ok(())
            }
            Some(failure) => {
                debug!(segment = %segment, message = %failure.message, "segment invalid");
                Err(ValidationFailure::tagged(failure, segment))
            }
        }
    }
}
