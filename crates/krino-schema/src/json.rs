//! JSON Schema engine.

use jsonschema::error::ValidationErrorKind;
use jsonschema::{Draft, Validator};
use krino_core::{BoxFuture, EngineFailure, FailureDetail, PathKey};
use serde_json::Value;
use std::fmt;

use crate::engine::{EngineOutcome, SchemaEngine};
use crate::error::{SchemaError, SchemaResult};
use crate::options::ValidationOptions;
use crate::transform;

/// A JSON Schema compiled once and reused for every request.
///
/// Before checking, the value is transformed according to the
/// [`ValidationOptions`]: defaults are filled, string scalars are coerced to
/// the declared type, and undeclared keys are optionally stripped. The
/// transformed value is returned whether or not it passes.
///
/// # Example
///
/// ```
/// use krino_schema::{JsonSchemaEngine, ValidationOptions};
/// use serde_json::json;
///
/// let engine = JsonSchemaEngine::compile(json!({
///     "type": "object",
///     "properties": {"page": {"type": "integer", "default": 1}}
/// }))
/// .unwrap();
///
/// let outcome = engine.evaluate(Some(&json!({})), &ValidationOptions::default());
/// assert!(outcome.is_valid());
/// assert_eq!(outcome.value, Some(json!({"page": 1})));
/// ```
pub struct JsonSchemaEngine {
    definition: Value,
    validator: Validator,
}

impl fmt::Debug for JsonSchemaEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonSchemaEngine")
            .field("definition", &self.definition)
            .finish_non_exhaustive()
    }
}

impl JsonSchemaEngine {
    /// Draft used by [`compile`](Self::compile).
    pub const DEFAULT_DRAFT: Draft = Draft::Draft7;

    /// Compiles a schema definition using Draft 7.
    pub fn compile(definition: Value) -> SchemaResult<Self> {
        Self::compile_with_draft(definition, Self::DEFAULT_DRAFT)
    }

    /// Compiles a schema definition against a specific draft.
    pub fn compile_with_draft(definition: Value, draft: Draft) -> SchemaResult<Self> {
        let mut opts = jsonschema::options();
        opts.with_draft(draft);

        let validator = opts
            .build(&definition)
            .map_err(|e| SchemaError::invalid_definition(e.to_string()))?;

        Ok(Self {
            definition,
            validator,
        })
    }

    /// Transforms and checks a value synchronously.
    #[must_use]
    pub fn evaluate(&self, value: Option<&Value>, options: &ValidationOptions) -> EngineOutcome {
        let transformed = transform::apply(&self.definition, value.cloned(), options);

        match transformed.as_ref().and_then(|v| self.check(v, options)) {
            Some(failure) => EngineOutcome::invalid(transformed, failure),
            None => EngineOutcome::valid(transformed),
        }
    }

    fn check(&self, instance: &Value, options: &ValidationOptions) -> Option<EngineFailure> {
        let limit = if options.abort_early { 1 } else { usize::MAX };

        let details: Vec<FailureDetail> = self
            .validator
            .iter_errors(instance)
            .take(limit)
            .map(|error| {
                let mut path = pointer_keys(&error.instance_path.to_string());
                if let ValidationErrorKind::Required { property } = &error.kind {
                    if let Some(name) = property.as_str() {
                        path.push(PathKey::from(name));
                    }
                }
                FailureDetail::new(error.to_string(), path)
            })
            .collect();

        if details.is_empty() {
            None
        } else {
            Some(EngineFailure::from_details(details))
        }
    }
}

impl SchemaEngine for JsonSchemaEngine {
    fn validate<'a>(
        &'a self,
        value: Option<&'a Value>,
        options: &'a ValidationOptions,
    ) -> BoxFuture<'a, EngineOutcome> {
        Box::pin(async move { self.evaluate(value, options) })
    }

    fn definition(&self) -> Option<&Value> {
        Some(&self.definition)
    }
}

/// Splits a JSON pointer (`/items/0/sku`) into path keys.
fn pointer_keys(pointer: &str) -> Vec<PathKey> {
    pointer
        .split('/')
        .skip(1)
        .map(|token| {
            let key = token.replace("~1", "/").replace("~0", "~");
            match key.parse::<usize>() {
                Ok(index) => PathKey::Index(index),
                Err(_) => PathKey::Key(key),
            }
        })
        .collect()
}
