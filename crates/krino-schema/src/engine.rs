//! The schema engine seam.
//!
//! An engine takes the current value of one request segment and returns the
//! (possibly transformed) value together with an optional failure. The call
//! is a future, so an engine may suspend (offload work, call a remote
//! service) and still resolves exactly once.

use krino_core::{BoxFuture, EngineFailure};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::options::ValidationOptions;

/// A compiled schema, shareable across concurrently handled requests.
pub type CompiledSchema = Arc<dyn SchemaEngine>;

/// Result of running an engine against one segment.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineOutcome {
    /// The engine's output value. `None` means the engine produced nothing
    /// and the segment must be left as it was.
    pub value: Option<Value>,
    /// The rejection, if the value did not satisfy the schema.
    pub failure: Option<EngineFailure>,
}

impl EngineOutcome {
    /// A passing outcome.
    #[must_use]
    pub fn valid(value: Option<Value>) -> Self {
        Self {
            value,
            failure: None,
        }
    }

    /// A failing outcome. `value` is still written back when present.
    #[must_use]
    pub fn invalid(value: Option<Value>, failure: EngineFailure) -> Self {
        Self {
            value,
            failure: Some(failure),
        }
    }

    /// Returns true if no failure was reported.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.failure.is_none()
    }
}

/// An executable schema for one request segment.
///
/// # Example
///
/// ```
/// use krino_core::{BoxFuture, EngineFailure};
/// use krino_schema::{EngineOutcome, SchemaEngine, ValidationOptions};
/// use serde_json::Value;
///
/// struct RejectEverything;
///
/// impl SchemaEngine for RejectEverything {
///     fn validate<'a>(
///         &'a self,
///         value: Option<&'a Value>,
///         _options: &'a ValidationOptions,
///     ) -> BoxFuture<'a, EngineOutcome> {
///         Box::pin(async move {
///             EngineOutcome::invalid(value.cloned(), EngineFailure::new("rejected"))
///         })
///     }
/// }
/// ```
pub trait SchemaEngine: Send + Sync + 'static {
    /// Validates a segment value.
    ///
    /// `value` is `None` when the request did not carry the segment.
    fn validate<'a>(
        &'a self,
        value: Option<&'a Value>,
        options: &'a ValidationOptions,
    ) -> BoxFuture<'a, EngineOutcome>;

    /// The definition this engine was compiled from, if it has one.
    fn definition(&self) -> Option<&Value> {
        None
    }
}

/// An engine backed by a synchronous closure.
///
/// # Example
///
/// ```
/// use krino_core::EngineFailure;
/// use krino_schema::{EngineOutcome, FnEngine};
///
/// let non_empty = FnEngine::new(|value, _options| match value {
///     Some(v) if !v.is_null() => EngineOutcome::valid(Some(v.clone())),
///     _ => EngineOutcome::invalid(None, EngineFailure::new("value is required")),
/// });
/// # let _ = non_empty;
/// ```
pub struct FnEngine<F> {
    func: F,
}

impl<F> FnEngine<F>
where
    F: Fn(Option<&Value>, &ValidationOptions) -> EngineOutcome + Send + Sync + 'static,
{
    /// Creates an engine from a closure.
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> fmt::Debug for FnEngine<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnEngine").finish_non_exhaustive()
    }
}

impl<F> SchemaEngine for FnEngine<F>
where
    F: Fn(Option<&Value>, &ValidationOptions) -> EngineOutcome + Send + Sync + 'static,
{
    fn validate<'a>(
        &'a self,
        value: Option<&'a Value>,
        options: &'a ValidationOptions,
    ) -> BoxFuture<'a, EngineOutcome> {
        Box::pin(async move { (self.func)(value, options) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_fn_engine_passes_value_and_options() {
        let engine = FnEngine::new(|value: Option<&Value>, options: &ValidationOptions| {
            let mut out = value.cloned().unwrap_or_else(|| json!({}));
            out["strip"] = json!(options.strip_unknown);
            EngineOutcome::valid(Some(out))
        });

        let options = ValidationOptions::default().strip_unknown(true);
        let input = json!({"a": 1});
        let outcome = engine.validate(Some(&input), &options).await;

        assert!(outcome.is_valid());
        assert_eq!(outcome.value, Some(json!({"a": 1, "strip": true})));
        assert!(engine.definition().is_none());
    }

    #[test]
    fn test_outcome_constructors() {
        let ok = EngineOutcome::valid(None);
        assert!(ok.is_valid());

        let bad = EngineOutcome::invalid(Some(json!(1)), EngineFailure::new("nope"));
        assert!(!bad.is_valid());
        assert_eq!(bad.value, Some(json!(1)));
    }
}
