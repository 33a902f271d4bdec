//! Fixed-order validation of every request segment.

use std::sync::Arc;

use http::Method;
use krino_core::{RequestParts, Segment, ValidationFailure};
use krino_schema::{SchemaRegistry, ValidationOptions};
use tracing::debug;

use crate::validator::SegmentValidator;

/// Returns true when requests with this method never have their body
/// validated. The comparison ignores ASCII case.
///
/// # Example
///
/// ```
/// use http::Method;
/// use krino_middleware::skips_body;
///
/// assert!(skips_body(&Method::GET));
/// assert!(skips_body(&Method::from_bytes(b"head").unwrap()));
/// assert!(!skips_body(&Method::POST));
/// ```
#[must_use]
pub fn skips_body(method: &Method) -> bool {
    let method = method.as_str();
    method.eq_ignore_ascii_case("GET") || method.eq_ignore_ascii_case("HEAD")
}

/// Validates segments in the order `headers`, `params`, `query`, `body`.
///
/// Each segment completes, including any suspension inside its engine, before
/// the next one starts. The first failure ends the run; later segments are not
/// validated and keep their raw values.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    registry: Arc<SchemaRegistry>,
    options: Arc<ValidationOptions>,
}

impl Orchestrator {
    /// Creates an orchestrator over a compiled registry.
    #[must_use]
    pub fn new(registry: SchemaRegistry, options: ValidationOptions) -> Self {
        Self {
            registry: Arc::new(registry),
            options: Arc::new(options),
        }
    }

    /// The compiled schemas.
    #[must_use]
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// The options handed to every engine call.
    #[must_use]
    pub fn options(&self) -> &ValidationOptions {
        &self.options
    }

    /// Returns true if a request with `method` will have its body validated.
    #[must_use]
    pub fn validates_body(&self, method: &Method) -> bool {
        self.registry.contains(Segment::Body) && !skips_body(method)
    }

    /// Validates every configured segment of `parts`, rewriting each with the
    /// engine's output.
    ///
    /// # Errors
    ///
    /// Returns the first segment failure.
    pub async fn process(&self, parts: &mut RequestParts) -> Result<(), ValidationFailure> {
        self.process_with(parts, |_, _| Ok(())).await
    }

    /// Like [`process`](Self::process), but calls `decode` to populate each
    /// segment right before it is validated.
    ///
    /// A segment that is never reached is never decoded, so a malformed body
    /// cannot mask a failure in an earlier segment. `decode` is not called
    /// for a skipped body.
    ///
    /// # Errors
    ///
    /// Returns the first failure, whether it came from `decode` or from
    /// validation.
    pub async fn process_with<F>(
        &self,
        parts: &mut RequestParts,
        mut decode: F,
    ) -> Result<(), ValidationFailure>
    where
        F: FnMut(Segment, &mut RequestParts) -> Result<(), ValidationFailure>,
    {
        let validator = SegmentValidator::new(&self.registry, &self.options);

        for segment in Segment::ALL {
            if segment == Segment::Body && skips_body(parts.method()) {
                debug!(method = %parts.method(), "body validation skipped");
                continue;
            }
            decode(segment, parts)?;
            validator.validate(segment, parts).await?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use krino_core::EngineFailure;
    use krino_schema::{CompiledSchema, EngineOutcome, FnEngine, SchemaMap};
    use serde_json::{json, Value};

    fn reject(message: &'static str) -> CompiledSchema {
        Arc::new(FnEngine::new(move |_value: Option<&Value>, _options: &ValidationOptions| {
            EngineOutcome::invalid(None, EngineFailure::new(message))
        }))
    }

    fn orchestrator(map: SchemaMap) -> Orchestrator {
        Orchestrator::new(SchemaRegistry::compile(map).unwrap(), ValidationOptions::default())
    }

    #[test]
    fn test_skips_body() {
        assert!(skips_body(&Method::GET));
        assert!(skips_body(&Method::HEAD));
        assert!(skips_body(&Method::from_bytes(b"get").unwrap()));
        assert!(!skips_body(&Method::POST));
        assert!(!skips_body(&Method::DELETE));
    }

    #[tokio::test]
    async fn test_first_failure_wins() {
        let orchestrator = orchestrator(
            SchemaMap::new()
                .engine(Segment::Headers, reject("bad headers"))
                .engine(Segment::Body, reject("bad body")),
        );
        let mut parts = RequestParts::new(Method::POST);

        let failure = orchestrator.process(&mut parts).await.unwrap_err();
        assert_eq!(failure.source_segment(), Segment::Headers);
        assert_eq!(failure.message(), "bad headers");
    }

    #[tokio::test]
    async fn test_body_skipped_for_get() {
        let orchestrator = orchestrator(SchemaMap::new().engine(Segment::Body, reject("bad body")));

        let mut get = RequestParts::new(Method::GET).with_segment(Segment::Body, json!("x"));
        orchestrator.process(&mut get).await.unwrap();

        let mut post = RequestParts::new(Method::POST).with_segment(Segment::Body, json!("x"));
        let failure = orchestrator.process(&mut post).await.unwrap_err();
        assert_eq!(failure.source_segment(), Segment::Body);
    }

    #[tokio::test]
    async fn test_later_segments_untouched_after_failure() {
        let orchestrator = orchestrator(
            SchemaMap::new()
                .engine(Segment::Params, reject("bad params"))
                .query(json!({"type": "object", "properties": {"n": {"type": "integer"}}})),
        );
        let mut parts =
            RequestParts::new(Method::GET).with_segment(Segment::Query, json!({"n": "5"}));

        orchestrator.process(&mut parts).await.unwrap_err();
        assert_eq!(parts.query(), Some(&json!({"n": "5"})));
    }

    #[tokio::test]
    async fn test_decode_runs_in_order_and_stops_at_first_failure() {
        let orchestrator = orchestrator(
            SchemaMap::new()
                .headers(json!({"type": "object", "required": ["x-api-key"]}))
                .body(json!({"type": "object"})),
        );
        let mut parts = RequestParts::new(Method::POST).with_segment(Segment::Headers, json!({}));
        let mut decoded = Vec::new();

        let failure = orchestrator
            .process_with(&mut parts, |segment, _| {
                decoded.push(segment);
                if segment == Segment::Body {
                    return Err(ValidationFailure::tagged(
                        EngineFailure::new("invalid JSON body"),
                        Segment::Body,
                    ));
                }
                Ok(())
            })
            .await
            .unwrap_err();

        assert_eq!(failure.source_segment(), Segment::Headers);
        assert_eq!(decoded, vec![Segment::Headers]);
    }

    #[tokio::test]
    async fn test_decode_not_called_for_skipped_body() {
        let orchestrator = orchestrator(SchemaMap::new().body(json!({"type": "object"})));
        let mut parts = RequestParts::new(Method::GET);
        let mut decoded = Vec::new();

        orchestrator
            .process_with(&mut parts, |segment, _| {
                decoded.push(segment);
                Ok(())
            })
            .await
            .unwrap();

        assert_eq!(decoded, vec![Segment::Headers, Segment::Params, Segment::Query]);
    }

    #[test]
    fn test_validates_body() {
        let with_body = orchestrator(SchemaMap::new().body(json!({"type": "object"})));
        assert!(with_body.validates_body(&Method::POST));
        assert!(!with_body.validates_body(&Method::GET));

        let without_body = orchestrator(SchemaMap::new());
        assert!(!without_body.validates_body(&Method::POST));
    }
}
