//! Request validation middleware.
//!
//! Builds the [`RequestParts`] view of the request, runs the [`Orchestrator`]
//! over it (decoding the query and body only when their turn comes), and on
//! success hands the rewritten request to the next stage. On
//! failure the tagged [`ValidationFailure`] is returned as the stage's error,
//! so neither later stages nor the handler run.
//!
//! # Pipeline Position
//!
//! ```text
//! Request → ... → [Validation] → Handler
//! ```
//!
//! # What Downstream Sees
//!
//! - The validated [`RequestParts`] as both a request extension and a context
//!   extension
//! - A JSON body re-serialized from the validated value
//!
//! # Example
//!
//! ```
//! use krino_middleware::stages::ValidationMiddleware;
//! use krino_schema::{SchemaMap, ValidationOptions};
//! use serde_json::json;
//!
//! let validation = ValidationMiddleware::build(
//!     SchemaMap::new().params(json!({
//!         "type": "object",
//!         "properties": {"id": {"type": "integer"}},
//!         "required": ["id"]
//!     })),
//!     ValidationOptions::default(),
//! )
//! .unwrap();
//!
//! assert_eq!(validation.schema_map()["params"]["required"], json!(["id"]));
//! ```

use http::header::{HeaderValue, CONTENT_LENGTH};
use http_body_util::{BodyExt, Full};
use krino_core::{BoxFuture, RequestParts, ValidationFailure};
use krino_schema::{SchemaMap, SchemaRegistry, SchemaResult, ValidationOptions};
use serde_json::Value;

use crate::context::MiddlewareContext;
use crate::extract::{self, RawSegments};
use crate::middleware::{Middleware, MiddlewareResult, Next};
use crate::orchestrator::Orchestrator;
use crate::types::Request;

/// Middleware that validates request segments against compiled schemas.
#[derive(Debug, Clone)]
pub struct ValidationMiddleware {
    orchestrator: Orchestrator,
}

impl ValidationMiddleware {
    /// Compiles a schema map into a validation middleware.
    ///
    /// # Errors
    ///
    /// Returns an error if the map names an unknown segment or any schema
    /// fails to compile. No middleware is produced in that case.
    pub fn build(map: SchemaMap, options: ValidationOptions) -> SchemaResult<Self> {
        let registry = SchemaRegistry::compile(map)?;
        Ok(Self::from_registry(registry, options))
    }

    /// Compiles a schema map given as a JSON object.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a valid schema map.
    pub fn from_value(map: Value, options: ValidationOptions) -> SchemaResult<Self> {
        Self::build(SchemaMap::from_value(map)?, options)
    }

    /// Creates a validation middleware over an already compiled registry.
    #[must_use]
    pub fn from_registry(registry: SchemaRegistry, options: ValidationOptions) -> Self {
        tracing::info!(segments = ?registry.segments(), "validation middleware built");
        Self {
            orchestrator: Orchestrator::new(registry, options),
        }
    }

    /// The schema map this middleware was built from.
    #[must_use]
    pub fn schema_map(&self) -> Value {
        self.orchestrator.registry().schema_map()
    }

    /// The options handed to every engine call.
    #[must_use]
    pub fn options(&self) -> &ValidationOptions {
        self.orchestrator.options()
    }

    /// Validates already-extracted request parts in place.
    ///
    /// Useful for hosts that do not speak `http` types.
    ///
    /// # Errors
    ///
    /// Returns the first segment failure.
    pub async fn validate(&self, parts: &mut RequestParts) -> Result<(), ValidationFailure> {
        self.orchestrator.process(parts).await
    }
}

impl Middleware for ValidationMiddleware {
    fn name(&self) -> &'static str {
        "request_validation"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, MiddlewareResult> {
        Box::pin(async move {
            let (mut head, body) = request.into_parts();
            // `Full` cannot fail to collect.
            let bytes = match body.collect().await {
                Ok(collected) => collected.to_bytes(),
                Err(never) => match never {},
            };

            let parse_body = self.orchestrator.validates_body(&head.method);
            let raw = RawSegments::new(&head, &bytes, parse_body);
            let kind = raw.kind();
            let mut parts = extract::request_parts(&head);

            let outcome = self
                .orchestrator
                .process_with(&mut parts, |segment, parts| raw.decode(segment, parts))
                .await;
            if let Err(failure) = outcome {
                tracing::warn!(
                    request_id = %ctx.request_id(),
                    source = %failure.source_segment(),
                    keys = ?failure.keys(),
                    "request validation failed"
                );
                return Err(failure.into());
            }

            let body = if parse_body {
                extract::body_bytes(kind, &parts, bytes)
            } else {
                bytes
            };
            if head.headers.contains_key(CONTENT_LENGTH) {
                head.headers
                    .insert(CONTENT_LENGTH, HeaderValue::from(body.len()));
            }

            head.extensions.insert(parts.clone());
            ctx.set_extension(parts);

            let request = Request::from_parts(head, Full::new(body));
            next.run(ctx, request).await
        })
    }
}
