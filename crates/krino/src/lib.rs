//! # Krino
//!
//! **Schema-driven validation of HTTP request headers, params, query and body.**
//!
//! - Each request segment gets its own schema
//! - Segments are validated in order (`headers`, `params`, `query`, `body`),
//!   stopping at the first failure
//! - `GET` and `HEAD` bodies are never validated
//! - Validated (coerced, defaulted, stripped) values replace the raw ones
//! - Failures become a stable 400 JSON payload naming the segment and fields
//!
//! ## Quick Start
//!
//! ```
//! use krino::json;
//! use krino::middleware::{MiddlewareContext, Pipeline};
//!
//! # fn main() -> Result<(), krino::KrinoError> {
//! let validation = krino::build(
//!     krino::SchemaMap::new()
//!         .params(json!({
//!             "type": "object",
//!             "properties": {"id": {"type": "integer"}},
//!             "required": ["id"]
//!         }))
//!         .body(json!({
//!             "type": "object",
//!             "properties": {"name": {"type": "string"}},
//!             "required": ["name"]
//!         })),
//!     None,
//! )?;
//!
//! let pipeline = Pipeline::builder()
//!     .add_stage(validation)
//!     .add_error_handler(krino::errors())
//!     .build();
//! # let _ = (pipeline, MiddlewareContext::new());
//! # Ok(())
//! # }
//! ```
//!
//! ## Failure Payload
//!
//! ```json
//! {
//!   "statusCode": 400,
//!   "error": "Bad Request",
//!   "message": "\"name\" is a required property",
//!   "validation": { "source": "body", "keys": ["name"] }
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/krino/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;

pub use error::{KrinoError, KrinoResult};

// Re-export core types
pub use krino_core as core;
pub use krino_core::{ErrorResponse, RequestParts, Segment, ValidationFailure};

// Re-export schema types
pub use krino_schema::{SchemaEngine, SchemaMap, SchemaRegistry, ValidationOptions};

// Re-export middleware types
pub use krino_middleware as middleware;
pub use krino_middleware::{PathParams, ValidationErrorHandler, ValidationMiddleware};

// Re-export configuration and logging
pub use krino_config as config;
pub use krino_telemetry as telemetry;

/// The schema-construction API, passed through unchanged.
///
/// ```
/// let validator = krino::schema::validator_for(&krino::json!({"type": "string"})).unwrap();
/// assert!(validator.is_valid(&krino::json!("hello")));
/// ```
pub use krino_schema::jsonschema as schema;

pub use serde_json::json;

use krino_config::KrinoConfig;

/// Compiles a schema map into the validation middleware.
///
/// `options` is forwarded verbatim to every engine call; `None` uses
/// [`ValidationOptions::default`].
///
/// # Errors
///
/// Returns [`KrinoError::Schema`] if the map is malformed or any schema fails
/// to compile.
pub fn build(
    schema_map: SchemaMap,
    options: Option<ValidationOptions>,
) -> KrinoResult<ValidationMiddleware> {
    Ok(ValidationMiddleware::build(
        schema_map,
        options.unwrap_or_default(),
    )?)
}

/// Compiles an untyped schema map, such as one read from a file.
///
/// # Errors
///
/// Returns [`KrinoError::Schema`] if the value is not an object keyed by
/// segment names, or any schema fails to compile.
///
/// # Example
///
/// ```
/// use krino::json;
///
/// assert!(krino::build_from_value(json!({"query": {"type": "object"}}), None).is_ok());
/// assert!(krino::build_from_value(json!({"cookies": {}}), None).is_err());
/// ```
pub fn build_from_value(
    schema_map: serde_json::Value,
    options: Option<ValidationOptions>,
) -> KrinoResult<ValidationMiddleware> {
    Ok(ValidationMiddleware::from_value(
        schema_map,
        options.unwrap_or_default(),
    )?)
}

/// Builds the validation middleware from loaded configuration.
///
/// # Errors
///
/// Returns an error if the configured schema map is invalid.
pub fn from_config(config: &KrinoConfig) -> KrinoResult<ValidationMiddleware> {
    let registry = config.schema_registry()?;
    Ok(ValidationMiddleware::from_registry(
        registry,
        config.validation.clone(),
    ))
}

/// Installs the logging subscriber described by the configuration.
///
/// # Errors
///
/// Returns an error if the filter is invalid or a subscriber is already set.
pub fn init_logging(config: &KrinoConfig) -> KrinoResult<()> {
    krino_telemetry::init_logging(&config.log_config())?;
    Ok(())
}

/// The error handler that renders validation failures as 400 responses and
/// passes every other error on unchanged.
#[must_use]
pub fn errors() -> ValidationErrorHandler {
    ValidationErrorHandler::new()
}
