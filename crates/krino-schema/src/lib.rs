//! # Krino Schema
//!
//! Schema engines and the schema registry.
//!
//! The validation core treats the schema language as an external collaborator
//! reached through the [`SchemaEngine`] trait. This crate provides:
//!
//! - [`SchemaEngine`] - The seam every engine implements
//! - [`JsonSchemaEngine`] - A JSON Schema engine (via the `jsonschema` crate)
//!   that also applies defaults, type coercion and key stripping
//! - [`FnEngine`] - An engine built from a closure
//! - [`ValidationOptions`] - The options bag forwarded to every engine call
//! - [`SchemaMap`] / [`SchemaRegistry`] - Per-segment schema definitions and
//!   their compiled form, checked against the legal segment names
//!
//! ## Example
//!
//! ```
//! use krino_schema::{SchemaMap, SchemaRegistry};
//! use krino_core::Segment;
//! use serde_json::json;
//!
//! let registry = SchemaRegistry::compile(
//!     SchemaMap::new()
//!         .query(json!({"type": "object", "properties": {"page": {"type": "integer"}}}))
//!         .body(json!({"type": "object", "required": ["name"]})),
//! )
//! .unwrap();
//!
//! assert!(registry.contains(Segment::Query));
//! assert!(!registry.contains(Segment::Headers));
//! ```

#![doc(html_root_url = "https://docs.rs/krino-schema/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod engine;
mod error;
mod json;
mod options;
mod registry;
mod transform;

pub use engine::{CompiledSchema, EngineOutcome, FnEngine, SchemaEngine};
pub use error::{SchemaError, SchemaResult};
pub use json::JsonSchemaEngine;
pub use options::ValidationOptions;
pub use registry::{SchemaMap, SchemaRegistry};

pub use krino_core::Segment;

/// The JSON Schema implementation backing [`JsonSchemaEngine`].
pub use jsonschema;
