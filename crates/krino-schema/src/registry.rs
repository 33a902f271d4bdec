//! The schema registry: one compiled schema per request segment.
//!
//! A [`SchemaMap`] collects schema definitions keyed by segment. Untyped maps
//! (from configuration files) are first checked against a meta-schema that
//! only admits `headers`, `params`, `query` and `body`. [`SchemaRegistry::compile`]
//! then compiles every definition once; the registry is immutable afterwards
//! and shared by every request.

use krino_core::{Segment, SegmentMap};
use serde_json::{json, Map, Value};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::engine::CompiledSchema;
use crate::error::{SchemaError, SchemaResult};
use crate::json::JsonSchemaEngine;

/// A schema for one segment, before compilation.
#[derive(Clone)]
enum Definition {
    /// A JSON Schema document, compiled by [`JsonSchemaEngine`].
    Json(Value),
    /// An already executable engine.
    Engine(CompiledSchema),
}

/// Schema definitions keyed by segment.
///
/// # Example
///
/// ```
/// use krino_schema::SchemaMap;
/// use serde_json::json;
///
/// // Typed construction
/// let typed = SchemaMap::new().params(json!({"type": "object"}));
/// assert_eq!(typed.len(), 1);
///
/// // Untyped construction is checked against the legal segment names
/// assert!(SchemaMap::from_value(json!({"body": {}})).is_ok());
/// assert!(SchemaMap::from_value(json!({"cookies": {}})).is_err());
/// ```
#[derive(Clone, Default)]
pub struct SchemaMap {
    definitions: SegmentMap<Definition>,
}

impl fmt::Debug for SchemaMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaMap")
            .field("segments", &self.definitions.segments())
            .finish()
    }
}

impl SchemaMap {
    /// Creates an empty map. An empty map validates nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the JSON Schema for a segment.
    #[must_use]
    pub fn segment(mut self, segment: Segment, definition: Value) -> Self {
        self.definitions.insert(segment, Definition::Json(definition));
        self
    }

    /// Sets a custom engine for a segment.
    #[must_use]
    pub fn engine(mut self, segment: Segment, engine: CompiledSchema) -> Self {
        self.definitions.insert(segment, Definition::Engine(engine));
        self
    }

    /// Sets the headers schema.
    #[must_use]
    pub fn headers(self, definition: Value) -> Self {
        self.segment(Segment::Headers, definition)
    }

    /// Sets the path parameters schema.
    #[must_use]
    pub fn params(self, definition: Value) -> Self {
        self.segment(Segment::Params, definition)
    }

    /// Sets the query string schema.
    #[must_use]
    pub fn query(self, definition: Value) -> Self {
        self.segment(Segment::Query, definition)
    }

    /// Sets the body schema.
    #[must_use]
    pub fn body(self, definition: Value) -> Self {
        self.segment(Segment::Body, definition)
    }

    /// Builds a map from an untyped JSON object such as
    /// `{"query": {...}, "body": {...}}`.
    ///
    /// `null` is treated as an empty map.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::UnknownSegment` for a key outside
    /// `headers`/`params`/`query`/`body`, and `SchemaError::InvalidSchemaMap`
    /// when the value is not an object or an entry is not a schema.
    pub fn from_value(value: Value) -> SchemaResult<Self> {
        let entries = match value {
            Value::Null => return Ok(Self::new()),
            Value::Object(entries) => entries,
            other => {
                return Err(SchemaError::invalid_schema_map(format!(
                    "expected an object keyed by segment, got {}",
                    json_type(&other)
                )))
            }
        };

        check_against_meta_schema(&entries)?;

        let mut map = Self::new();
        for (name, definition) in entries {
            let segment: Segment = name.parse()?;
            map = map.segment(segment, definition);
        }
        Ok(map)
    }

    /// Number of segments with a schema.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Returns true if no segment has a schema.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

/// Meta-schema describing a valid schema map.
fn meta_schema() -> Value {
    let segment_schema = json!({"type": ["object", "boolean"]});
    let properties: Map<String, Value> = Segment::ALL
        .iter()
        .map(|segment| (segment.as_str().to_string(), segment_schema.clone()))
        .collect();

    json!({
        "type": "object",
        "properties": properties,
        "additionalProperties": false
    })
}

fn check_against_meta_schema(entries: &Map<String, Value>) -> SchemaResult<()> {
    let meta = jsonschema::options()
        .build(&meta_schema())
        .map_err(|e| SchemaError::invalid_schema_map(e.to_string()))?;

    let instance = Value::Object(entries.clone());
    let violations: Vec<String> = meta.iter_errors(&instance).map(|e| e.to_string()).collect();
    if violations.is_empty() {
        return Ok(());
    }

    // Report an unknown segment precisely when that is the problem.
    for name in entries.keys() {
        name.parse::<Segment>()?;
    }

    Err(SchemaError::invalid_schema_map(violations.join("; ")))
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Compiled schemas keyed by segment.
///
/// Immutable after [`compile`](Self::compile); wrap it in an `Arc` to share
/// it across concurrently handled requests.
#[derive(Clone, Default)]
pub struct SchemaRegistry {
    schemas: SegmentMap<CompiledSchema>,
}

impl fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaRegistry")
            .field("segments", &self.schemas.segments())
            .finish()
    }
}

impl SchemaRegistry {
    /// Compiles every definition in the map.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::Compile` naming the first segment whose
    /// definition the engine rejects.
    pub fn compile(map: SchemaMap) -> SchemaResult<Self> {
        let mut schemas = SegmentMap::new();

        for segment in Segment::ALL {
            let compiled: CompiledSchema = match map.definitions.get(segment) {
                None => continue,
                Some(Definition::Engine(engine)) => Arc::clone(engine),
                Some(Definition::Json(definition)) => {
                    let engine = JsonSchemaEngine::compile(definition.clone()).map_err(|e| {
                        SchemaError::Compile {
                            segment,
                            reason: e.to_string(),
                        }
                    })?;
                    Arc::new(engine)
                }
            };

            debug!(segment = %segment, "compiled segment schema");
            schemas.insert(segment, compiled);
        }

        Ok(Self { schemas })
    }

    /// Checks an untyped schema map and compiles it.
    ///
    /// # Errors
    ///
    /// See [`SchemaMap::from_value`] and [`compile`](Self::compile).
    pub fn from_value(value: Value) -> SchemaResult<Self> {
        Self::compile(SchemaMap::from_value(value)?)
    }

    /// Returns the compiled schema for a segment.
    #[must_use]
    pub fn get(&self, segment: Segment) -> Option<&CompiledSchema> {
        self.schemas.get(segment)
    }

    /// Returns true if the segment has a schema.
    #[must_use]
    pub fn contains(&self, segment: Segment) -> bool {
        self.schemas.contains(segment)
    }

    /// Segments with a schema, in validation order.
    #[must_use]
    pub fn segments(&self) -> Vec<Segment> {
        self.schemas.segments()
    }

    /// Returns true if no segment has a schema.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// The definitions the registry was built from, as a JSON object.
    ///
    /// Segments served by an engine without a definition are omitted.
    #[must_use]
    pub fn schema_map(&self) -> Value {
        let entries: Map<String, Value> = self
            .schemas
            .iter()
            .filter_map(|(segment, engine)| {
                engine
                    .definition()
                    .map(|definition| (segment.as_str().to_string(), definition.clone()))
            })
            .collect();
        Value::Object(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{EngineOutcome, FnEngine};
    use crate::options::ValidationOptions;

    #[test]
    fn test_all_recognized_segments_accepted() {
        let registry = SchemaRegistry::from_value(json!({
            "headers": {"type": "object"},
            "params": {"type": "object"},
            "query": {"type": "object"},
            "body": true
        }))
        .unwrap();

        assert_eq!(registry.segments(), Segment::ALL.to_vec());
    }

    #[test]
    fn test_unknown_segment_rejected() {
        let err = SchemaRegistry::from_value(json!({
            "query": {"type": "object"},
            "cookies": {"type": "object"}
        }))
        .unwrap_err();

        assert!(matches!(err, SchemaError::UnknownSegment(ref e) if e.0 == "cookies"));
    }

    #[test]
    fn test_non_schema_entry_rejected() {
        let err = SchemaMap::from_value(json!({"body": 42})).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidSchemaMap { .. }));
    }

    #[test]
    fn test_non_object_map_rejected() {
        let err = SchemaMap::from_value(json!(["body"])).unwrap_err();
        assert!(err.to_string().contains("array"));
    }

    #[test]
    fn test_null_and_empty_maps_are_empty() {
        assert!(SchemaRegistry::from_value(Value::Null).unwrap().is_empty());
        assert!(SchemaRegistry::from_value(json!({})).unwrap().is_empty());
    }

    #[test]
    fn test_compile_error_names_segment() {
        let err = SchemaRegistry::compile(SchemaMap::new().query(json!({"type": "nope"})))
            .unwrap_err();

        assert!(matches!(err, SchemaError::Compile { segment: Segment::Query, .. }));
    }

    #[test]
    fn test_custom_engine_registered() {
        let engine = FnEngine::new(|value: Option<&Value>, _: &ValidationOptions| {
            EngineOutcome::valid(value.cloned())
        });
        let registry =
            SchemaRegistry::compile(SchemaMap::new().engine(Segment::Headers, Arc::new(engine)))
                .unwrap();

        assert!(registry.contains(Segment::Headers));
        // Engines without a definition do not appear in the introspected map.
        assert_eq!(registry.schema_map(), json!({}));
    }

    #[test]
    fn test_schema_map_round_trips_definitions() {
        let body = json!({"type": "object", "required": ["id"]});
        let registry = SchemaRegistry::compile(SchemaMap::new().body(body.clone())).unwrap();

        assert_eq!(registry.schema_map(), json!({"body": body}));
        assert!(registry.get(Segment::Body).is_some());
        assert!(registry.get(Segment::Query).is_none());
    }
}
