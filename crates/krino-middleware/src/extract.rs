//! Converting HTTP requests into [`RequestParts`] and back.
//!
//! - `headers` becomes an object keyed by lower-cased header name
//! - `params` comes from the [`PathParams`] request extension set by a router
//! - `query` is the URL query string; repeated keys collect into an array
//! - `body` is parsed according to `Content-Type`; an empty body is absent
//!
//! Every string stays a string here. Turning `"42"` into `42` is the schema
//! engine's job, and only when conversion is enabled.

use bytes::Bytes;
use http::header::{HeaderMap, CONTENT_TYPE};
use krino_core::{EngineFailure, RequestParts, Segment, ValidationFailure};
use serde_json::{Map, Value};

/// Path parameters captured by the router for the current request.
///
/// Routers insert this as a request extension before the validation stage
/// runs. Requests without it are validated against an empty `params` object.
///
/// # Example
///
/// ```
/// use krino_middleware::PathParams;
/// use serde_json::json;
///
/// let params: PathParams = [("id", "42")].into_iter().collect();
/// assert_eq!(params.to_value(), json!({"id": "42"}));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams(Vec<(String, String)>);

impl PathParams {
    /// Creates an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    /// Returns the value of a parameter.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Returns the parameters as a JSON object of strings.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(key, value)| (key.clone(), Value::String(value.clone())))
                .collect(),
        )
    }
}

impl<K, V> FromIterator<(K, V)> for PathParams
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

/// How the request body is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// `application/json` and `+json` media types, or no `Content-Type`.
    Json,
    /// `application/x-www-form-urlencoded`.
    Form,
    /// Anything else; the body is exposed as a string.
    Text,
}

impl BodyKind {
    /// Determines the body encoding from request headers.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let Some(content_type) = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
            return Self::Json;
        };
        let mime = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        if mime == "application/json" || mime.ends_with("+json") {
            Self::Json
        } else if mime == "application/x-www-form-urlencoded" {
            Self::Form
        } else {
            Self::Text
        }
    }
}

/// Converts headers into a JSON object keyed by lower-cased name.
///
/// Repeated headers collect into an array in arrival order.
#[must_use]
pub fn headers_to_value(headers: &HeaderMap) -> Value {
    pairs_to_value(headers.iter().map(|(name, value)| {
        (
            name.as_str().to_ascii_lowercase(),
            String::from_utf8_lossy(value.as_bytes()).into_owned(),
        )
    }))
}

/// Parses a URL query string into a JSON object.
///
/// # Errors
///
/// Returns a failure tagged `query` when the query string cannot be decoded.
pub fn query_to_value(query: Option<&str>) -> Result<Value, ValidationFailure> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query.unwrap_or_default())
        .map_err(|e| {
            ValidationFailure::tagged(
                EngineFailure::new(format!("invalid query string: {e}")),
                Segment::Query,
            )
        })?;
    Ok(pairs_to_value(pairs))
}

/// Parses a request body.
///
/// An empty body is absent (`None`), not `null`.
///
/// # Errors
///
/// Returns a failure tagged `body` when the body does not match its declared
/// encoding.
pub fn body_to_value(kind: BodyKind, body: &Bytes) -> Result<Option<Value>, ValidationFailure> {
    if body.is_empty() {
        return Ok(None);
    }

    let parsed = match kind {
        BodyKind::Json => serde_json::from_slice(body).map_err(|e| format!("invalid JSON body: {e}")),
        BodyKind::Form => serde_urlencoded::from_bytes::<Vec<(String, String)>>(body)
            .map(pairs_to_value)
            .map_err(|e| format!("invalid form body: {e}")),
        BodyKind::Text => Ok(Value::String(String::from_utf8_lossy(body).into_owned())),
    };

    parsed
        .map(Some)
        .map_err(|message| ValidationFailure::tagged(EngineFailure::new(message), Segment::Body))
}

/// Builds the validation view of a request from the parts that never fail to
/// decode: headers and path params.
///
/// The query and the body are filled in later by [`RawSegments::decode`], as
/// validation reaches them.
#[must_use]
pub fn request_parts(head: &http::request::Parts) -> RequestParts {
    let params = head
        .extensions
        .get::<PathParams>()
        .map_or_else(|| Value::Object(Map::new()), PathParams::to_value);

    RequestParts::new(head.method.clone())
        .with_segment(Segment::Headers, headers_to_value(&head.headers))
        .with_segment(Segment::Params, params)
}

/// Query string and body of a request, still undecoded.
///
/// Decoding happens one segment at a time, so a decode failure is reported
/// in validation order.
#[derive(Debug, Clone, Copy)]
pub struct RawSegments<'a> {
    query: Option<&'a str>,
    body: &'a Bytes,
    kind: BodyKind,
    parse_body: bool,
}

impl<'a> RawSegments<'a> {
    /// Captures the undecoded segments of a request.
    ///
    /// The body is only decoded when `parse_body` is set, so a malformed body
    /// on a request whose body is never validated does not fail the request.
    #[must_use]
    pub fn new(head: &'a http::request::Parts, body: &'a Bytes, parse_body: bool) -> Self {
        Self {
            query: head.uri.query(),
            body,
            kind: BodyKind::from_headers(&head.headers),
            parse_body,
        }
    }

    /// The body encoding.
    #[must_use]
    pub const fn kind(&self) -> BodyKind {
        self.kind
    }

    /// Decodes `segment` into `parts`. Headers and params are already
    /// populated, so only `query` and `body` do anything.
    ///
    /// # Errors
    ///
    /// Returns a failure tagged with `segment` when it cannot be decoded.
    pub fn decode(&self, segment: Segment, parts: &mut RequestParts) -> Result<(), ValidationFailure> {
        match segment {
            Segment::Query => parts.set_segment(Segment::Query, query_to_value(self.query)?),
            Segment::Body if self.parse_body => {
                if let Some(value) = body_to_value(self.kind, self.body)? {
                    parts.set_segment(Segment::Body, value);
                }
            }
            Segment::Headers | Segment::Params | Segment::Body => {}
        }
        Ok(())
    }
}

/// Returns the body bytes handed to the next stage.
///
/// A JSON body is re-serialized from the validated value so downstream code
/// sees applied defaults and conversions. Other encodings keep their original
/// bytes; the validated value is still available from the request extension.
#[must_use]
pub fn body_bytes(kind: BodyKind, parts: &RequestParts, original: Bytes) -> Bytes {
    match (kind, parts.body()) {
        (BodyKind::Json, Some(value)) => serde_json::to_vec(value).map_or(original, Bytes::from),
        _ => original,
    }
}

/// Collects key/value pairs into an object, turning repeated keys into arrays.
fn pairs_to_value<I>(pairs: I) -> Value
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut object = Map::new();
    for (key, value) in pairs {
        let value = Value::String(value);
        match object.get_mut(&key) {
            None => {
                object.insert(key, value);
            }
            Some(Value::Array(values)) => values.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
        }
    }
    Value::Object(object)
}
