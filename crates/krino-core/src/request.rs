//! The per-request carrier read and rewritten by validation.

use http::Method;
use serde_json::Value;

use crate::segment::{Segment, SegmentMap};

/// The validated view of one incoming request.
///
/// Each segment holds a JSON value, or nothing when the request did not carry
/// that part (for example a request without a body). Validation may replace a
/// segment with the schema's transformed output; it never clears one.
///
/// # Example
///
/// ```
/// use http::Method;
/// use krino_core::{RequestParts, Segment};
/// use serde_json::json;
///
/// let parts = RequestParts::new(Method::POST)
///     .with_segment(Segment::Body, json!({"name": "Alice"}));
///
/// assert_eq!(parts.segment(Segment::Body), Some(&json!({"name": "Alice"})));
/// assert_eq!(parts.segment(Segment::Query), None);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RequestParts {
    method: Method,
    segments: SegmentMap<Value>,
}

impl RequestParts {
    /// Creates request parts with no segments populated.
    #[must_use]
    pub fn new(method: Method) -> Self {
        Self {
            method,
            segments: SegmentMap::new(),
        }
    }

    /// Populates a segment, consuming and returning `self`.
    #[must_use]
    pub fn with_segment(mut self, segment: Segment, value: Value) -> Self {
        self.segments.insert(segment, value);
        self
    }

    /// Returns the request method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the current value of a segment.
    #[must_use]
    pub fn segment(&self, segment: Segment) -> Option<&Value> {
        self.segments.get(segment)
    }

    /// Overwrites a segment with a new value.
    pub fn set_segment(&mut self, segment: Segment, value: Value) {
        self.segments.insert(segment, value);
    }

    /// Removes a segment, returning its value.
    pub fn take_segment(&mut self, segment: Segment) -> Option<Value> {
        self.segments.remove(segment)
    }

    /// Request headers as a JSON object.
    #[must_use]
    pub fn headers(&self) -> Option<&Value> {
        self.segment(Segment::Headers)
    }

    /// Path parameters as a JSON object.
    #[must_use]
    pub fn params(&self) -> Option<&Value> {
        self.segment(Segment::Params)
    }

    /// Query string as a JSON object.
    #[must_use]
    pub fn query(&self) -> Option<&Value> {
        self.segment(Segment::Query)
    }

    /// Request body.
    #[must_use]
    pub fn body(&self) -> Option<&Value> {
        self.segment(Segment::Body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_parts_are_empty() {
        let parts = RequestParts::new(Method::GET);
        assert_eq!(*parts.method(), Method::GET);
        for segment in Segment::ALL {
            assert!(parts.segment(segment).is_none());
        }
    }

    #[test]
    fn test_set_segment_overwrites() {
        let mut parts =
            RequestParts::new(Method::POST).with_segment(Segment::Query, json!({"page": "2"}));

        parts.set_segment(Segment::Query, json!({"page": 2}));
        assert_eq!(parts.query(), Some(&json!({"page": 2})));
    }

    #[test]
    fn test_take_segment() {
        let mut parts =
            RequestParts::new(Method::PUT).with_segment(Segment::Body, json!([1, 2]));

        assert_eq!(parts.take_segment(Segment::Body), Some(json!([1, 2])));
        assert!(parts.body().is_none());
    }
}
