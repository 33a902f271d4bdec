//! Validation failures.
//!
//! A schema engine reports an untagged [`EngineFailure`]. The segment
//! validator turns it into a [`ValidationFailure`] by attaching the segment
//! that was being validated, so every failure surfaced to the error chain
//! names its source.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::escape::escape_html;
use crate::segment::Segment;

/// One step in a field path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum PathKey {
    /// An object key.
    Key(String),
    /// An array index.
    Index(usize),
}

impl fmt::Display for PathKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(key),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

impl From<&str> for PathKey {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

impl From<String> for PathKey {
    fn from(key: String) -> Self {
        Self::Key(key)
    }
}

impl From<usize> for PathKey {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

/// A single offending field reported by the schema engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureDetail {
    /// Human-readable description of the violation.
    pub message: String,
    /// Ordered keys leading to the offending value. Empty for the segment root.
    pub path: Vec<PathKey>,
}

impl FailureDetail {
    /// Creates a detail from a message and a path.
    pub fn new<I, K>(message: impl Into<String>, path: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<PathKey>,
    {
        Self {
            message: message.into(),
            path: path.into_iter().map(Into::into).collect(),
        }
    }

    /// The path joined with `.` (e.g. `["items", 0, "sku"]` → `items.0.sku`).
    #[must_use]
    pub fn joined_path(&self) -> String {
        self.path
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// An untagged rejection returned by a schema engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineFailure {
    /// Human-readable summary.
    pub message: String,
    /// Per-field details, possibly empty.
    pub details: Vec<FailureDetail>,
}

impl EngineFailure {
    /// Creates a failure with no per-field details.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            details: Vec::new(),
        }
    }

    /// Creates a failure whose message joins the detail messages.
    #[must_use]
    pub fn from_details(details: Vec<FailureDetail>) -> Self {
        let message = details
            .iter()
            .map(|d| d.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        Self { message, details }
    }
}

/// Metadata identifying where a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FailureMeta {
    /// The segment whose schema rejected the request.
    pub source: Segment,
}

/// A segment rejection, tagged with its source segment.
///
/// This is the only error type the validation error handler claims; anything
/// else is passed along the error chain untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationFailure {
    message: String,
    details: Vec<FailureDetail>,
    meta: FailureMeta,
}

impl ValidationFailure {
    /// Tags an engine failure with the segment that produced it.
    #[must_use]
    pub fn tagged(failure: EngineFailure, source: Segment) -> Self {
        Self {
            message: failure.message,
            details: failure.details,
            meta: FailureMeta { source },
        }
    }

    /// Human-readable summary.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Per-field details.
    #[must_use]
    pub fn details(&self) -> &[FailureDetail] {
        &self.details
    }

    /// Failure metadata.
    #[must_use]
    pub fn meta(&self) -> FailureMeta {
        self.meta
    }

    /// The segment that failed.
    #[must_use]
    pub fn source_segment(&self) -> Segment {
        self.meta.source
    }

    /// Dot-joined, HTML-escaped paths of every offending field.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.details
            .iter()
            .map(|detail| escape_html(&detail.joined_path()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joined_path() {
        let detail = FailureDetail::new("bad", [PathKey::from("items"), PathKey::Index(0), PathKey::from("sku")]);
        assert_eq!(detail.joined_path(), "items.0.sku");

        let root = FailureDetail::new("bad", Vec::<PathKey>::new());
        assert_eq!(root.joined_path(), "");
    }

    #[test]
    fn test_from_details_joins_messages() {
        let failure = EngineFailure::from_details(vec![
            FailureDetail::new("\"a\" is required", ["a"]),
            FailureDetail::new("\"c\" must be a number", ["c"]),
        ]);
        assert_eq!(failure.message, "\"a\" is required; \"c\" must be a number");
        assert_eq!(failure.details.len(), 2);
    }

    #[test]
    fn test_tagging_keeps_message_and_details() {
        let failure = ValidationFailure::tagged(
            EngineFailure::from_details(vec![FailureDetail::new("bad", ["a", "b"])]),
            Segment::Query,
        );

        assert_eq!(failure.message(), "bad");
        assert_eq!(failure.to_string(), "bad");
        assert_eq!(failure.source_segment(), Segment::Query);
        assert_eq!(failure.meta(), FailureMeta { source: Segment::Query });
        assert_eq!(failure.details().len(), 1);
    }

    #[test]
    fn test_keys_are_joined_and_escaped() {
        let failure = ValidationFailure::tagged(
            EngineFailure::from_details(vec![
                FailureDetail::new("x", ["a", "b"]),
                FailureDetail::new("y", ["c"]),
                FailureDetail::new("z", ["<script>"]),
            ]),
            Segment::Body,
        );

        assert_eq!(failure.keys(), vec!["a.b", "c", "&lt;script&gt;"]);
    }

    #[test]
    fn test_no_details_means_no_keys() {
        let failure = ValidationFailure::tagged(EngineFailure::new("rejected"), Segment::Headers);
        assert!(failure.keys().is_empty());
    }
}
