//! The normalized error payload returned for validation failures.

use http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::failure::ValidationFailure;
use crate::segment::Segment;

/// The JSON body sent with a 400 response.
///
/// ```json
/// {
///   "statusCode": 400,
///   "error": "Bad Request",
///   "message": "\"name\" is a required property",
///   "validation": { "source": "body", "keys": ["name"] }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Always 400.
    pub status_code: u16,
    /// Always `"Bad Request"`.
    pub error: String,
    /// The failure message.
    pub message: String,
    /// Which segment failed and which fields.
    pub validation: ValidationInfo,
}

/// The `validation` member of [`ErrorResponse`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationInfo {
    /// The segment that failed.
    pub source: Segment,
    /// Dot-joined, HTML-escaped field paths.
    pub keys: Vec<String>,
}

impl ErrorResponse {
    /// HTTP status of every validation error response.
    pub const STATUS: StatusCode = StatusCode::BAD_REQUEST;

    /// Builds the payload for a failure.
    #[must_use]
    pub fn from_failure(failure: &ValidationFailure) -> Self {
        Self {
            status_code: Self::STATUS.as_u16(),
            error: Self::STATUS
                .canonical_reason()
                .unwrap_or("Bad Request")
                .to_string(),
            message: failure.message().to_string(),
            validation: ValidationInfo {
                source: failure.source_segment(),
                keys: failure.keys(),
            },
        }
    }
}

impl From<&ValidationFailure> for ErrorResponse {
    fn from(failure: &ValidationFailure) -> Self {
        Self::from_failure(failure)
    }
}
