//! Validation error normalization.
//!
//! Converts a [`ValidationFailure`] into the stable 400 payload:
//!
//! ```json
//! {
//!   "statusCode": 400,
//!   "error": "Bad Request",
//!   "message": "\"name\" is a required property",
//!   "validation": { "source": "body", "keys": ["name"] }
//! }
//! ```
//!
//! Any other error is handed back unchanged for the next error handler.

use krino_core::{BoxError, ErrorResponse, ValidationFailure};
use serde::Serialize;

use crate::context::MiddlewareContext;
use crate::error_handler::ErrorHandler;
use crate::types::{Response, ResponseExt};

/// Builds the 400 response for a validation failure.
///
/// # Errors
///
/// Returns `error` unchanged when it is not a [`ValidationFailure`]. A
/// validation failure is always answered with a 400; if the payload cannot
/// be encoded the body falls back to the plain `VALIDATION_ERROR` envelope.
///
/// # Example
///
/// ```
/// use krino_core::{EngineFailure, Segment, ValidationFailure};
/// use krino_middleware::stages::to_error_response;
///
/// let failure = ValidationFailure::tagged(EngineFailure::new("bad"), Segment::Query);
/// let response = to_error_response(Box::new(failure)).unwrap();
/// assert_eq!(response.status(), 400);
///
/// let other = to_error_response("disk full".into()).unwrap_err();
/// assert_eq!(other.to_string(), "disk full");
/// ```
pub fn to_error_response(error: BoxError) -> Result<Response, BoxError> {
    let failure = error.downcast::<ValidationFailure>()?;
    let payload = ErrorResponse::from_failure(&failure);
    Ok(render(&payload, &payload.message))
}

fn render<T: Serialize>(payload: &T, message: &str) -> Response {
    Response::json(ErrorResponse::STATUS, payload).unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to encode validation payload");
        Response::json_error(ErrorResponse::STATUS, "VALIDATION_ERROR", message)
    })
}

/// Error handler that answers validation failures with a 400 response.
///
/// Errors of any other type are returned untouched so later handlers see them.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationErrorHandler;

impl ValidationErrorHandler {
    /// Creates the handler.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ErrorHandler for ValidationErrorHandler {
    fn name(&self) -> &'static str {
        "validation_errors"
    }

    fn handle(&self, ctx: &MiddlewareContext, error: BoxError) -> Result<Response, BoxError> {
        if !error.is::<ValidationFailure>() {
            return Err(error);
        }
        let response = to_error_response(error)?;
        tracing::debug!(
            request_id = %ctx.request_id(),
            status = %response.status(),
            "validation failure rendered"
        );
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::CONTENT_TYPE;
    use http::StatusCode;
    use http_body_util::BodyExt;
    use krino_core::{EngineFailure, FailureDetail, Segment};
    use serde_json::{json, Value};

    fn failure() -> ValidationFailure {
        ValidationFailure::tagged(
            EngineFailure::from_details(vec![
                FailureDetail::new("\"b\" must be a number", ["a", "b"]),
                FailureDetail::new("\"c\" is required", ["c"]),
            ]),
            Segment::Body,
        )
    }

    async fn body_json(response: Response) -> Value {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_validation_failure_becomes_400() {
        let response = ValidationErrorHandler::new()
            .handle(&MiddlewareContext::new(), Box::new(failure()))
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert_eq!(
            body_json(response).await,
            json!({
                "statusCode": 400,
                "error": "Bad Request",
                "message": "\"b\" must be a number; \"c\" is required",
                "validation": {"source": "body", "keys": ["a.b", "c"]}
            })
        );
    }

    #[test]
    fn test_other_errors_pass_through_unchanged() {
        #[derive(Debug)]
        struct Upstream;

        impl std::fmt::Display for Upstream {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("upstream timed out")
            }
        }

        impl std::error::Error for Upstream {}

        let err = ValidationErrorHandler::new()
            .handle(&MiddlewareContext::new(), Box::new(Upstream))
            .unwrap_err();
        assert!(err.is::<Upstream>());
        assert_eq!(err.to_string(), "upstream timed out");
    }

    #[tokio::test]
    async fn test_unencodable_payload_still_answers_400() {
        struct Unencodable;

        impl Serialize for Unencodable {
            fn serialize<S: serde::Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
                Err(serde::ser::Error::custom("cannot encode"))
            }
        }

        let response = render(&Unencodable, "\"name\" is required");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({"error": {"code": "VALIDATION_ERROR", "message": "\"name\" is required"}})
        );
    }

    #[tokio::test]
    async fn test_keys_are_escaped() {
        let failure = ValidationFailure::tagged(
            EngineFailure::from_details(vec![FailureDetail::new("bad", ["<script>"])]),
            Segment::Query,
        );
        let response = to_error_response(Box::new(failure)).unwrap();
        let json = body_json(response).await;
        assert_eq!(json["validation"]["keys"], json!(["&lt;script&gt;"]));
        assert_eq!(json["validation"]["source"], "query");
    }
}
