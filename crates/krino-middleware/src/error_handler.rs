//! Error handlers run after a stage or handler returns `Err`.
//!
//! The pipeline offers the error to each handler in registration order. A
//! handler either answers with a response or gives the error back, untouched,
//! so the next handler can look at it. Handlers never see an error they did
//! not ask for in an altered form.

use std::fmt;

use krino_core::BoxError;

use crate::context::MiddlewareContext;
use crate::types::Response;

/// Turns errors into responses.
pub trait ErrorHandler: Send + Sync + 'static {
    /// Returns the name of this handler, used in logs.
    fn name(&self) -> &'static str;

    /// Handles an error.
    ///
    /// # Errors
    ///
    /// Returns the original error when this handler does not recognize it.
    fn handle(&self, ctx: &MiddlewareContext, error: BoxError) -> Result<Response, BoxError>;
}

/// An error handler built from a closure.
///
/// # Example
///
/// ```
/// use http::StatusCode;
/// use krino_middleware::{ErrorHandler, FnErrorHandler, Response, ResponseExt};
///
/// let teapot = FnErrorHandler::new("teapot", |_ctx, error| {
///     if error.to_string() == "teapot" {
///         Ok(Response::json_error(StatusCode::IM_A_TEAPOT, "TEAPOT", "short and stout"))
///     } else {
///         Err(error)
///     }
/// });
/// assert_eq!(teapot.name(), "teapot");
/// ```
pub struct FnErrorHandler<F> {
    name: &'static str,
    func: F,
}

impl<F> FnErrorHandler<F>
where
    F: Fn(&MiddlewareContext, BoxError) -> Result<Response, BoxError> + Send + Sync + 'static,
{
    /// Creates a new function-based error handler.
    pub fn new(name: &'static str, func: F) -> Self {
        Self { name, func }
    }
}

impl<F> fmt::Debug for FnErrorHandler<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnErrorHandler")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl<F> ErrorHandler for FnErrorHandler<F>
where
    F: Fn(&MiddlewareContext, BoxError) -> Result<Response, BoxError> + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn handle(&self, ctx: &MiddlewareContext, error: BoxError) -> Result<Response, BoxError> {
        (self.func)(ctx, error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ResponseExt;
    use http::StatusCode;

    #[test]
    fn test_fn_error_handler_passes_unknown_errors_through() {
        let handler = FnErrorHandler::new("not_found", |_ctx, error| {
            if error.to_string().contains("missing") {
                Ok(Response::json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "missing"))
            } else {
                Err(error)
            }
        });
        let ctx = MiddlewareContext::new();

        let response = handler.handle(&ctx, "record missing".into()).unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let passed = handler.handle(&ctx, "disk full".into()).unwrap_err();
        assert_eq!(passed.to_string(), "disk full");
    }
}
