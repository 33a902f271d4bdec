//! Ordered middleware pipeline with an error-handler chain.
//!
//! Stages run in the order they were added, then the handler. When a stage or
//! the handler returns `Err`, the error is offered to each error handler in
//! turn. An error nobody claims becomes a generic 500 response, so the
//! pipeline always produces a response.

use std::sync::Arc;

use http::StatusCode;
use krino_core::{BoxError, BoxFuture};

use crate::context::MiddlewareContext;
use crate::error_handler::ErrorHandler;
use crate::middleware::{Middleware, MiddlewareResult, Next};
use crate::types::{Request, Response, ResponseExt};

/// A type-erased middleware that can be stored in a vector.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// A type-erased error handler.
pub type BoxedErrorHandler = Arc<dyn ErrorHandler>;

/// The middleware pipeline.
///
/// The pipeline cannot be modified after construction.
#[derive(Clone)]
pub struct Pipeline {
    stages: Vec<BoxedMiddleware>,
    error_handlers: Vec<BoxedErrorHandler>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stage_names())
            .field("error_handlers", &self.error_handler_names())
            .finish()
    }
}

impl Pipeline {
    /// Creates a new pipeline builder.
    #[must_use]
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Processes a request through every stage, the handler, and, on error,
    /// the error handlers.
    pub async fn process<H>(&self, mut ctx: MiddlewareContext, request: Request, handler: H) -> Response
    where
        H: FnOnce(&mut MiddlewareContext, Request) -> BoxFuture<'static, MiddlewareResult>
            + Send
            + 'static,
    {
        let next = self.build_chain(handler);
        match next.run(&mut ctx, request).await {
            Ok(response) => response,
            Err(error) => self.handle_error(&ctx, error),
        }
    }

    /// Offers `error` to each error handler, falling back to a 500 response.
    #[must_use]
    pub fn handle_error(&self, ctx: &MiddlewareContext, error: BoxError) -> Response {
        let mut error = error;
        for handler in &self.error_handlers {
            match handler.handle(ctx, error) {
                Ok(response) => {
                    tracing::debug!(
                        request_id = %ctx.request_id(),
                        handler = handler.name(),
                        status = %response.status(),
                        "error handled"
                    );
                    return response;
                }
                Err(unhandled) => error = unhandled,
            }
        }

        tracing::error!(
            request_id = %ctx.request_id(),
            error = %error,
            "unhandled error"
        );
        internal_error(ctx)
    }

    fn build_chain<'a, H>(&'a self, handler: H) -> Next<'a>
    where
        H: FnOnce(&mut MiddlewareContext, Request) -> BoxFuture<'static, MiddlewareResult>
            + Send
            + 'a,
    {
        let mut next = Next::handler(handler);
        for middleware in self.stages.iter().rev() {
            next = Next::new(middleware.as_ref(), next);
        }
        next
    }

    /// Returns the names of all middleware stages in order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|mw| mw.name()).collect()
    }

    /// Returns the names of all error handlers in order.
    #[must_use]
    pub fn error_handler_names(&self) -> Vec<&'static str> {
        self.error_handlers.iter().map(|h| h.name()).collect()
    }

    /// Returns the number of middleware stages.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }
}

/// The response used when no error handler claims an error.
///
/// Carries the request ID but never the error text.
fn internal_error(ctx: &MiddlewareContext) -> Response {
    let payload = serde_json::json!({
        "error": {
            "code": "INTERNAL_ERROR",
            "message": "An internal error occurred",
            "request_id": ctx.request_id().to_string(),
        }
    });
    Response::json(StatusCode::INTERNAL_SERVER_ERROR, &payload).unwrap_or_else(|_| {
        Response::json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            "An internal error occurred",
        )
    })
}

/// Builder for constructing a [`Pipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    stages: Vec<BoxedMiddleware>,
    error_handlers: Vec<BoxedErrorHandler>,
}

impl std::fmt::Debug for PipelineBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineBuilder")
            .field("stages", &self.stages.len())
            .field("error_handlers", &self.error_handlers.len())
            .finish()
    }
}

impl PipelineBuilder {
    /// Creates an empty pipeline builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a middleware stage.
    #[must_use]
    pub fn add_stage<M: Middleware>(mut self, middleware: M) -> Self {
        self.stages.push(Arc::new(middleware));
        self
    }

    /// Appends an error handler.
    #[must_use]
    pub fn add_error_handler<E: ErrorHandler>(mut self, handler: E) -> Self {
        self.error_handlers.push(Arc::new(handler));
        self
    }

    /// Builds the pipeline.
    #[must_use]
    pub fn build(self) -> Pipeline {
        Pipeline {
            stages: self.stages,
            error_handlers: self.error_handlers,
        }
    }
}
