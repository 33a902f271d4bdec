//! Core middleware trait and types.
//!
//! This module defines the [`Middleware`] trait that every stage implements.
//! A stage either continues the chain by calling [`Next::run`], answers the
//! request itself, or returns `Err` to hand an error to the pipeline's error
//! handlers. Returning `Err` skips every later stage and the handler.
//!
//! # Example
//!
//! ```
//! use krino_core::BoxFuture;
//! use krino_middleware::{Middleware, MiddlewareContext, MiddlewareResult, Next, Request};
//!
//! struct LoggingMiddleware;
//!
//! impl Middleware for LoggingMiddleware {
//!     fn name(&self) -> &'static str {
//!         "logging"
//!     }
//!
//!     fn process<'a>(
//!         &'a self,
//!         ctx: &'a mut MiddlewareContext,
//!         request: Request,
//!         next: Next<'a>,
//!     ) -> BoxFuture<'a, MiddlewareResult> {
//!         Box::pin(async move {
//!             tracing::info!(request_id = %ctx.request_id(), "request");
//!             let response = next.run(ctx, request).await?;
//!             tracing::info!(status = %response.status(), "response");
//!             Ok(response)
//!         })
//!     }
//! }
//! ```

use std::fmt;

use krino_core::{BoxError, BoxFuture};

use crate::context::MiddlewareContext;
use crate::types::{Request, Response};

/// Outcome of a middleware stage or handler.
///
/// `Err` carries the error forward to the error handlers, unchanged.
pub type MiddlewareResult = Result<Response, BoxError>;

/// The core middleware trait.
///
/// # Invariants
///
/// - A stage calls `next.run()` at most once
/// - A stage never swallows an `Err` produced downstream of it
pub trait Middleware: Send + Sync + 'static {
    /// Returns the unique name of this middleware stage.
    fn name(&self) -> &'static str;

    /// Process the request through this middleware.
    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, MiddlewareResult>;
}

type Handler<'a> =
    Box<dyn FnOnce(&mut MiddlewareContext, Request) -> BoxFuture<'static, MiddlewareResult> + Send + 'a>;

/// Callback to invoke the next middleware in the chain.
///
/// Consumed on use, so the rest of the chain runs at most once.
pub struct Next<'a> {
    inner: NextInner<'a>,
}

enum NextInner<'a> {
    Chain {
        middleware: &'a dyn Middleware,
        next: Box<Next<'a>>,
    },
    Handler(Handler<'a>),
}

impl fmt::Debug for Next<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            NextInner::Chain { middleware, .. } => f
                .debug_struct("Next")
                .field("middleware", &middleware.name())
                .finish_non_exhaustive(),
            NextInner::Handler(_) => f.debug_struct("Next").field("handler", &true).finish(),
        }
    }
}

impl<'a> Next<'a> {
    /// Creates a `Next` that invokes `middleware`, then continues with `next`.
    pub(crate) fn new(middleware: &'a dyn Middleware, next: Next<'a>) -> Self {
        Self {
            inner: NextInner::Chain {
                middleware,
                next: Box::new(next),
            },
        }
    }

    /// Creates a terminal `Next` that invokes the handler.
    pub fn handler<F>(f: F) -> Self
    where
        F: FnOnce(&mut MiddlewareContext, Request) -> BoxFuture<'static, MiddlewareResult>
            + Send
            + 'a,
    {
        Self {
            inner: NextInner::Handler(Box::new(f)),
        }
    }

    /// Invokes the next middleware or handler in the chain.
    pub async fn run(self, ctx: &mut MiddlewareContext, request: Request) -> MiddlewareResult {
        match self.inner {
            NextInner::Chain { middleware, next } => middleware.process(ctx, request, *next).await,
            NextInner::Handler(handler) => handler(ctx, request).await,
        }
    }
}

/// A middleware built from a closure.
///
/// # Example
///
/// ```
/// use krino_middleware::{FnMiddleware, Middleware};
///
/// let timing = FnMiddleware::new("timing", |ctx, request, next| {
///     Box::pin(async move {
///         let response = next.run(ctx, request).await;
///         tracing::debug!(elapsed = ?ctx.elapsed(), "request finished");
///         response
///     })
/// });
/// assert_eq!(timing.name(), "timing");
/// ```
pub struct FnMiddleware<F> {
    name: &'static str,
    func: F,
}

impl<F> FnMiddleware<F>
where
    F: for<'a> Fn(&'a mut MiddlewareContext, Request, Next<'a>) -> BoxFuture<'a, MiddlewareResult>
        + Send
        + Sync
        + 'static,
{
    /// Creates a new function-based middleware.
    pub fn new(name: &'static str, func: F) -> Self {
        Self { name, func }
    }
}

impl<F> fmt::Debug for FnMiddleware<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnMiddleware")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl<F> Middleware for FnMiddleware<F>
where
    F: for<'a> Fn(&'a mut MiddlewareContext, Request, Next<'a>) -> BoxFuture<'a, MiddlewareResult>
        + Send
        + Sync
        + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, MiddlewareResult> {
        (self.func)(ctx, request, next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http::StatusCode;
    use http_body_util::Full;

    struct Recording {
        name: &'static str,
    }

    #[derive(Debug, Default)]
    struct Visited(Vec<&'static str>);

    impl Middleware for Recording {
        fn name(&self) -> &'static str {
            self.name
        }

        fn process<'a>(
            &'a self,
            ctx: &'a mut MiddlewareContext,
            request: Request,
            next: Next<'a>,
        ) -> BoxFuture<'a, MiddlewareResult> {
            Box::pin(async move {
                let mut visited = ctx.remove_extension::<Visited>().unwrap_or_default();
                visited.0.push(self.name);
                ctx.set_extension(visited);
                next.run(ctx, request).await
            })
        }
    }

    fn request() -> Request {
        http::Request::builder()
            .uri("/test")
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    fn respond(status: StatusCode) -> MiddlewareResult {
        Ok(http::Response::builder()
            .status(status)
            .body(Full::new(Bytes::from("OK")))
            .unwrap())
    }

    fn ok_handler<'a>() -> Next<'a> {
        Next::handler(|_ctx, _req| Box::pin(async { respond(StatusCode::OK) }))
    }

    #[tokio::test]
    async fn test_next_handler() {
        let mut ctx = MiddlewareContext::new();
        let response = ok_handler().run(&mut ctx, request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_middleware_chain_runs_in_order() {
        let first = Recording { name: "first" };
        let second = Recording { name: "second" };

        let mut ctx = MiddlewareContext::new();
        let next = Next::new(&first, Next::new(&second, ok_handler()));

        let response = next.run(&mut ctx, request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            ctx.get_extension::<Visited>().unwrap().0,
            vec!["first", "second"]
        );
    }

    #[tokio::test]
    async fn test_handler_error_propagates() {
        let first = Recording { name: "first" };
        let mut ctx = MiddlewareContext::new();
        let next = Next::new(
            &first,
            Next::handler(|_ctx, _req| Box::pin(async { Err::<Response, BoxError>("database unavailable".into()) })),
        );

        let err = next.run(&mut ctx, request()).await.unwrap_err();
        assert_eq!(err.to_string(), "database unavailable");
    }

    #[tokio::test]
    async fn test_fn_middleware() {
        let mw = FnMiddleware::new("short_circuit", |_ctx, _request, _next| {
            Box::pin(async { respond(StatusCode::NO_CONTENT) })
        });
        assert_eq!(mw.name(), "short_circuit");

        let mut ctx = MiddlewareContext::new();
        let response = Next::new(&mw, ok_handler())
            .run(&mut ctx, request())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }
}
