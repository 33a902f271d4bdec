//! # Krino Middleware
//!
//! Validates incoming requests against per-segment schemas before any handler
//! runs, and turns validation failures into a uniform 400 response.
//!
//! ## Request Flow
//!
//! ```text
//! Request → [ValidationMiddleware] → Handler → Response
//!                  │ Err(ValidationFailure)
//!                  ▼
//!           Error handlers: [ValidationErrorHandler] → ... → 500 fallback
//! ```
//!
//! Segments are validated in a fixed order, stopping at the first failure:
//!
//! | Step | Segment   | Notes                                  |
//! |------|-----------|----------------------------------------|
//! | 1    | `headers` |                                        |
//! | 2    | `params`  | Taken from the [`PathParams`] extension |
//! | 3    | `query`   |                                        |
//! | 4    | `body`    | Skipped for `GET` and `HEAD`           |
//!
//! ## Example
//!
//! ```
//! use krino_middleware::pipeline::Pipeline;
//! use krino_middleware::stages::{ValidationErrorHandler, ValidationMiddleware};
//! use krino_schema::{SchemaMap, ValidationOptions};
//! use serde_json::json;
//!
//! let validation = ValidationMiddleware::build(
//!     SchemaMap::new().body(json!({"type": "object", "required": ["name"]})),
//!     ValidationOptions::default(),
//! )
//! .unwrap();
//!
//! let pipeline = Pipeline::builder()
//!     .add_stage(validation)
//!     .add_error_handler(ValidationErrorHandler::new())
//!     .build();
//!
//! assert_eq!(pipeline.stage_names(), vec!["request_validation"]);
//! ```

#![doc(html_root_url = "https://docs.rs/krino-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod context;
pub mod error_handler;
pub mod extract;
pub mod middleware;
pub mod orchestrator;
pub mod pipeline;
pub mod stages;
pub mod types;
pub mod validator;

// Re-export main types at crate root
pub use context::MiddlewareContext;
pub use error_handler::{ErrorHandler, FnErrorHandler};
pub use extract::PathParams;
pub use middleware::{FnMiddleware, Middleware, MiddlewareResult, Next};
pub use orchestrator::{skips_body, Orchestrator};
pub use pipeline::{Pipeline, PipelineBuilder};
pub use stages::{ValidationErrorHandler, ValidationMiddleware};
pub use types::{Request, Response, ResponseExt};
pub use validator::SegmentValidator;
