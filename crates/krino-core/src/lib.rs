//! # Krino Core
//!
//! Core types shared by every Krino crate:
//!
//! - [`Segment`] - The four validated request parts (headers, params, query, body)
//! - [`SegmentMap`] - A fixed table holding at most one value per segment
//! - [`RequestParts`] - The per-request carrier that validation reads and rewrites
//! - [`ValidationFailure`] - A schema rejection tagged with the segment that produced it
//! - [`ErrorResponse`] - The stable 400 payload built from a failure

#![doc(html_root_url = "https://docs.rs/krino-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod escape;
mod failure;
mod request;
mod response;
mod segment;

use std::future::Future;
use std::pin::Pin;

pub use escape::escape_html;
pub use failure::{EngineFailure, FailureDetail, FailureMeta, PathKey, ValidationFailure};
pub use request::RequestParts;
pub use response::{ErrorResponse, ValidationInfo};
pub use segment::{Segment, SegmentMap, UnknownSegment};

/// A boxed, sendable future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Type-erased error travelling through the middleware error chain.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;
