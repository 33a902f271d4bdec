//! Validation stages.
//!
//! - [`validation`] - Validates request segments before the handler runs
//! - [`error_normalization`] - Turns validation failures into 400 responses

pub mod error_normalization;
pub mod validation;

pub use error_normalization::{to_error_response, ValidationErrorHandler};
pub use validation::ValidationMiddleware;
