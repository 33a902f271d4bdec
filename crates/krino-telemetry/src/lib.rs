//! Logging setup for Krino.
//!
//! Krino crates only emit `tracing` events; this crate installs a
//! `tracing-subscriber` that writes them as JSON (production) or pretty text
//! (development), filtered by an `EnvFilter` directive.
//!
//! ```rust,ignore
//! use krino_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::production())?;
//! ```

#![doc(html_root_url = "https://docs.rs/krino-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, fields, init_logging, LogConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
