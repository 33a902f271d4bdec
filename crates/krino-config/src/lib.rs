//! Typed configuration for Krino.
//!
//! - TOML and JSON configuration files
//! - Environment variable overrides (`KRINO__SECTION__KEY`)
//! - Strict parsing (fails on unknown fields)
//! - Schema maps checked and compiled at load time
//!
//! # Example
//!
//! ```no_run
//! use krino_config::ConfigLoader;
//!
//! # fn main() -> Result<(), krino_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_dotenv()?
//!     .with_optional_file("krino.toml")?
//!     .with_env_prefix("KRINO")
//!     .load()?;
//!
//! let registry = config.schema_registry()?;
//! # let _ = registry;
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [validation]
//! abort_early = true
//! convert = true
//! use_defaults = true
//! strip_unknown = false
//!
//! [logging]
//! enabled = true
//! level = "info"
//! format = "json"
//!
//! [schemas.params]
//! type = "object"
//! required = ["id"]
//! properties = { id = { type = "integer" } }
//! ```

#![doc(html_root_url = "https://docs.rs/krino-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;

pub use config::{KrinoConfig, LogFormat, LoggingConfig};
pub use error::ConfigError;
pub use loader::ConfigLoader;
