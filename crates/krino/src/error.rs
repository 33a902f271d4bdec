//! Facade error type.

use krino_config::ConfigError;
use krino_schema::SchemaError;
use krino_telemetry::TelemetryError;
use thiserror::Error;

/// Errors raised while setting up Krino.
///
/// Request-time validation failures are not represented here; they travel
/// through the middleware error chain as
/// [`ValidationFailure`](krino_core::ValidationFailure).
#[derive(Debug, Error)]
pub enum KrinoError {
    /// The schema map is malformed or a schema failed to compile.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Logging could not be initialized.
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
}

/// Result type for Krino setup.
pub type KrinoResult<T> = Result<T, KrinoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errors_are_transparent() {
        let err = KrinoError::from(TelemetryError::LoggingInit("already set".into()));
        assert_eq!(err.to_string(), "Failed to initialize logging: already set");

        let err = KrinoError::from(ConfigError::file_not_found("krino.toml"));
        assert!(matches!(err, KrinoError::Config(_)));
    }
}
