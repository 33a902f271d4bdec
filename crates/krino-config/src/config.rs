//! Main configuration types.

use krino_schema::{SchemaMap, SchemaRegistry, ValidationOptions};
use krino_telemetry::LogConfig;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ConfigError;

/// Complete Krino configuration.
///
/// # Example
///
/// ```
/// use krino_config::KrinoConfig;
///
/// let config = KrinoConfig::default();
/// assert!(config.validation.abort_early);
/// assert!(config.schemas.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct KrinoConfig {
    /// Options handed to every schema engine call.
    #[serde(default)]
    pub validation: ValidationOptions,

    /// Schema map keyed by segment name (`headers`, `params`, `query`, `body`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schemas: Option<Value>,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl KrinoConfig {
    /// Development preset: pretty debug logs.
    #[must_use]
    pub fn development() -> Self {
        Self {
            logging: LoggingConfig {
                level: "debug".to_string(),
                format: LogFormat::Pretty,
                ansi_enabled: true,
                include_location: true,
                ..LoggingConfig::default()
            },
            ..Self::default()
        }
    }

    /// Production preset: JSON info logs.
    #[must_use]
    pub fn production() -> Self {
        Self::default()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - `schemas` is not a valid schema map, or a schema fails to compile
    /// - `logging.level` is not a valid filter directive
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.schema_registry()?;

        if self.logging.enabled {
            krino_telemetry::create_env_filter(&self.logging.level)
                .map_err(|e| ConfigError::invalid_value("logging.level", e.to_string()))?;
        }

        Ok(())
    }

    /// The configured schema map, or an empty map when none is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if `schemas` is not a valid schema map.
    pub fn schema_map(&self) -> Result<SchemaMap, ConfigError> {
        match &self.schemas {
            None => Ok(SchemaMap::new()),
            Some(schemas) => SchemaMap::from_value(schemas.clone())
                .map_err(|e| ConfigError::invalid_value("schemas", e.to_string())),
        }
    }

    /// Compiles the configured schema map.
    ///
    /// # Errors
    ///
    /// Returns an error if the map is invalid or a schema fails to compile.
    pub fn schema_registry(&self) -> Result<SchemaRegistry, ConfigError> {
        SchemaRegistry::compile(self.schema_map()?)
            .map_err(|e| ConfigError::invalid_value("schemas", e.to_string()))
    }

    /// The logging section as a subscriber configuration.
    #[must_use]
    pub fn log_config(&self) -> LogConfig {
        LogConfig::from(&self.logging)
    }
}

/// Log format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON formatted logs (production).
    #[default]
    Json,
    /// Human-readable pretty format (development).
    Pretty,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Filter directive (trace, debug, info, warn, error, or per-target).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include ANSI color codes in output.
    #[serde(default)]
    pub ansi_enabled: bool,

    /// Include source file and line in logs.
    #[serde(default)]
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
            ansi_enabled: false,
            include_location: false,
        }
    }
}

impl From<&LoggingConfig> for LogConfig {
    fn from(config: &LoggingConfig) -> Self {
        Self {
            enabled: config.enabled,
            level: config.level.clone(),
            json_format: config.format == LogFormat::Json,
            span_events: false,
            file_line_info: config.include_location,
            include_target: true,
            ansi: config.ansi_enabled,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}
