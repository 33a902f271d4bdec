//! Options forwarded to every schema engine call.

use serde::{Deserialize, Serialize};

/// Options passed verbatim to the schema engine for every segment.
///
/// The validation core never reads these; their effect is entirely up to
/// the engine. [`JsonSchemaEngine`](crate::JsonSchemaEngine) honours all of
/// them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidationOptions {
    /// Stop at the first violation instead of collecting all of them.
    pub abort_early: bool,

    /// Coerce string scalars into the numeric or boolean type the schema asks for.
    pub convert: bool,

    /// Fill missing values from the schema's `default` keywords.
    pub use_defaults: bool,

    /// Remove object keys the schema does not declare.
    pub strip_unknown: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            abort_early: true,
            convert: true,
            use_defaults: true,
            strip_unknown: false,
        }
    }
}

impl ValidationOptions {
    /// Sets whether to stop at the first violation.
    #[must_use]
    pub fn abort_early(mut self, abort_early: bool) -> Self {
        self.abort_early = abort_early;
        self
    }

    /// Sets whether string scalars are coerced.
    #[must_use]
    pub fn convert(mut self, convert: bool) -> Self {
        self.convert = convert;
        self
    }

    /// Sets whether schema defaults are applied.
    #[must_use]
    pub fn use_defaults(mut self, use_defaults: bool) -> Self {
        self.use_defaults = use_defaults;
        self
    }

    /// Sets whether undeclared object keys are removed.
    #[must_use]
    pub fn strip_unknown(mut self, strip_unknown: bool) -> Self {
        self.strip_unknown = strip_unknown;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ValidationOptions::default();
        assert!(options.abort_early);
        assert!(options.convert);
        assert!(options.use_defaults);
        assert!(!options.strip_unknown);
    }

    #[test]
    fn test_builder_methods() {
        let options = ValidationOptions::default()
            .abort_early(false)
            .strip_unknown(true);
        assert!(!options.abort_early);
        assert!(options.strip_unknown);
    }

    #[test]
    fn test_partial_deserialization_keeps_defaults() {
        let options: ValidationOptions =
            serde_json::from_str(r#"{"strip_unknown": true}"#).unwrap();
        assert!(options.strip_unknown);
        assert!(options.abort_early);
    }

    #[test]
    fn test_unknown_option_rejected() {
        let result: Result<ValidationOptions, _> =
            serde_json::from_str(r#"{"allow_everything": true}"#);
        assert!(result.is_err());
    }
}
