//! Error types for configuration loading.

use thiserror::Error;

/// Primary error type for configuration operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Field contained an invalid value.
    #[error("invalid value for '{field}' in '{section}': {reason}")]
    InvalidField {
        /// Section that failed validation.
        section: String,
        /// Field that failed validation.
        field: String,
        /// Offending value when available.
        value: Option<String>,
        /// Machine-readable reason for the failure.
        reason: &'static str,
    },
    /// Field did not exist in the target section.
    #[error("unknown field '{field}' in '{section}' settings")]
    UnknownField {
        /// Section where the unknown field was encountered.
        section: String,
        /// Name of the unexpected field.
        field: String,
    },
    /// Patch document was not shaped as expected.
    #[error("invalid settings document: {reason}")]
    InvalidDocument {
        /// Machine-readable reason for the failure.
        reason: &'static str,
    },
}

impl ConfigError {
    pub(crate) fn invalid(
        section: &str,
        field: &str,
        value: Option<&str>,
        reason: &'static str,
    ) -> Self {
        Self::InvalidField {
            section: section.to_string(),
            field: field.to_string(),
            value: value.map(str::to_string),
            reason,
        }
    }

    pub(crate) fn unknown(section: &str, field: &str) -> Self {
        Self::UnknownField {
            section: section.to_string(),
            field: field.to_string(),
        }
    }
}

/// Convenience alias for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_field_renders_context() {
        let err =
            ConfigError::invalid("search", "commit_idle_ms", Some("abc"), "must be an integer");
        assert_eq!(
            err.to_string(),
            "invalid value for 'commit_idle_ms' in 'search': must be an integer"
        );
        assert!(matches!(
            err,
            ConfigError::InvalidField { value: Some(ref v), .. } if v == "abc"
        ));
    }

    #[test]
    fn unknown_field_names_section() {
        let err = ConfigError::unknown("client", "proxy");
        assert_eq!(err.to_string(), "unknown field 'proxy' in 'client' settings");
    }
}
