//! Environment and JSON patch loading for [`AppConfig`].
//!
//! # Design
//! - Both sources funnel into `apply_field` so validation is identical.
//! - Environment keys map onto `(section, field)` pairs; patches name them directly.
//! - A failed load leaves no partially applied snapshot behind.

use serde_json::Value;
use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::model::AppConfig;
use crate::validate::{
    parse_api_url, parse_delay_ms, parse_endpoint_path, parse_log_format, parse_log_level,
    parse_min_chars, parse_page_size, parse_page_size_options, parse_timeout_secs, value_text,
};

/// Prefix shared by every recognised environment variable.
pub const ENV_PREFIX: &str = "HOMED_";

const ENV_FIELDS: [(&str, &str, &str); 11] = [
    ("HOMED_API_URL", "client", "api_url"),
    ("HOMED_HTTP_TIMEOUT_SECS", "client", "timeout_secs"),
    ("HOMED_SUGGESTIONS_PATH", "client", "suggestions_path"),
    ("HOMED_LISTINGS_PATH", "client", "listings_path"),
    ("HOMED_SUGGEST_DEBOUNCE_MS", "search", "suggest_debounce_ms"),
    ("HOMED_COMMIT_IDLE_MS", "search", "commit_idle_ms"),
    ("HOMED_MIN_SUGGEST_CHARS", "search", "min_suggest_chars"),
    ("HOMED_DEFAULT_PAGE_SIZE", "search", "default_page_size"),
    ("HOMED_PAGE_SIZE_OPTIONS", "search", "page_size_options"),
    ("HOMED_LOG_LEVEL", "logging", "level"),
    ("HOMED_LOG_FORMAT", "logging", "format"),
];

impl AppConfig {
    /// Load defaults overridden by `HOMED_*` process environment variables.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when any recognised variable fails validation.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_vars(std::env::vars())
    }

    /// Load defaults overridden by the supplied key/value pairs.
    ///
    /// Keys without the `HOMED_` prefix are ignored.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when any recognised variable fails validation.
    pub fn from_vars<I, K, V>(vars: I) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Self::default();
        for (key, value) in vars {
            let key = key.as_ref();
            if !key.starts_with(ENV_PREFIX) {
                continue;
            }
            match ENV_FIELDS.iter().find(|(name, _, _)| *name == key) {
                Some((_, section, field)) => config.apply_field(section, field, value.as_ref())?,
                None => debug!(key, "ignoring unrecognised environment variable"),
            }
        }
        Ok(config)
    }

    /// Apply a JSON patch such as `{"search": {"commit_idle_ms": 500}}`.
    ///
    /// The patch is applied atomically: on error `self` is left untouched.
    ///
    /// # Errors
    /// Returns [`ConfigError`] for non-object documents, unknown sections or
    /// fields, and values that fail validation.
    pub fn apply_patch(&mut self, patch: &Value) -> ConfigResult<()> {
        let sections = patch.as_object().ok_or(ConfigError::InvalidDocument {
            reason: "patch must be a JSON object",
        })?;
        let mut next = self.clone();
        for (section, fields) in sections {
            let fields = fields.as_object().ok_or_else(|| {
                ConfigError::invalid("root", section, None, "section must be a JSON object")
            })?;
            for (field, value) in fields {
                let raw = value_text(value).ok_or_else(|| {
                    ConfigError::invalid(
                        section,
                        field,
                        Some(value.to_string().as_str()),
                        "unsupported value type",
                    )
                })?;
                next.apply_field(section, field, &raw)?;
            }
        }
        *self = next;
        Ok(())
    }

    fn apply_field(&mut self, section: &str, field: &str, raw: &str) -> ConfigResult<()> {
        match (section, field) {
            ("client", "api_url") => self.client.api_url = parse_api_url(section, field, raw)?,
            ("client", "timeout_secs") => {
                self.client.timeout = parse_timeout_secs(section, field, raw)?;
            }
            ("client", "suggestions_path") => {
                self.client.suggestions_path = parse_endpoint_path(section, field, raw)?;
            }
            ("client", "listings_path") => {
                self.client.listings_path = parse_endpoint_path(section, field, raw)?;
            }
            ("search", "suggest_debounce_ms") => {
                self.search.suggest_debounce = parse_delay_ms(section, field, raw)?;
            }
            ("search", "commit_idle_ms") => {
                self.search.commit_idle = parse_delay_ms(section, field, raw)?;
            }
            ("search", "min_suggest_chars") => {
                self.search.min_suggest_chars = parse_min_chars(section, field, raw)?;
            }
            ("search", "default_page_size") => {
                self.search.default_page_size = parse_page_size(section, field, raw)?;
            }
            ("search", "page_size_options") => {
                self.search.page_size_options = parse_page_size_options(section, field, raw)?;
            }
            ("logging", "level") => self.logging.level = parse_log_level(section, field, raw)?,
            ("logging", "format") => {
                self.logging.format = Some(parse_log_format(section, field, raw)?);
            }
            ("client" | "search" | "logging", _) => {
                return Err(ConfigError::unknown(section, field));
            }
            _ => return Err(ConfigError::unknown("root", section)),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    #[test]
    fn env_overrides_apply_and_foreign_keys_are_ignored() {
        let config = AppConfig::from_vars([
            ("HOMED_COMMIT_IDLE_MS", "500"),
            ("HOMED_API_URL", "https://homes.example/api/"),
            ("HOMED_LOG_FORMAT", "json"),
            ("PATH", "/usr/bin"),
            ("HOMED_UNUSED_FLAG", "1"),
        ]);
        let config = match config {
            Ok(config) => config,
            Err(err) => panic!("config should load: {err}"),
        };
        assert_eq!(config.search.commit_idle, Duration::from_millis(500));
        assert_eq!(config.client.api_url, "https://homes.example/api");
        assert_eq!(config.logging.format.as_deref(), Some("json"));
    }

    #[test]
    fn invalid_env_value_is_reported_with_field() {
        let err = AppConfig::from_vars([("HOMED_DEFAULT_PAGE_SIZE", "0")]);
        assert!(matches!(
            err,
            Err(ConfigError::InvalidField { ref field, .. }) if field == "default_page_size"
        ));
    }

    #[test]
    fn patch_updates_sections() {
        let mut config = AppConfig::default();
        let patch = json!({
            "search": {"min_suggest_chars": 3, "page_size_options": [10, 20]},
            "client": {"timeout_secs": 30}
        });
        assert!(config.apply_patch(&patch).is_ok());
        assert_eq!(config.search.min_suggest_chars, 3);
        assert_eq!(config.search.page_size_options.len(), 2);
        assert_eq!(config.client.timeout, Duration::from_secs(30));
    }

    #[test]
    fn patch_is_atomic_on_error() {
        let mut config = AppConfig::default();
        let patch = json!({
            "search": {"commit_idle_ms": 100, "bogus": 1}
        });
        let err = config.apply_patch(&patch);
        assert!(matches!(err, Err(ConfigError::UnknownField { .. })));
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn patch_rejects_unknown_sections_and_shapes() {
        let mut config = AppConfig::default();
        assert!(matches!(
            config.apply_patch(&json!({"metrics": {"enabled": 1}})),
            Err(ConfigError::UnknownField { ref section, .. }) if section == "root"
        ));
        assert!(matches!(
            config.apply_patch(&json!([1, 2])),
            Err(ConfigError::InvalidDocument { .. })
        ));
        assert!(config.apply_patch(&json!({"search": 3})).is_err());
        assert!(config.apply_patch(&json!({"logging": {"level": true}})).is_err());
    }
}
