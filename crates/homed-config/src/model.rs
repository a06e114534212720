//! Typed settings consumed by the search controller, HTTP client and CLI.
//!
//! # Design
//! - Pure data carriers; parsing lives in `validate.rs`, sourcing in `loader.rs`.
//! - Every value is validated before it lands in one of these structs.

use std::num::NonZeroU32;
use std::time::Duration;

use serde::Serialize;

use crate::defaults;

/// Timing and paging tunables for one search controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchSettings {
    /// Delay between the last keystroke and the suggestion fetch.
    pub suggest_debounce: Duration,
    /// Quiet period after which typed input is committed.
    pub commit_idle: Duration,
    /// Minimum input length before suggestions are requested.
    pub min_suggest_chars: usize,
    /// Page size assumed when the URL omits `per_page`.
    pub default_page_size: NonZeroU32,
    /// Page sizes offered by the page-size selector.
    pub page_size_options: Vec<NonZeroU32>,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            suggest_debounce: Duration::from_millis(defaults::SUGGEST_DEBOUNCE_MS),
            commit_idle: Duration::from_millis(defaults::COMMIT_IDLE_MS),
            min_suggest_chars: defaults::MIN_SUGGEST_CHARS,
            default_page_size: NonZeroU32::new(defaults::PAGE_SIZE).unwrap_or(NonZeroU32::MIN),
            page_size_options: defaults::PAGE_SIZE_OPTIONS
                .iter()
                .copied()
                .filter_map(NonZeroU32::new)
                .collect(),
        }
    }
}

/// Connection settings for the marketplace REST API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientSettings {
    /// Absolute http(s) base URL without a trailing slash.
    pub api_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Suggestion endpoint path, appended to `api_url`.
    pub suggestions_path: String,
    /// Property listing endpoint path, appended to `api_url`.
    pub listings_path: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_url: defaults::API_URL.to_string(),
            timeout: Duration::from_secs(defaults::HTTP_TIMEOUT_SECS),
            suggestions_path: defaults::SUGGESTIONS_PATH.to_string(),
            listings_path: defaults::LISTINGS_PATH.to_string(),
        }
    }
}

/// Logging preferences handed to the telemetry initialiser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogSettings {
    /// Default filter directive (overridden by `RUST_LOG`).
    pub level: String,
    /// Explicit output format (`json` or `pretty`); inferred when absent.
    pub format: Option<String>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            format: None,
        }
    }
}

/// Complete configuration snapshot for a Homed process.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct AppConfig {
    /// Search controller tunables.
    pub search: SearchSettings,
    /// REST client settings.
    pub client: ClientSettings,
    /// Logging preferences.
    pub logging: LogSettings,
}
