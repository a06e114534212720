//! Validation helpers and parsing utilities for raw setting values.

use std::num::NonZeroU32;
use std::time::Duration;

use serde_json::Value;
use url::Url;

use crate::defaults;
use crate::error::{ConfigError, ConfigResult};

/// Parse a millisecond interval bounded by [`defaults::MAX_DELAY_MS`].
///
/// # Errors
/// Returns [`ConfigError::InvalidField`] when the value is not an integer or out of range.
pub fn parse_delay_ms(section: &str, field: &str, raw: &str) -> ConfigResult<Duration> {
    let millis = raw
        .trim()
        .parse::<u64>()
        .map_err(|_| ConfigError::invalid(section, field, Some(raw), "must be an integer"))?;
    if millis > defaults::MAX_DELAY_MS {
        return Err(ConfigError::invalid(
            section,
            field,
            Some(raw),
            "must be between 0 and 10000",
        ));
    }
    Ok(Duration::from_millis(millis))
}

/// Parse the minimum number of characters before suggestions are requested.
///
/// # Errors
/// Returns [`ConfigError::InvalidField`] when the value is not within `1..=32`.
pub fn parse_min_chars(section: &str, field: &str, raw: &str) -> ConfigResult<usize> {
    let chars = raw
        .trim()
        .parse::<usize>()
        .map_err(|_| ConfigError::invalid(section, field, Some(raw), "must be an integer"))?;
    if !(1..=defaults::MAX_SUGGEST_CHARS).contains(&chars) {
        return Err(ConfigError::invalid(
            section,
            field,
            Some(raw),
            "must be between 1 and 32",
        ));
    }
    Ok(chars)
}

/// Parse a page size within `1..=MAX_PAGE_SIZE`.
///
/// # Errors
/// Returns [`ConfigError::InvalidField`] when the value is zero, too large, or not numeric.
pub fn parse_page_size(section: &str, field: &str, raw: &str) -> ConfigResult<NonZeroU32> {
    let size = raw
        .trim()
        .parse::<u32>()
        .map_err(|_| ConfigError::invalid(section, field, Some(raw), "must be an integer"))?;
    if size > defaults::MAX_PAGE_SIZE {
        return Err(ConfigError::invalid(
            section,
            field,
            Some(raw),
            "must be between 1 and 100",
        ));
    }
    NonZeroU32::new(size)
        .ok_or_else(|| ConfigError::invalid(section, field, Some(raw), "must be between 1 and 100"))
}

/// Parse a comma-separated list of page sizes; duplicates are collapsed, order kept.
///
/// # Errors
/// Returns [`ConfigError::InvalidField`] when the list is empty or any entry is invalid.
pub fn parse_page_size_options(
    section: &str,
    field: &str,
    raw: &str,
) -> ConfigResult<Vec<NonZeroU32>> {
    let mut options = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let size = parse_page_size(section, field, part)?;
        if !options.contains(&size) {
            options.push(size);
        }
    }
    if options.is_empty() {
        return Err(ConfigError::invalid(
            section,
            field,
            Some(raw),
            "must list at least one page size",
        ));
    }
    Ok(options)
}

/// Parse a timeout in whole seconds within `1..=MAX_HTTP_TIMEOUT_SECS`.
///
/// # Errors
/// Returns [`ConfigError::InvalidField`] when the value is zero, too large, or not numeric.
pub fn parse_timeout_secs(section: &str, field: &str, raw: &str) -> ConfigResult<Duration> {
    let secs = raw
        .trim()
        .parse::<u64>()
        .map_err(|_| ConfigError::invalid(section, field, Some(raw), "must be an integer"))?;
    if !(1..=defaults::MAX_HTTP_TIMEOUT_SECS).contains(&secs) {
        return Err(ConfigError::invalid(
            section,
            field,
            Some(raw),
            "must be between 1 and 300",
        ));
    }
    Ok(Duration::from_secs(secs))
}

/// Validate an absolute http(s) API base URL and strip any trailing slash.
///
/// # Errors
/// Returns [`ConfigError::InvalidField`] for unparsable or non-http URLs.
pub fn parse_api_url(section: &str, field: &str, raw: &str) -> ConfigResult<String> {
    let trimmed = raw.trim();
    let url = Url::parse(trimmed)
        .map_err(|_| ConfigError::invalid(section, field, Some(raw), "must be an absolute URL"))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::invalid(
            section,
            field,
            Some(raw),
            "must use http or https",
        ));
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}

/// Normalise an endpoint path so it always starts with a single slash.
///
/// # Errors
/// Returns [`ConfigError::InvalidField`] when the path is blank or carries a query.
pub fn parse_endpoint_path(section: &str, field: &str, raw: &str) -> ConfigResult<String> {
    let trimmed = raw.trim().trim_start_matches('/');
    if trimmed.is_empty() {
        return Err(ConfigError::invalid(section, field, Some(raw), "must not be empty"));
    }
    if trimmed.contains('?') || trimmed.contains('#') {
        return Err(ConfigError::invalid(
            section,
            field,
            Some(raw),
            "must not contain a query or fragment",
        ));
    }
    Ok(format!("/{trimmed}"))
}

/// Validate a log format name.
///
/// # Errors
/// Returns [`ConfigError::InvalidField`] for anything other than `json` or `pretty`.
pub fn parse_log_format(section: &str, field: &str, raw: &str) -> ConfigResult<String> {
    let format = raw.trim().to_ascii_lowercase();
    match format.as_str() {
        "json" | "pretty" => Ok(format),
        _ => Err(ConfigError::invalid(
            section,
            field,
            Some(raw),
            "must be 'json' or 'pretty'",
        )),
    }
}

/// Validate a log level directive.
///
/// # Errors
/// Returns [`ConfigError::InvalidField`] when the directive is blank.
pub fn parse_log_level(section: &str, field: &str, raw: &str) -> ConfigResult<String> {
    let level = raw.trim();
    if level.is_empty() {
        return Err(ConfigError::invalid(section, field, Some(raw), "must not be empty"));
    }
    Ok(level.to_string())
}

/// Render a JSON patch value into the textual form the parsers accept.
#[must_use]
pub(crate) fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Array(items) => items
            .iter()
            .map(value_text)
            .collect::<Option<Vec<_>>>()
            .map(|parts| parts.join(",")),
        Value::Null | Value::Bool(_) | Value::Object(_) => None,
    }
}
