//! Default tunables and validation bounds for search settings.
//!
//! # Design
//! - The idle commit and suggestion thresholds are tunables, not contracts.
//! - Keep bounds next to defaults so validation and docs stay consistent.

/// Delay before a suggestion fetch fires after the last keystroke.
pub const SUGGEST_DEBOUNCE_MS: u64 = 300;
/// Quiet period after which typed input is committed automatically.
pub const COMMIT_IDLE_MS: u64 = 800;
/// Minimum input length (in characters) before suggestions are requested.
pub const MIN_SUGGEST_CHARS: usize = 2;
/// Page size used when the URL does not specify one.
pub const PAGE_SIZE: u32 = 10;
/// Page sizes offered to the page-size selector.
pub const PAGE_SIZE_OPTIONS: [u32; 5] = [5, 10, 15, 25, 50];
/// Largest page size accepted from any input.
pub const MAX_PAGE_SIZE: u32 = 100;
/// Upper bound for any debounce or idle interval.
pub const MAX_DELAY_MS: u64 = 10_000;
/// Upper bound for the minimum suggestion length.
pub const MAX_SUGGEST_CHARS: usize = 32;

/// Base URL of the marketplace REST API.
pub const API_URL: &str = "http://127.0.0.1:5000/api";
/// HTTP request timeout in seconds.
pub const HTTP_TIMEOUT_SECS: u64 = 10;
/// Upper bound for the HTTP request timeout.
pub const MAX_HTTP_TIMEOUT_SECS: u64 = 300;
/// Path of the suggestion endpoint relative to the API base.
pub const SUGGESTIONS_PATH: &str = "/search/suggestions";
/// Path of the property listing endpoint relative to the API base.
pub const LISTINGS_PATH: &str = "/properties";

/// Log level used when neither configuration nor `RUST_LOG` set one.
pub const LOG_LEVEL: &str = "info";
