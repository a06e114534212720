//! Shared HTTP client, error types and request tracing for the CLI.

use std::fmt::{self, Display, Formatter};

use anyhow::anyhow;
use homed_client::ApiClient;
use homed_config::{AppConfig, ConfigError};
use homed_search::{SearchError, ValidationError};
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderValue};

use crate::cli::OutputFormat;

pub(crate) const HEADER_REQUEST_ID: &str = "x-request-id";

/// CLI-level error type to distinguish validation from operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

impl From<ValidationError> for CliError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self::Validation(format!("invalid configuration: {err}"))
    }
}

impl From<SearchError> for CliError {
    fn from(err: SearchError) -> Self {
        Self::Failure(anyhow!(err))
    }
}

/// Application context passed to command handlers.
#[derive(Debug, Clone)]
pub(crate) struct AppContext {
    pub(crate) config: AppConfig,
    pub(crate) api: ApiClient,
    pub(crate) output: OutputFormat,
}

impl AppContext {
    /// Build the API client; every request carries `trace_id` as its request id.
    pub(crate) fn new(config: AppConfig, output: OutputFormat, trace_id: &str) -> CliResult<Self> {
        let mut default_headers = HeaderMap::new();
        let request_id = HeaderValue::from_str(trace_id).map_err(|_| {
            CliError::failure(anyhow!("trace identifier contains invalid characters"))
        })?;
        default_headers.insert(HEADER_REQUEST_ID, request_id);

        let http = Client::builder()
            .timeout(config.client.timeout)
            .default_headers(default_headers)
            .build()
            .map_err(|err| CliError::failure(anyhow!("failed to build HTTP client: {err}")))?;

        let api = ApiClient::with_http(http, &config.client);
        Ok(Self {
            config,
            api,
            output,
        })
    }
}
