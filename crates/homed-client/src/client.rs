//! reqwest-backed suggestion and listing sources.
//!
//! # Design
//! - One `reqwest::Client` per `ApiClient`; clones share the connection pool.
//! - Every response is unwrapped from the `{ success, data }` envelope before
//!   it reaches the search crate.
//! - Endpoint URLs are rebuilt per request so paths can carry their own query.

use async_trait::async_trait;
use homed_api_models::{ApiEnvelope, ListPayload, PropertySummary};
use homed_config::ClientSettings;
use homed_search::{
    QueryDescriptor, ResultPage, ResultSource, SearchError, SuggestionKind, SuggestionSource,
};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::{ClientError, ClientResult};
use crate::params::{listing_params, suggestion_index};

const MAX_ERROR_BODY: usize = 200;

/// Thin client for the marketplace search endpoints.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    suggestions_path: String,
    listings_path: String,
    fixed_params: Vec<(String, String)>,
}

impl ApiClient {
    /// Build a client with its own connection pool and the configured timeout.
    ///
    /// # Errors
    /// Returns [`ClientError::Build`] when the TLS backend cannot initialise.
    pub fn new(settings: &ClientSettings) -> ClientResult<Self> {
        let http = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|source| ClientError::Build { source })?;
        Ok(Self::with_http(http, settings))
    }

    /// Reuse an existing HTTP client (for shared headers or pools).
    #[must_use]
    pub fn with_http(http: Client, settings: &ClientSettings) -> Self {
        Self {
            http,
            base_url: settings.api_url.trim_end_matches('/').to_string(),
            suggestions_path: settings.suggestions_path.clone(),
            listings_path: settings.listings_path.clone(),
            fixed_params: vec![("status".to_string(), "active".to_string())],
        }
    }

    /// Add a parameter sent with every listing request.
    #[must_use]
    pub fn with_fixed_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.fixed_params.retain(|(existing, _)| *existing != name);
        self.fixed_params.push((name, value.into()));
        self
    }

    /// Base URL requests are issued against.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fully qualified suggestion URL for `partial`.
    ///
    /// # Errors
    /// Returns [`ClientError::InvalidUrl`] when the base URL and path do not parse.
    pub fn suggestions_url(&self, partial: &str, kind: SuggestionKind) -> ClientResult<Url> {
        let mut url = self.endpoint(&self.suggestions_path)?;
        url.query_pairs_mut()
            .append_pair("partial", partial)
            .append_pair("kind", suggestion_index(kind).as_str());
        Ok(url)
    }

    /// Fully qualified listing URL for `query`.
    ///
    /// # Errors
    /// Returns [`ClientError::InvalidUrl`] when the base URL and path do not parse.
    pub fn listings_url(&self, query: &QueryDescriptor) -> ClientResult<Url> {
        let mut url = self.endpoint(&self.listings_path)?;
        {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in listing_params(query) {
                pairs.append_pair(name, &value);
            }
            for (name, value) in &self.fixed_params {
                pairs.append_pair(name, value);
            }
        }
        Ok(url)
    }

    /// Fetch suggestions for an already normalized partial.
    ///
    /// # Errors
    /// Returns [`ClientError`] on transport, status, envelope or decode failures.
    pub async fn suggestions(
        &self,
        partial: &str,
        kind: SuggestionKind,
    ) -> ClientResult<Vec<String>> {
        let url = self.suggestions_url(partial, kind)?;
        debug!(partial, kind = kind.as_str(), "requesting suggestions");
        self.get_envelope(&self.suggestions_path, url).await
    }

    /// Fetch one page of property listings.
    ///
    /// When the server omits pagination the page is assumed to be the only one.
    ///
    /// # Errors
    /// Returns [`ClientError`] on transport, status, envelope or decode failures.
    pub async fn listings(
        &self,
        query: &QueryDescriptor,
    ) -> ClientResult<ResultPage<PropertySummary>> {
        let url = self.listings_url(query)?;
        debug!(
            page = query.page().get(),
            per_page = query.page_size().get(),
            "requesting listings"
        );
        let payload: ListPayload<PropertySummary> =
            self.get_envelope(&self.listings_path, url).await?;
        let items: Vec<PropertySummary> = payload
            .items
            .into_iter()
            .map(PropertySummary::normalized)
            .collect();
        Ok(match payload.pagination {
            Some(pagination) => ResultPage {
                items,
                total_count: pagination.total,
                total_pages: pagination.pages,
                current_page: pagination.page,
            },
            None => ResultPage {
                total_count: u64::try_from(items.len()).unwrap_or(u64::MAX),
                total_pages: u32::from(!items.is_empty()),
                current_page: query.page().get(),
                items,
            },
        })
    }

    fn endpoint(&self, path: &str) -> ClientResult<Url> {
        let raw = format!("{}{path}", self.base_url);
        Url::parse(&raw).map_err(|source| ClientError::InvalidUrl { url: raw, source })
    }

    async fn get_envelope<T>(&self, endpoint: &str, url: Url) -> ClientResult<T>
    where
        T: DeserializeOwned,
    {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                endpoint: endpoint.to_string(),
                source,
            })?;
        let response = ensure_success(endpoint, response).await?;
        let envelope: ApiEnvelope<T> =
            response.json().await.map_err(|source| ClientError::Decode {
                endpoint: endpoint.to_string(),
                source,
            })?;
        envelope.into_data().map_err(|message| ClientError::Rejected {
            endpoint: endpoint.to_string(),
            message,
        })
    }
}

async fn ensure_success(endpoint: &str, response: Response) -> ClientResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let body: String = body.trim().chars().take(MAX_ERROR_BODY).collect();
    Err(ClientError::Status {
        endpoint: endpoint.to_string(),
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl SuggestionSource for ApiClient {
    async fn suggest(
        &self,
        partial: &str,
        kind: SuggestionKind,
    ) -> Result<Vec<String>, SearchError> {
        self.suggestions(partial, kind).await.map_err(SearchError::from)
    }
}

#[async_trait]
impl ResultSource<PropertySummary> for ApiClient {
    async fn fetch_page(
        &self,
        query: &QueryDescriptor,
    ) -> Result<ResultPage<PropertySummary>, SearchError> {
        self.listings(query).await.map_err(SearchError::from)
    }
}
