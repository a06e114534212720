#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
//! Shared HTTP DTOs for the Homed marketplace API.
//!
//! These types describe the `{ success, data }` envelope every endpoint
//! returns, the pagination block attached to list responses, and the property
//! summary rows rendered by listing views. Conversions into controller types
//! live in `homed-client` so this crate stays a plain contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Standard response envelope returned by the marketplace API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiEnvelope<T> {
    /// Whether the server considers the request successful.
    pub success: bool,
    /// Payload when the request succeeded.
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Error summary when the request failed.
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Optional human-readable message.
    pub message: Option<String>,
}

impl<T> ApiEnvelope<T> {
    /// Wrap a successful payload.
    #[must_use]
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            message: None,
        }
    }

    /// Build a failed envelope carrying an error summary.
    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            message: None,
        }
    }

    /// Extract the payload when `success` is set and data is present.
    ///
    /// # Errors
    /// Returns the server's error summary (or a generic message) otherwise.
    pub fn into_data(self) -> Result<T, String> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            (true, None) => Err("response reported success without data".to_string()),
            (false, _) => Err(self
                .error
                .or(self.message)
                .unwrap_or_else(|| "request was not successful".to_string())),
        }
    }
}

/// Pagination block attached to list responses.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct PaginationInfo {
    /// Total matching records across all pages.
    pub total: u64,
    /// Number of pages at the requested page size.
    pub pages: u32,
    #[serde(alias = "current_page")]
    /// Page number the payload corresponds to (1-based).
    pub page: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Page size echoed back by the server.
    pub per_page: Option<u32>,
}

/// Paginated list payload; property endpoints name the collection `properties`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListPayload<T> {
    #[serde(alias = "properties")]
    /// Rows on the current page.
    pub items: Vec<T>,
    /// Pagination metadata; absent on some legacy endpoints.
    pub pagination: Option<PaginationInfo>,
}

/// Suggestion index selector sent as the `kind` query parameter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionIndex {
    /// UK postcode index.
    Postcode,
    /// Town, city and area names.
    Place,
}

impl SuggestionIndex {
    /// Query-string form of the index.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Postcode => "postcode",
            Self::Place => "place",
        }
    }
}

/// Listing row returned by the property search endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PropertySummary {
    #[serde(default, deserialize_with = "id_from_number_or_string")]
    /// Listing identifier (numeric ids are rendered as strings; empty when absent).
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    /// Headline shown on the listing card.
    pub title: String,
    #[serde(default)]
    /// Asking price or monthly rent in pounds.
    pub price: Option<f64>,
    #[serde(default)]
    /// `sale` or `rent`.
    pub listing_type: Option<String>,
    #[serde(default)]
    /// House, flat, bungalow, ...
    pub property_type: Option<String>,
    #[serde(default)]
    /// Bedroom count.
    pub bedrooms: Option<u8>,
    #[serde(default)]
    /// Bathroom count.
    pub bathrooms: Option<u8>,
    #[serde(default)]
    /// Street line of the address.
    pub street: Option<String>,
    #[serde(default)]
    /// Town or city.
    pub city: Option<String>,
    #[serde(default)]
    /// Full postcode.
    pub postcode: Option<String>,
    #[serde(default)]
    /// County.
    pub county: Option<String>,
    #[serde(default)]
    /// Property passport rating (0-10).
    pub passport_rating: Option<u8>,
    #[serde(default, deserialize_with = "null_as_default")]
    /// Gallery image URLs.
    pub images: Vec<String>,
    #[serde(default)]
    /// Cover image used when no gallery is attached.
    pub primary_image_url: Option<String>,
    #[serde(default)]
    /// Creation timestamp.
    pub created_at: Option<DateTime<Utc>>,
}

impl PropertySummary {
    /// Normalise image URLs for display: https only, current image route, and a
    /// gallery that falls back to the primary image.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        let images = if self.images.is_empty() {
            self.primary_image_url.iter().cloned().collect()
        } else {
            std::mem::take(&mut self.images)
        };
        self.images = images.iter().map(|url| normalize_image_url(url)).collect();
        self.primary_image_url = self
            .primary_image_url
            .as_deref()
            .map(normalize_image_url);
        self
    }

    /// Single-line address built from the populated parts.
    #[must_use]
    pub fn address_line(&self) -> String {
        [&self.street, &self.city, &self.postcode]
            .into_iter()
            .filter_map(|part| part.as_deref())
            .filter(|part| !part.trim().is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Rewrite legacy image routes and upgrade plain http to https.
#[must_use]
pub fn normalize_image_url(url: &str) -> String {
    let rewritten = url.replace("/api/properties/images/", "/properties/images/");
    rewritten.strip_prefix("http://").map_or_else(
        || rewritten.clone(),
        |rest| format!("https://{rest}"),
    )
}

fn id_from_number_or_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(u64),
        Text(String),
    }

    Ok(match Option::<RawId>::deserialize(deserializer)? {
        Some(RawId::Number(value)) => value.to_string(),
        Some(RawId::Text(value)) => value,
        None => String::new(),
    })
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
