//! Canned pages, settings and API payloads.

use std::time::Duration;

use homed_api_models::PropertySummary;
use homed_config::SearchSettings;
use homed_search::ResultPage;
use homed_search::descriptor::PageSize;
use serde_json::{Value, json};

/// Build a page of `items` with the given totals.
#[must_use]
pub fn page_of<T>(
    items: Vec<T>,
    total_count: u64,
    current_page: u32,
    page_size: u32,
) -> ResultPage<T> {
    let total_pages =
        u32::try_from(total_count.div_ceil(u64::from(page_size.max(1)))).unwrap_or(u32::MAX);
    ResultPage {
        items,
        total_count,
        total_pages,
        current_page,
    }
}

/// Page of `count` string rows labelled `"{label}-{n}"`.
#[must_use]
pub fn labelled_page(
    label: &str,
    count: usize,
    total_count: u64,
    current_page: u32,
) -> ResultPage<String> {
    let items = (1..=count).map(|n| format!("{label}-{n}")).collect();
    let page_size = u32::try_from(count.max(1)).unwrap_or(u32::MAX);
    page_of(items, total_count, current_page, page_size)
}

/// Search settings with the documented default timings.
#[must_use]
pub fn search_settings() -> SearchSettings {
    SearchSettings::default()
}

/// Search settings with explicit debounce and idle intervals.
#[must_use]
pub fn search_settings_with(suggest_debounce: Duration, commit_idle: Duration) -> SearchSettings {
    SearchSettings {
        suggest_debounce,
        commit_idle,
        ..search_settings()
    }
}

/// A page size known to be valid.
///
/// # Panics
/// Panics when `value` is outside the accepted range.
#[must_use]
pub fn page_size(value: u32) -> PageSize {
    PageSize::new(value).unwrap_or_else(|err| panic!("invalid fixture page size: {err}"))
}

/// A listing row as returned by the property endpoint.
#[must_use]
pub fn listing_json(id: u64, title: &str, city: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "price": 250_000.0,
        "listing_type": "sale",
        "property_type": "house",
        "bedrooms": 3,
        "bathrooms": 1,
        "street": format!("{id} High Street"),
        "city": city,
        "postcode": "LS1 1AA",
        "passport_rating": 4,
        "images": [format!("http://cdn.homed.test/api/properties/images/{id}.jpg")],
        "created_at": "2024-05-01T12:00:00Z"
    })
}

/// Successful list envelope wrapping `rows`.
#[must_use]
pub fn listings_envelope(rows: Vec<Value>, total: u64, pages: u32, page: u32) -> Value {
    json!({
        "success": true,
        "data": {
            "properties": rows,
            "pagination": {"total": total, "pages": pages, "page": page}
        }
    })
}

/// Successful suggestion envelope.
#[must_use]
pub fn suggestions_envelope(values: &[&str]) -> Value {
    json!({"success": true, "data": values})
}

/// A decoded listing row.
///
/// # Panics
/// Panics if the fixture JSON stops matching [`PropertySummary`].
#[must_use]
pub fn listing(id: u64, title: &str, city: &str) -> PropertySummary {
    serde_json::from_value(listing_json(id, title, city))
        .unwrap_or_else(|err| panic!("listing fixture should decode: {err}"))
}
