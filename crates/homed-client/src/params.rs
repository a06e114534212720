//! Mapping from search descriptors to API query parameters.

use homed_api_models::SuggestionIndex;
use homed_search::{QueryDescriptor, SuggestionKind};

/// Query parameters for the property listing endpoint, in request order.
///
/// Unset filters are omitted. `page` and `per_page` are always sent.
#[must_use]
pub fn listing_params(query: &QueryDescriptor) -> Vec<(&'static str, String)> {
    let filters = query.filters();
    let mut params = Vec::new();
    if let Some(text) = query.free_text() {
        params.push(("location", text.to_string()));
    }
    if let Some(listing_type) = filters.listing_type() {
        params.push(("listing_type", listing_type.as_str().to_string()));
    }
    if let Some(min) = filters.price().min() {
        params.push(("min_price", min.to_string()));
    }
    if let Some(max) = filters.price().max() {
        params.push(("max_price", max.to_string()));
    }
    if let Some(bedrooms) = filters.bedrooms() {
        params.push(("bedrooms", bedrooms.to_string()));
    }
    if let Some(rating) = filters.passport_rating() {
        params.push(("passport_rating", rating.to_string()));
    }
    params.extend(
        filters
            .property_types()
            .iter()
            .map(|kind| ("property_type", kind.as_str().to_string())),
    );
    params.push(("page", query.page().to_string()));
    params.push(("per_page", query.page_size().get().to_string()));
    params
}

/// Suggestion index queried for a classified input.
#[must_use]
pub const fn suggestion_index(kind: SuggestionKind) -> SuggestionIndex {
    match kind {
        SuggestionKind::Postcode => SuggestionIndex::Postcode,
        SuggestionKind::PlaceName => SuggestionIndex::Place,
    }
}
