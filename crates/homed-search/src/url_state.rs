//! Mirroring the query descriptor into a shareable query string.
//!
//! # Design
//! - [`UrlCodec`] is a pure mapping between descriptors and query strings;
//!   decoding an encoded descriptor yields an equal descriptor.
//! - Decoding is lenient: malformed or inverted values are dropped (and
//!   logged) instead of failing the mount.
//! - Older links that used `location`, `listingType` or `priceRange` still
//!   rehydrate; encoding always emits the canonical parameters.
//! - [`UrlSynchronizer`] replaces the current entry (never pushes) and skips
//!   writes whose serialisation did not change.

use std::collections::BTreeSet;
use std::num::NonZeroU32;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;
use url::form_urlencoded;

use crate::descriptor::{PageSize, QueryDescriptor, normalize_free_text};
use crate::filters::{FilterChange, FilterKey, PriceRange, StructuredFilters};
use crate::input::{parse_filter, parse_page, parse_page_size};

const PARAM_QUERY: &str = "q";
const PARAM_PAGE: &str = "page";
const PARAM_PAGE_SIZE: &str = "per_page";
const LEGACY_QUERY: &str = "location";

/// Maps descriptors to and from `application/x-www-form-urlencoded` text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UrlCodec {
    default_page_size: PageSize,
}

impl UrlCodec {
    /// Codec that omits `per_page` when it equals `default_page_size`.
    #[must_use]
    pub const fn new(default_page_size: PageSize) -> Self {
        Self { default_page_size }
    }

    /// Page size assumed when a query string does not name one.
    #[must_use]
    pub const fn default_page_size(&self) -> PageSize {
        self.default_page_size
    }

    /// Canonical query string (without a leading `?`).
    #[must_use]
    pub fn encode(&self, descriptor: &QueryDescriptor) -> String {
        let filters = descriptor.filters();
        let mut out = form_urlencoded::Serializer::new(String::new());
        if let Some(text) = descriptor.free_text() {
            out.append_pair(PARAM_QUERY, text);
        }
        if let Some(kind) = filters.listing_type() {
            out.append_pair(FilterKey::ListingType.as_str(), kind.as_str());
        }
        if let Some(min) = filters.price().min() {
            out.append_pair(FilterKey::MinPrice.as_str(), &min.to_string());
        }
        if let Some(max) = filters.price().max() {
            out.append_pair(FilterKey::MaxPrice.as_str(), &max.to_string());
        }
        if let Some(count) = filters.bedrooms() {
            out.append_pair(FilterKey::Bedrooms.as_str(), &count.to_string());
        }
        if let Some(rating) = filters.passport_rating() {
            out.append_pair(FilterKey::PassportRating.as_str(), &rating.to_string());
        }
        for kind in filters.property_types() {
            out.append_pair(FilterKey::PropertyTypes.as_str(), kind.as_str());
        }
        if descriptor.page() != NonZeroU32::MIN {
            out.append_pair(PARAM_PAGE, &descriptor.page().to_string());
        }
        if descriptor.page_size() != self.default_page_size {
            out.append_pair(PARAM_PAGE_SIZE, &descriptor.page_size().get().to_string());
        }
        out.finish()
    }

    /// Rebuild a descriptor from a query string; a leading `?` is ignored.
    #[must_use]
    pub fn decode(&self, query: &str) -> QueryDescriptor {
        let query = query.trim().trim_start_matches('?');
        let mut free_text = None;
        let mut legacy_text = None;
        let mut band = None;
        let mut min_price = None;
        let mut max_price = None;
        let mut property_types = BTreeSet::new();
        let mut changes = Vec::new();
        let mut page = NonZeroU32::MIN;
        let mut page_size = self.default_page_size;

        for (name, value) in form_urlencoded::parse(query.as_bytes()) {
            match name.as_ref() {
                PARAM_QUERY => free_text = normalize_free_text(&value),
                LEGACY_QUERY => legacy_text = normalize_free_text(&value),
                PARAM_PAGE => match parse_page(&value) {
                    Ok(parsed) => page = parsed,
                    Err(err) => debug!(error = %err, "ignoring page parameter"),
                },
                PARAM_PAGE_SIZE => match parse_page_size(&value) {
                    Ok(parsed) => page_size = parsed,
                    Err(err) => debug!(error = %err, "ignoring per_page parameter"),
                },
                other => match parse_filter(other, &value) {
                    Ok(FilterChange::Price(range)) => band = Some(range),
                    Ok(FilterChange::MinPrice(min)) => min_price = Some(min),
                    Ok(FilterChange::MaxPrice(max)) => max_price = Some(max),
                    Ok(FilterChange::PropertyTypes(kinds)) => property_types.extend(kinds),
                    Ok(change) => changes.push(change),
                    Err(err) => debug!(param = other, error = %err, "ignoring query parameter"),
                },
            }
        }

        let mut filters = StructuredFilters::default();
        for change in changes {
            filters = apply_or_skip(filters, change);
        }
        let min = min_price.or_else(|| band.and_then(|range| range.min()));
        let max = max_price.or_else(|| band.and_then(|range| range.max()));
        match PriceRange::new(min, max) {
            Ok(range) => filters = apply_or_skip(filters, FilterChange::Price(range)),
            Err(err) => debug!(error = %err, "ignoring price parameters"),
        }
        filters = apply_or_skip(filters, FilterChange::PropertyTypes(property_types));

        QueryDescriptor::from_parts(free_text.or(legacy_text), filters, page, page_size)
    }
}

fn apply_or_skip(filters: StructuredFilters, change: FilterChange) -> StructuredFilters {
    match filters.apply(change) {
        Ok(next) => next,
        Err(err) => {
            debug!(error = %err, "ignoring filter parameter");
            filters
        }
    }
}

/// Destination for the serialised descriptor, such as a browser history entry.
pub trait UrlSink: Send + Sync {
    /// Replace the current query string (no history entry is added).
    fn replace(&self, query: &str);
}

/// In-memory [`UrlSink`] recording every replacement.
#[derive(Debug, Clone, Default)]
pub struct MemoryUrl {
    writes: Arc<Mutex<Vec<String>>>,
}

impl MemoryUrl {
    /// Latest query string, or empty when nothing was written.
    #[must_use]
    pub fn current(&self) -> String {
        self.lock().last().cloned().unwrap_or_default()
    }

    /// Every replacement in order.
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<String>> {
        self.writes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl UrlSink for MemoryUrl {
    fn replace(&self, query: &str) {
        self.lock().push(query.to_string());
    }
}

/// Keeps a [`UrlSink`] in step with the current descriptor.
pub struct UrlSynchronizer {
    codec: UrlCodec,
    sink: Arc<dyn UrlSink>,
    last: Mutex<Option<String>>,
}

impl UrlSynchronizer {
    /// Synchroniser writing through `sink`.
    #[must_use]
    pub fn new(codec: UrlCodec, sink: Arc<dyn UrlSink>) -> Self {
        Self {
            codec,
            sink,
            last: Mutex::new(None),
        }
    }

    /// Codec used for both directions.
    #[must_use]
    pub const fn codec(&self) -> UrlCodec {
        self.codec
    }

    /// Decode the query string present at mount time.
    #[must_use]
    pub fn rehydrate(&self, query: &str) -> QueryDescriptor {
        let descriptor = self.codec.decode(query);
        debug!(query, "rehydrated descriptor from query string");
        descriptor
    }

    /// Write `descriptor` to the sink unless its serialisation is unchanged.
    ///
    /// Returns whether the sink was written.
    pub fn sync(&self, descriptor: &QueryDescriptor) -> bool {
        let encoded = self.codec.encode(descriptor);
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        if last.as_deref() == Some(encoded.as_str()) {
            return false;
        }
        self.sink.replace(&encoded);
        *last = Some(encoded);
        true
    }
}

impl std::fmt::Debug for UrlSynchronizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UrlSynchronizer")
            .field("codec", &self.codec)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{ListingType, PropertyType};

    fn codec() -> UrlCodec {
        UrlCodec::new(PageSize::new(10).unwrap_or_else(|err| panic!("page size: {err}")))
    }

    fn busy_descriptor() -> QueryDescriptor {
        let base = QueryDescriptor::new(codec().default_page_size()).with_free_text("St Albans");
        [
            FilterChange::ListingType(ListingType::Sale),
            FilterChange::MinPrice(300_000),
            FilterChange::MaxPrice(500_000),
            FilterChange::Bedrooms(3),
            FilterChange::PassportRating(4),
            FilterChange::PropertyTypes([PropertyType::Flat, PropertyType::House].into()),
        ]
        .into_iter()
        .try_fold(base, |acc, change| acc.with_filter(change))
        .unwrap_or_else(|err| panic!("filters: {err}"))
        .with_page_size(PageSize::new(25).unwrap_or_else(|err| panic!("page size: {err}")))
        .with_page(NonZeroU32::new(3).unwrap_or(NonZeroU32::MIN))
    }

    #[test]
    fn encoding_is_canonical() {
        assert_eq!(
            codec().encode(&busy_descriptor()),
            "q=St+Albans&type=sale&minPrice=300000&maxPrice=500000&bedrooms=3\
             &passportRating=4&propertyType=house&propertyType=flat&page=3&per_page=25"
        );
        assert_eq!(codec().encode(&QueryDescriptor::new(codec().default_page_size())), "");
    }

    #[test]
    fn decode_inverts_encode() {
        let descriptor = busy_descriptor();
        let encoded = codec().encode(&descriptor);
        assert_eq!(codec().decode(&encoded), descriptor);
        assert_eq!(codec().decode(&format!("?{encoded}")), descriptor);
    }

    #[test]
    fn legacy_parameters_rehydrate() {
        let decoded = codec().decode(
            "location=Leeds&listingType=rent&priceRange=%C2%A3300%2C000+-+%C2%A3500%2C000",
        );
        assert_eq!(decoded.free_text(), Some("Leeds"));
        assert_eq!(decoded.filters().listing_type(), Some(ListingType::Rent));
        assert_eq!(decoded.filters().price().min(), Some(300_000));
        assert_eq!(decoded.filters().price().max(), Some(500_000));
    }

    #[test]
    fn explicit_bounds_win_over_price_band() {
        let decoded =
            codec().decode("priceRange=100000-400000&minPrice=200000&q=York&location=Leeds");
        assert_eq!(decoded.filters().price().min(), Some(200_000));
        assert_eq!(decoded.filters().price().max(), Some(400_000));
        assert_eq!(decoded.free_text(), Some("York"));
    }

    #[test]
    fn malformed_values_are_dropped() {
        let decoded = codec().decode(
            "minPrice=lots&bedrooms=0&type=castle&page=-2&per_page=1000&propertyType=flat&utm=x",
        );
        let expected = QueryDescriptor::new(codec().default_page_size())
            .with_filter(FilterChange::PropertyTypes([PropertyType::Flat].into()))
            .unwrap_or_else(|err| panic!("filter: {err}"));
        assert_eq!(decoded, expected);
    }

    #[test]
    fn inverted_price_parameters_are_dropped_together() {
        let decoded = codec().decode("minPrice=500000&maxPrice=100000&bedrooms=2");
        assert!(decoded.filters().price().is_unbounded());
        assert_eq!(decoded.filters().bedrooms(), Some(2));
    }

    #[test]
    fn synchronizer_skips_unchanged_writes() {
        let sink = MemoryUrl::default();
        let sync = UrlSynchronizer::new(codec(), Arc::new(sink.clone()));
        let descriptor = sync.rehydrate("?q=Bath");
        assert!(sync.sync(&descriptor));
        assert!(!sync.sync(&descriptor));
        assert!(sync.sync(&descriptor.with_page(NonZeroU32::new(2).unwrap_or(NonZeroU32::MIN))));
        assert_eq!(sink.history(), vec!["q=Bath".to_string(), "q=Bath&page=2".to_string()]);
        assert_eq!(sink.current(), "q=Bath&page=2");
    }
}
