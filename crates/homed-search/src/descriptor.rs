//! The immutable query descriptor.
//!
//! # Design
//! - A descriptor is the single source of truth for what a listing view shows:
//!   committed free text, structured filters and pagination.
//! - Every change yields a new value; equality is structural, so observers can
//!   tell "changed" from "unchanged" with `==`.
//! - Changing anything that affects the result set resets the page to 1. A
//!   change that turns out to be a no-op returns the descriptor untouched.

use std::num::NonZeroU32;

use homed_config::defaults::{MAX_PAGE_SIZE, PAGE_SIZE};
use serde::Serialize;

use crate::error::ValidationError;
use crate::filters::{FilterChange, FilterKey, StructuredFilters};

/// A page size between 1 and [`MAX_PAGE_SIZE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PageSize(NonZeroU32);

impl PageSize {
    /// Page size used when nothing else is configured.
    pub const DEFAULT: Self = match NonZeroU32::new(PAGE_SIZE) {
        Some(size) => Self(size),
        None => Self(NonZeroU32::MIN),
    };

    /// Validate a raw page size.
    ///
    /// # Errors
    /// Returns [`ValidationError::OutOfRange`] outside `1..=MAX_PAGE_SIZE`.
    pub fn new(value: u32) -> Result<Self, ValidationError> {
        NonZeroU32::new(value)
            .filter(|size| size.get() <= MAX_PAGE_SIZE)
            .map(Self)
            .ok_or(ValidationError::OutOfRange {
                field: "page size",
                value: u64::from(value),
                min: 1,
                max: u64::from(MAX_PAGE_SIZE),
            })
    }

    /// Numeric value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<NonZeroU32> for PageSize {
    type Error = ValidationError;

    fn try_from(value: NonZeroU32) -> Result<Self, Self::Error> {
        Self::new(value.get())
    }
}

/// Committed search state of one listing view.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct QueryDescriptor {
    free_text: Option<String>,
    filters: StructuredFilters,
    page: NonZeroU32,
    page_size: PageSize,
}

impl QueryDescriptor {
    /// Empty query on page 1.
    #[must_use]
    pub fn new(page_size: PageSize) -> Self {
        Self::from_parts(None, StructuredFilters::default(), NonZeroU32::MIN, page_size)
    }

    pub(crate) const fn from_parts(
        free_text: Option<String>,
        filters: StructuredFilters,
        page: NonZeroU32,
        page_size: PageSize,
    ) -> Self {
        Self {
            free_text,
            filters,
            page,
            page_size,
        }
    }

    /// Committed free text, trimmed and never empty.
    #[must_use]
    pub fn free_text(&self) -> Option<&str> {
        self.free_text.as_deref()
    }

    /// Active structured filters.
    #[must_use]
    pub const fn filters(&self) -> &StructuredFilters {
        &self.filters
    }

    /// Current 1-based page.
    #[must_use]
    pub const fn page(&self) -> NonZeroU32 {
        self.page
    }

    /// Items per page.
    #[must_use]
    pub const fn page_size(&self) -> PageSize {
        self.page_size
    }

    /// Replace the free text; blank input clears it.
    #[must_use]
    pub fn with_free_text(&self, raw: &str) -> Self {
        let free_text = normalize_free_text(raw);
        self.rescoped(|next| next.free_text = free_text)
    }

    /// Apply one filter change.
    ///
    /// # Errors
    /// Returns [`ValidationError`] when the change is rejected by the filters.
    pub fn with_filter(&self, change: FilterChange) -> Result<Self, ValidationError> {
        let filters = self.filters.apply(change)?;
        Ok(self.with_filters(filters))
    }

    /// Clear the filter named by `key`.
    #[must_use]
    pub fn without_filter(&self, key: FilterKey) -> Self {
        self.with_filters(self.filters.without(key))
    }

    /// Replace every structured filter at once.
    #[must_use]
    pub fn with_filters(&self, filters: StructuredFilters) -> Self {
        self.rescoped(|next| next.filters = filters)
    }

    /// Change the page size.
    #[must_use]
    pub fn with_page_size(&self, page_size: PageSize) -> Self {
        self.rescoped(|next| next.page_size = page_size)
    }

    /// Move to another page without touching anything else.
    #[must_use]
    pub fn with_page(&self, page: NonZeroU32) -> Self {
        Self {
            page,
            ..self.clone()
        }
    }

    /// Drop free text and filters, keeping the page size.
    #[must_use]
    pub fn cleared(&self) -> Self {
        self.rescoped(|next| {
            next.free_text = None;
            next.filters = StructuredFilters::default();
        })
    }

    fn rescoped(&self, change: impl FnOnce(&mut Self)) -> Self {
        let mut next = self.clone();
        change(&mut next);
        if next.free_text != self.free_text
            || next.filters != self.filters
            || next.page_size != self.page_size
        {
            next.page = NonZeroU32::MIN;
        }
        next
    }
}

/// Trim free text, mapping blank input to `None`.
#[must_use]
pub fn normalize_free_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{ListingType, PriceRange};

    fn size(value: u32) -> PageSize {
        PageSize::new(value).unwrap_or_else(|err| panic!("page size: {err}"))
    }

    fn page(value: u32) -> NonZeroU32 {
        NonZeroU32::new(value).unwrap_or(NonZeroU32::MIN)
    }

    #[test]
    fn page_size_bounds_are_enforced() {
        assert!(PageSize::new(0).is_err());
        assert!(PageSize::new(101).is_err());
        assert_eq!(size(100).get(), 100);
    }

    #[test]
    fn scope_changes_reset_the_page() {
        let base = QueryDescriptor::new(size(10)).with_page(page(3));
        assert_eq!(base.page().get(), 3);

        assert_eq!(base.with_page_size(size(25)).page().get(), 1);
        assert_eq!(base.with_free_text("Leeds").page().get(), 1);
        let filtered = base
            .with_filter(FilterChange::ListingType(ListingType::Rent))
            .unwrap_or_else(|err| panic!("filter: {err}"));
        assert_eq!(filtered.page().get(), 1);
    }

    #[test]
    fn page_changes_keep_everything_else() {
        let base = QueryDescriptor::new(size(10)).with_free_text("Leeds");
        let moved = base.with_page(page(4));
        assert_eq!(moved.free_text(), Some("Leeds"));
        assert_eq!(moved.page_size(), size(10));
        assert_eq!(moved.page().get(), 4);
    }

    #[test]
    fn no_op_changes_keep_the_page() {
        let base = QueryDescriptor::new(size(10))
            .with_free_text("Leeds")
            .with_page(page(2));
        assert_eq!(base.with_free_text("  Leeds "), base);
        assert_eq!(base.with_page_size(size(10)), base);
        assert_eq!(base.without_filter(FilterKey::Bedrooms), base);
    }

    #[test]
    fn free_text_is_trimmed_and_blank_clears() {
        let base = QueryDescriptor::new(size(10));
        assert_eq!(base.with_free_text("  York  ").free_text(), Some("York"));
        assert_eq!(base.with_free_text("York").with_free_text("   ").free_text(), None);
    }

    #[test]
    fn cleared_keeps_page_size_only() {
        let busy = QueryDescriptor::new(size(25))
            .with_free_text("Bath")
            .with_filter(FilterChange::Price(
                PriceRange::new(Some(1), Some(2)).unwrap_or_default(),
            ))
            .unwrap_or_else(|err| panic!("filter: {err}"))
            .with_page(page(5));
        let cleared = busy.cleared();
        assert_eq!(cleared, QueryDescriptor::new(size(25)));
    }

    #[test]
    fn rejected_filters_leave_no_descriptor() {
        let base = QueryDescriptor::new(size(10));
        assert!(base.with_filter(FilterChange::Bedrooms(0)).is_err());
    }
}
