//! Parsers for raw widget and command-line values.
//!
//! Everything that reaches a [`QueryDescriptor`](crate::QueryDescriptor) as a
//! filter or paging value passes through one of these functions first, so a
//! non-numeric price or an unknown option is reported here rather than
//! silently dropped further down.

use std::collections::BTreeSet;
use std::num::NonZeroU32;

use crate::descriptor::PageSize;
use crate::error::ValidationError;
use crate::filters::{
    BEDROOM_BOUNDS, FilterChange, FilterKey, MAX_PRICE, PASSPORT_RATING_BOUNDS, PriceRange,
    PropertyType,
};

/// Parse `raw` as the value of the filter called `name`.
///
/// Besides the [`FilterKey`] names, `priceRange` (alias `price`) accepts a
/// price band and replaces both price bounds. Property types are given as a
/// comma-separated list; an empty list clears them.
///
/// # Errors
/// Returns [`ValidationError`] for unknown names and unacceptable values.
pub fn parse_filter(name: &str, raw: &str) -> Result<FilterChange, ValidationError> {
    if matches!(
        name.trim().to_ascii_lowercase().replace(['_', '-'], "").as_str(),
        "pricerange" | "price"
    ) {
        return PriceRange::parse_band(raw).map(FilterChange::Price);
    }
    let change = match name.parse::<FilterKey>()? {
        FilterKey::ListingType => FilterChange::ListingType(raw.parse()?),
        FilterKey::MinPrice => FilterChange::MinPrice(parse_price("minimum price", raw)?),
        FilterKey::MaxPrice => FilterChange::MaxPrice(parse_price("maximum price", raw)?),
        FilterKey::Bedrooms => {
            FilterChange::Bedrooms(parse_count("bedrooms", raw, BEDROOM_BOUNDS)?)
        }
        FilterKey::PassportRating => FilterChange::PassportRating(parse_count(
            "passport rating",
            raw,
            PASSPORT_RATING_BOUNDS,
        )?),
        FilterKey::PropertyTypes => FilterChange::PropertyTypes(
            raw.split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(str::parse)
                .collect::<Result<BTreeSet<PropertyType>, _>>()?,
        ),
    };
    Ok(change)
}

/// Parse a 1-based page number.
///
/// # Errors
/// Returns [`ValidationError`] for non-numeric input or zero.
pub fn parse_page(raw: &str) -> Result<NonZeroU32, ValidationError> {
    let value = parse_whole("page", raw)?;
    u32::try_from(value)
        .ok()
        .and_then(NonZeroU32::new)
        .ok_or(ValidationError::OutOfRange {
            field: "page",
            value,
            min: 1,
            max: u64::from(u32::MAX),
        })
}

/// Parse a page size.
///
/// # Errors
/// Returns [`ValidationError`] for non-numeric input or sizes outside the
/// accepted range.
pub fn parse_page_size(raw: &str) -> Result<PageSize, ValidationError> {
    let value = parse_whole("page size", raw)?;
    let value = u32::try_from(value).unwrap_or(u32::MAX);
    PageSize::new(value)
}

fn parse_price(field: &'static str, raw: &str) -> Result<u64, ValidationError> {
    let compact: String = raw.chars().filter(|c| *c != '£' && *c != ',').collect();
    let value = parse_whole(field, &compact)?;
    if value > MAX_PRICE {
        return Err(ValidationError::OutOfRange {
            field,
            value,
            min: 0,
            max: MAX_PRICE,
        });
    }
    Ok(value)
}

fn parse_count(
    field: &'static str,
    raw: &str,
    (min, max): (u8, u8),
) -> Result<u8, ValidationError> {
    let trimmed = raw.trim();
    let value = parse_whole(field, trimmed.strip_suffix('+').unwrap_or(trimmed))?;
    u8::try_from(value)
        .ok()
        .filter(|count| (min..=max).contains(count))
        .ok_or(ValidationError::OutOfRange {
            field,
            value,
            min: u64::from(min),
            max: u64::from(max),
        })
}

fn parse_whole(field: &'static str, raw: &str) -> Result<u64, ValidationError> {
    let trimmed = raw.trim();
    trimmed.parse().map_err(|_| ValidationError::NotANumber {
        field,
        value: trimmed.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::ListingType;

    #[test]
    fn numeric_filters_reject_text() {
        assert_eq!(
            parse_filter("minPrice", "lots"),
            Err(ValidationError::NotANumber {
                field: "minimum price",
                value: "lots".to_string()
            })
        );
        assert!(matches!(
            parse_filter("bedrooms", "0"),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert!(matches!(
            parse_filter("bedrooms", "300"),
            Err(ValidationError::OutOfRange { value: 300, .. })
        ));
    }

    #[test]
    fn filters_parse_from_widget_text() {
        assert_eq!(parse_filter("minPrice", "£250,000"), Ok(FilterChange::MinPrice(250_000)));
        assert_eq!(parse_filter("bedrooms", "3+"), Ok(FilterChange::Bedrooms(3)));
        assert_eq!(
            parse_filter("type", "rent"),
            Ok(FilterChange::ListingType(ListingType::Rent))
        );
        assert_eq!(
            parse_filter("propertyType", "flat, house"),
            Ok(FilterChange::PropertyTypes(
                [PropertyType::Flat, PropertyType::House].into()
            ))
        );
        assert_eq!(
            parse_filter("priceRange", "£300,000 - £500,000"),
            PriceRange::new(Some(300_000), Some(500_000)).map(FilterChange::Price)
        );
    }

    #[test]
    fn unknown_names_and_options_are_reported() {
        assert!(matches!(
            parse_filter("garden", "yes"),
            Err(ValidationError::UnknownFilter { .. })
        ));
        assert!(matches!(
            parse_filter("propertyType", "castle"),
            Err(ValidationError::UnknownOption { .. })
        ));
    }

    #[test]
    fn paging_values_are_validated() {
        assert_eq!(parse_page("3").map(NonZeroU32::get), Ok(3));
        assert!(parse_page("0").is_err());
        assert!(parse_page("two").is_err());
        assert_eq!(parse_page_size("25").map(PageSize::get), Ok(25));
        assert!(parse_page_size("500").is_err());
    }
}
