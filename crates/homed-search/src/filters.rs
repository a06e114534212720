//! Typed structured filters.
//!
//! # Design
//! - Each filter has a known kind (enumerated, numeric, numeric range, set).
//! - Values are validated when they are applied; a [`StructuredFilters`] can
//!   never hold an inverted price range or an out-of-range count.
//! - Changes are expressed as [`FilterChange`] values and produce a new set of
//!   filters rather than mutating in place.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::ValidationError;

/// Largest accepted price bound, in pounds.
pub const MAX_PRICE: u64 = 1_000_000_000;
/// Accepted minimum-bedroom counts.
pub const BEDROOM_BOUNDS: (u8, u8) = (1, 10);
/// Accepted minimum passport ratings.
pub const PASSPORT_RATING_BOUNDS: (u8, u8) = (1, 10);

/// Whether a listing is for sale or to let.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingType {
    /// Properties for sale.
    Sale,
    /// Properties to rent.
    Rent,
}

impl ListingType {
    /// Wire and URL form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sale => "sale",
            Self::Rent => "rent",
        }
    }

    /// Label used on filter chips.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Sale => "For Sale",
            Self::Rent => "For Rent",
        }
    }
}

impl FromStr for ListingType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sale" | "buy" => Ok(Self::Sale),
            "rent" | "let" => Ok(Self::Rent),
            other => Err(ValidationError::UnknownOption {
                field: "listing type",
                value: other.to_string(),
            }),
        }
    }
}

/// Property category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    /// Detached, semi-detached or terraced house.
    House,
    /// Flat.
    Flat,
    /// Bungalow.
    Bungalow,
    /// Maisonette.
    Maisonette,
    /// Apartment.
    Apartment,
    /// Building plot.
    Land,
    /// Commercial premises.
    Commercial,
}

impl PropertyType {
    /// Every category, in display order.
    pub const ALL: [Self; 7] = [
        Self::House,
        Self::Flat,
        Self::Bungalow,
        Self::Maisonette,
        Self::Apartment,
        Self::Land,
        Self::Commercial,
    ];

    /// Wire and URL form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::House => "house",
            Self::Flat => "flat",
            Self::Bungalow => "bungalow",
            Self::Maisonette => "maisonette",
            Self::Apartment => "apartment",
            Self::Land => "land",
            Self::Commercial => "commercial",
        }
    }

    /// Capitalised label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::House => "House",
            Self::Flat => "Flat",
            Self::Bungalow => "Bungalow",
            Self::Maisonette => "Maisonette",
            Self::Apartment => "Apartment",
            Self::Land => "Land",
            Self::Commercial => "Commercial",
        }
    }
}

impl FromStr for PropertyType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or(ValidationError::UnknownOption {
                field: "property type",
                value: wanted,
            })
    }
}

/// Price bounds in whole pounds; either end may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct PriceRange {
    min: Option<u64>,
    max: Option<u64>,
}

impl PriceRange {
    /// Range with no bounds.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            min: None,
            max: None,
        }
    }

    /// Build a range, rejecting out-of-range or inverted bounds.
    ///
    /// # Errors
    /// Returns [`ValidationError::OutOfRange`] for a bound above [`MAX_PRICE`]
    /// and [`ValidationError::InvertedRange`] when `min > max`.
    pub fn new(min: Option<u64>, max: Option<u64>) -> Result<Self, ValidationError> {
        for (field, bound) in [("minimum price", min), ("maximum price", max)] {
            if let Some(value) = bound.filter(|value| *value > MAX_PRICE) {
                return Err(ValidationError::OutOfRange {
                    field,
                    value,
                    min: 0,
                    max: MAX_PRICE,
                });
            }
        }
        if let (Some(min), Some(max)) = (min, max)
            && min > max
        {
            return Err(ValidationError::InvertedRange { min, max });
        }
        Ok(Self { min, max })
    }

    /// Lower bound.
    #[must_use]
    pub const fn min(&self) -> Option<u64> {
        self.min
    }

    /// Upper bound.
    #[must_use]
    pub const fn max(&self) -> Option<u64> {
        self.max
    }

    /// Whether neither end is bounded.
    #[must_use]
    pub const fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    /// Parse a price band such as `300000-500000`, `1000000+` or
    /// `£300,000 - £500,000`.
    ///
    /// # Errors
    /// Returns [`ValidationError::InvalidPriceBand`] for unparseable text and
    /// the errors of [`PriceRange::new`] for unacceptable bounds.
    pub fn parse_band(raw: &str) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidPriceBand {
            value: raw.to_string(),
        };
        let compact: String = raw
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '£' && *c != ',')
            .collect();
        if let Some(lower) = compact.strip_suffix('+') {
            let min = lower.parse().map_err(|_| invalid())?;
            return Self::new(Some(min), None);
        }
        let (lower, upper) = compact.split_once('-').ok_or_else(invalid)?;
        let bound = |text: &str| -> Result<Option<u64>, ValidationError> {
            if text.is_empty() {
                Ok(None)
            } else {
                text.parse().map(Some).map_err(|_| invalid())
            }
        };
        let range = Self::new(bound(lower)?, bound(upper)?)?;
        if range.is_unbounded() {
            return Err(invalid());
        }
        Ok(range)
    }
}

impl fmt::Display for PriceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.min, self.max) {
            (Some(min), Some(max)) => write!(f, "{} - {}", format_pounds(min), format_pounds(max)),
            (Some(min), None) => write!(f, "{}+", format_pounds(min)),
            (None, Some(max)) => write!(f, "up to {}", format_pounds(max)),
            (None, None) => f.write_str("any price"),
        }
    }
}

/// Render a whole-pound amount with thousands separators (`£1,250,000`).
#[must_use]
pub fn format_pounds(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    out.push('£');
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            out.push(',');
        }
        out.push(digit);
    }
    out
}

/// Identifies one removable filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKey {
    /// Sale or rent.
    ListingType,
    /// Lower price bound.
    MinPrice,
    /// Upper price bound.
    MaxPrice,
    /// Minimum bedrooms.
    Bedrooms,
    /// Minimum passport rating.
    PassportRating,
    /// Accepted property categories.
    PropertyTypes,
}

/// Shape of the value a filter carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// One option out of a fixed set.
    Enum,
    /// A single bounded number.
    Number,
    /// One end of a numeric range.
    NumberRange,
    /// Any subset of a fixed set.
    EnumSet,
}

impl FilterKey {
    /// Every key, in chip order.
    pub const ALL: [Self; 6] = [
        Self::ListingType,
        Self::MinPrice,
        Self::MaxPrice,
        Self::Bedrooms,
        Self::PassportRating,
        Self::PropertyTypes,
    ];

    /// The value shape of this filter.
    #[must_use]
    pub const fn kind(self) -> FilterKind {
        match self {
            Self::ListingType => FilterKind::Enum,
            Self::MinPrice | Self::MaxPrice => FilterKind::NumberRange,
            Self::Bedrooms | Self::PassportRating => FilterKind::Number,
            Self::PropertyTypes => FilterKind::EnumSet,
        }
    }

    /// Canonical name, matching the shareable URL parameter.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ListingType => "type",
            Self::MinPrice => "minPrice",
            Self::MaxPrice => "maxPrice",
            Self::Bedrooms => "bedrooms",
            Self::PassportRating => "passportRating",
            Self::PropertyTypes => "propertyType",
        }
    }
}

impl FromStr for FilterKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        let key = match name.to_ascii_lowercase().replace(['_', '-'], "").as_str() {
            "type" | "listingtype" => Self::ListingType,
            "minprice" => Self::MinPrice,
            "maxprice" => Self::MaxPrice,
            "bedrooms" | "beds" => Self::Bedrooms,
            "passportrating" | "rating" => Self::PassportRating,
            "propertytype" | "propertytypes" => Self::PropertyTypes,
            _ => {
                return Err(ValidationError::UnknownFilter {
                    name: name.to_string(),
                });
            }
        };
        Ok(key)
    }
}

/// One requested change to the structured filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterChange {
    /// Restrict to sale or rent.
    ListingType(ListingType),
    /// Set the lower price bound.
    MinPrice(u64),
    /// Set the upper price bound.
    MaxPrice(u64),
    /// Replace both price bounds.
    Price(PriceRange),
    /// Require at least this many bedrooms.
    Bedrooms(u8),
    /// Require at least this passport rating.
    PassportRating(u8),
    /// Replace the accepted property categories.
    PropertyTypes(BTreeSet<PropertyType>),
    /// Add or remove one property category.
    TogglePropertyType(PropertyType),
}

/// A removable label describing one active filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterChip {
    /// Filter the chip removes.
    pub key: FilterKey,
    /// Display text.
    pub label: String,
}

/// The active structured filters of a query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct StructuredFilters {
    listing_type: Option<ListingType>,
    price: PriceRange,
    bedrooms: Option<u8>,
    passport_rating: Option<u8>,
    property_types: BTreeSet<PropertyType>,
}

impl StructuredFilters {
    /// Sale/rent restriction.
    #[must_use]
    pub const fn listing_type(&self) -> Option<ListingType> {
        self.listing_type
    }

    /// Price bounds.
    #[must_use]
    pub const fn price(&self) -> PriceRange {
        self.price
    }

    /// Minimum bedrooms.
    #[must_use]
    pub const fn bedrooms(&self) -> Option<u8> {
        self.bedrooms
    }

    /// Minimum passport rating.
    #[must_use]
    pub const fn passport_rating(&self) -> Option<u8> {
        self.passport_rating
    }

    /// Accepted property categories; empty means any.
    #[must_use]
    pub const fn property_types(&self) -> &BTreeSet<PropertyType> {
        &self.property_types
    }

    /// Whether no filter is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listing_type.is_none()
            && self.price.is_unbounded()
            && self.bedrooms.is_none()
            && self.passport_rating.is_none()
            && self.property_types.is_empty()
    }

    /// Return a copy with `change` applied.
    ///
    /// # Errors
    /// Returns [`ValidationError`] when the change would produce an inverted
    /// price range or carries an out-of-range count.
    pub fn apply(&self, change: FilterChange) -> Result<Self, ValidationError> {
        let mut next = self.clone();
        match change {
            FilterChange::ListingType(kind) => next.listing_type = Some(kind),
            FilterChange::MinPrice(min) => {
                next.price = PriceRange::new(Some(min), self.price.max)?;
            }
            FilterChange::MaxPrice(max) => {
                next.price = PriceRange::new(self.price.min, Some(max))?;
            }
            FilterChange::Price(range) => next.price = PriceRange::new(range.min, range.max)?,
            FilterChange::Bedrooms(count) => {
                next.bedrooms = Some(check_bounds("bedrooms", count, BEDROOM_BOUNDS)?);
            }
            FilterChange::PassportRating(rating) => {
                next.passport_rating =
                    Some(check_bounds("passport rating", rating, PASSPORT_RATING_BOUNDS)?);
            }
            FilterChange::PropertyTypes(kinds) => next.property_types = kinds,
            FilterChange::TogglePropertyType(kind) => {
                if !next.property_types.remove(&kind) {
                    next.property_types.insert(kind);
                }
            }
        }
        Ok(next)
    }

    /// Return a copy with the filter named by `key` cleared.
    #[must_use]
    pub fn without(&self, key: FilterKey) -> Self {
        let mut next = self.clone();
        match key {
            FilterKey::ListingType => next.listing_type = None,
            FilterKey::MinPrice => next.price.min = None,
            FilterKey::MaxPrice => next.price.max = None,
            FilterKey::Bedrooms => next.bedrooms = None,
            FilterKey::PassportRating => next.passport_rating = None,
            FilterKey::PropertyTypes => next.property_types.clear(),
        }
        next
    }

    /// One chip per active filter, in [`FilterKey::ALL`] order.
    #[must_use]
    pub fn chips(&self) -> Vec<FilterChip> {
        FilterKey::ALL
            .into_iter()
            .filter_map(|key| self.chip_label(key).map(|label| FilterChip { key, label }))
            .collect()
    }

    fn chip_label(&self, key: FilterKey) -> Option<String> {
        match key {
            FilterKey::ListingType => self.listing_type.map(|kind| kind.label().to_string()),
            FilterKey::MinPrice => self.price.min.map(|min| format!("Min {}", format_pounds(min))),
            FilterKey::MaxPrice => self.price.max.map(|max| format!("Max {}", format_pounds(max))),
            FilterKey::Bedrooms => self.bedrooms.map(|count| format!("{count}+ beds")),
            FilterKey::PassportRating => self
                .passport_rating
                .map(|rating| format!("Passport {rating}+/10")),
            FilterKey::PropertyTypes => (!self.property_types.is_empty()).then(|| {
                self.property_types
                    .iter()
                    .map(|kind| kind.label())
                    .collect::<Vec<_>>()
                    .join(", ")
            }),
        }
    }
}

fn check_bounds(
    field: &'static str,
    value: u8,
    (min, max): (u8, u8),
) -> Result<u8, ValidationError> {
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(ValidationError::OutOfRange {
            field,
            value: u64::from(value),
            min: u64::from(min),
            max: u64::from(max),
        })
    }
}
