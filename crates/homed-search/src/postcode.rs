//! Postcode versus place-name classification of partial input.
//!
//! The classifier decides which suggestion index a partial query is sent to.
//! It inspects the input with whitespace removed and letters uppercased, and
//! accepts any prefix of a UK postcode that already contains the outward
//! code's district digit (`SW1A`, `M1 1A`, `LS6`). Everything else, including
//! bare area letters such as `SW`, is treated as a place name.
//!
//! The whole compacted input must fit the pattern, so `LS6 Leeds` goes to the
//! place index. An `R` in the district position is not accepted: the only
//! postcode using it is the non-geographic `GIR 0AA`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static POSTCODE_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Z]{1,2}[0-9][0-9A-Z]?(?:[0-9][A-Z]{0,2})?$")
        .expect("postcode prefix pattern is valid")
});

/// Which suggestion index a partial query targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionKind {
    /// UK postcode index.
    Postcode,
    /// Town, city and area names.
    PlaceName,
}

impl SuggestionKind {
    /// Stable lowercase label used in logs and CLI output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Postcode => "postcode",
            Self::PlaceName => "place_name",
        }
    }
}

/// Classify a partial query.
#[must_use]
pub fn classify(input: &str) -> SuggestionKind {
    if POSTCODE_PREFIX.is_match(&compact_upper(input)) {
        SuggestionKind::Postcode
    } else {
        SuggestionKind::PlaceName
    }
}

/// The form of `input` sent to the index selected by `kind`.
///
/// Postcode partials are compacted and uppercased; place names are trimmed.
#[must_use]
pub fn normalize_partial(input: &str, kind: SuggestionKind) -> String {
    match kind {
        SuggestionKind::Postcode => compact_upper(input),
        SuggestionKind::PlaceName => input.trim().to_string(),
    }
}

fn compact_upper(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn postcode_prefixes_are_recognised() {
        for input in ["SW1A", "sw1a", "SW1A 1AA", "M1", "m1 1ae", "LS6 2", "EC1A1BB", " b33 8th "] {
            assert_eq!(classify(input), SuggestionKind::Postcode, "{input}");
        }
    }

    #[test]
    fn place_names_are_recognised() {
        for input in [
            "London", "Bristol", "SW", "Leeds 6", "St Albans", "M", "", "1A", "GIR", "LS6 Leeds",
        ] {
            assert_eq!(classify(input), SuggestionKind::PlaceName, "{input}");
        }
    }

    #[test]
    fn partials_are_normalised_per_kind() {
        assert_eq!(normalize_partial(" sw1a 1a ", SuggestionKind::Postcode), "SW1A1A");
        assert_eq!(normalize_partial("  St Albans ", SuggestionKind::PlaceName), "St Albans");
    }
}
