//! Error types surfaced by the search controller.
//!
//! # Design
//! - `SearchError` is what sources report; it is cloneable so the list state
//!   can hold the failure of the latest fetch without consuming it.
//! - `ValidationError` is raised at the widget boundary, before a value can
//!   reach a query descriptor.

use thiserror::Error;

/// Failure reported by a suggestion or result source.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SearchError {
    /// The request never produced a response (connection, timeout, ...).
    #[error("transport failure: {message}")]
    Transport {
        /// Underlying failure description.
        message: String,
    },
    /// The server answered but refused the request.
    #[error("request rejected: {message}")]
    Rejected {
        /// Error summary returned by the server.
        message: String,
    },
    /// The response could not be decoded.
    #[error("malformed response: {message}")]
    Decode {
        /// Decoder error text.
        message: String,
    },
}

impl SearchError {
    /// Build a transport failure.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Build a rejection.
    #[must_use]
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }

    /// Build a decode failure.
    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Message shown to the user without the variant prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Transport { message } | Self::Rejected { message } | Self::Decode { message } => {
                message
            }
        }
    }
}

/// A filter or paging value that cannot be accepted.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Input expected to be numeric was not.
    #[error("{field}: '{value}' is not a whole number")]
    NotANumber {
        /// Logical field name.
        field: &'static str,
        /// Rejected input.
        value: String,
    },
    /// Numeric input fell outside the accepted bounds.
    #[error("{field}: {value} must be between {min} and {max}")]
    OutOfRange {
        /// Logical field name.
        field: &'static str,
        /// Rejected value.
        value: u64,
        /// Inclusive lower bound.
        min: u64,
        /// Inclusive upper bound.
        max: u64,
    },
    /// Input did not match any option of an enumerated filter.
    #[error("{field}: unknown option '{value}'")]
    UnknownOption {
        /// Logical field name.
        field: &'static str,
        /// Rejected input.
        value: String,
    },
    /// A price range whose minimum exceeds its maximum.
    #[error("price range is inverted: minimum {min} exceeds maximum {max}")]
    InvertedRange {
        /// Requested minimum.
        min: u64,
        /// Requested maximum.
        max: u64,
    },
    /// A price band string that could not be parsed.
    #[error("unrecognised price band '{value}'")]
    InvalidPriceBand {
        /// Rejected input.
        value: String,
    },
    /// A filter name the controller does not know.
    #[error("unknown filter '{name}'")]
    UnknownFilter {
        /// Rejected filter name.
        name: String,
    },
}
