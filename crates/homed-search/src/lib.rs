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

//! Debounced, race-safe search and filter controller for listing views.
//!
//! A [`SearchController`] turns keystrokes, suggestion picks, filter edits and
//! pagination into immutable [`QueryDescriptor`]s. Each distinct descriptor
//! is mirrored into a shareable query string and fetched exactly once; only
//! the response to the latest descriptor is ever shown.
//!
//! Layout: `debounce.rs` (cancellable timers), `postcode.rs` (partial input
//! classification), `filters.rs` and `input.rs` (typed filters and their
//! parsers), `descriptor.rs` (query descriptor), `url_state.rs` (query-string
//! mirroring), `suggest.rs` (suggestion fetcher), `results.rs` and
//! `aggregator.rs` (result fetching), `commit.rs` and `controller.rs`
//! (orchestration).

pub mod aggregator;
pub mod commit;
pub mod debounce;
pub mod descriptor;
pub mod error;
pub mod filters;
pub mod input;
pub mod postcode;
pub mod results;
pub mod suggest;
pub mod url_state;

mod controller;

pub use aggregator::{Aggregator, ListState};
pub use controller::{Phase, SearchController, SearchSources};
pub use descriptor::{PageSize, QueryDescriptor};
pub use error::{SearchError, ValidationError};
pub use filters::{
    FilterChange, FilterChip, FilterKey, FilterKind, ListingType, PriceRange, PropertyType,
    StructuredFilters,
};
pub use postcode::{SuggestionKind, classify};
pub use results::{FetchFailure, ResultPage, ResultSource};
pub use suggest::{Suggestion, SuggestionFetcher, SuggestionSource, SuggestionState};
pub use url_state::{MemoryUrl, UrlCodec, UrlSink, UrlSynchronizer};
