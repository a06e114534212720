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

//! HTTP adapters for the Homed marketplace API.
//!
//! [`ApiClient`] implements both [`homed_search::SuggestionSource`] and
//! [`homed_search::ResultSource`] for property summaries, so a search
//! controller can be mounted directly against a running API.
//!
//! Layout: `client.rs` (requests and envelopes), `params.rs` (descriptor to
//! query-parameter mapping), `error.rs` (`ClientError`).

pub mod client;
pub mod error;
pub mod params;

pub use client::ApiClient;
pub use error::{ClientError, ClientResult};
pub use params::{listing_params, suggestion_index};
