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

//! Typed configuration for the Homed search controller.
//!
//! Layout: `defaults.rs` (tunable defaults and bounds), `model.rs` (settings
//! structs), `validate.rs` (field parsers), `loader.rs` (environment and JSON
//! patch loading), `error.rs` (`ConfigError`).

pub mod defaults;
pub mod error;
pub mod loader;
pub mod model;
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use model::{AppConfig, ClientSettings, LogSettings, SearchSettings};
