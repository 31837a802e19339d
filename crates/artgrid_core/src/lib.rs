//! Core logic for artgrid, a paged artwork table with cross-page bulk row
//! selection.
//!
//! Hosts (the CLI today) own presentation; this crate owns selection
//! invariants, page fetching and session state.

pub mod config;
pub mod fetch;
pub mod logging;
pub mod model;
pub mod service;

pub use config::{AppConfig, ConfigError};
pub use fetch::cache::CachingPageFetcher;
pub use fetch::http::{parse_page_body, HttpPageFetcher};
pub use fetch::{FetchError, FetchResult, PageFetcher};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::artwork::{
    page_count, page_for_offset, Artwork, ArtworkId, ArtworkPage, ArtworkValidationError,
};
pub use model::selection::SelectionSet;
pub use service::selection_service::{
    CancelFlag, PagedSelectionWalker, WalkError, WalkReport, WalkResult, WalkStop,
};
pub use service::table_service::{SessionError, TableSession};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
