//! Page fetcher contract and implementations.
//!
//! # Responsibility
//! - Define the `PageFetcher` capability consumed by selection walks and
//!   table sessions.
//! - Keep transport details (HTTP, caching) behind that single seam.
//!
//! # Invariants
//! - Page numbers are 1-based; page `0` is rejected with `InvalidPage`.
//! - A fetcher returns records in a stable order for an unchanged collection.

use crate::model::artwork::ArtworkPage;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod cache;
pub mod http;

pub type FetchResult<T> = Result<T, FetchError>;

/// Error returned by page fetchers.
#[derive(Debug)]
pub enum FetchError {
    /// Page number outside the 1-based range.
    InvalidPage(u64),
    /// Request could not be completed (connect, timeout, read).
    Transport {
        page: u64,
        source: Box<dyn Error + Send + Sync>,
    },
    /// Upstream answered with a non-success status code.
    Status { page: u64, status: u16 },
    /// Response arrived but did not decode into a valid page.
    Malformed { page: u64, message: String },
}

impl FetchError {
    /// Wraps any transport-level error for `page`.
    pub fn transport(page: u64, source: impl Into<Box<dyn Error + Send + Sync>>) -> Self {
        Self::Transport {
            page,
            source: source.into(),
        }
    }

    pub fn malformed(page: u64, message: impl Into<String>) -> Self {
        Self::Malformed {
            page,
            message: message.into(),
        }
    }

    /// Page number the failed request targeted.
    pub fn page(&self) -> u64 {
        match self {
            Self::InvalidPage(page) => *page,
            Self::Transport { page, .. } => *page,
            Self::Status { page, .. } => *page,
            Self::Malformed { page, .. } => *page,
        }
    }

    /// Stable short code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidPage(_) => "invalid_page",
            Self::Transport { .. } => "transport_failed",
            Self::Status { .. } => "bad_status",
            Self::Malformed { .. } => "malformed_page",
        }
    }
}

impl Display for FetchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPage(page) => write!(f, "page number must be >= 1, got {page}"),
            Self::Transport { page, source } => {
                write!(f, "failed to fetch page {page}: {source}")
            }
            Self::Status { page, status } => {
                write!(f, "fetching page {page} returned HTTP status {status}")
            }
            Self::Malformed { page, message } => {
                write!(f, "page {page} response is malformed: {message}")
            }
        }
    }
}

impl Error for FetchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Transport { source, .. } => Some(source.as_ref()),
            Self::InvalidPage(_) => None,
            Self::Status { .. } => None,
            Self::Malformed { .. } => None,
        }
    }
}

/// Capability returning one page of the remote collection.
pub trait PageFetcher {
    fn fetch_page(&self, page: u64) -> FetchResult<ArtworkPage>;
}

impl<F: PageFetcher + ?Sized> PageFetcher for &F {
    fn fetch_page(&self, page: u64) -> FetchResult<ArtworkPage> {
        (**self).fetch_page(page)
    }
}

impl<F: PageFetcher + ?Sized> PageFetcher for Box<F> {
    fn fetch_page(&self, page: u64) -> FetchResult<ArtworkPage> {
        (**self).fetch_page(page)
    }
}
