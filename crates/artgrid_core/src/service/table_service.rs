//! Table session use-case service.
//!
//! # Responsibility
//! - Hold the state a host needs to present the artwork table: visible
//!   rows, total, paging offset, selection and the "rows to select" input.
//! - Route page changes, per-row toggles and bulk selection through one
//!   owner so hosts only re-render from `TableSession` state.
//!
//! # Invariants
//! - `rows_to_select` stays within `[1, max(total_records, 1)]`.
//! - A failed page load leaves previously visible rows and total in place.
//! - A failed bulk selection keeps the selections made before the failure.

use crate::fetch::{FetchError, PageFetcher};
use crate::model::artwork::{page_count, page_for_offset, Artwork, ArtworkId};
use crate::model::selection::SelectionSet;
use crate::service::selection_service::{CancelFlag, PagedSelectionWalker, WalkError, WalkReport};
use log::{debug, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from table session operations.
#[derive(Debug)]
pub enum SessionError {
    /// Session was opened with a zero page size.
    InvalidPageSize(u32),
    /// Loading the visible page failed.
    Fetch(FetchError),
    /// Bulk selection failed; see `WalkError::partial`.
    Walk(WalkError),
    /// Requested page lies past the last page of the known total, or its
    /// row offset does not fit in `u64`.
    PageOutOfRange { page: u64, page_count: u64 },
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPageSize(value) => write!(f, "page size must be at least 1, got {value}"),
            Self::Fetch(err) => write!(f, "{err}"),
            Self::Walk(err) => write!(f, "{err}"),
            Self::PageOutOfRange { page, page_count } => {
                write!(f, "page {page} is out of range; table has {page_count} pages")
            }
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidPageSize(_) => None,
            Self::Fetch(err) => Some(err),
            Self::Walk(err) => Some(err),
            Self::PageOutOfRange { .. } => None,
        }
    }
}

impl From<FetchError> for SessionError {
    fn from(value: FetchError) -> Self {
        Self::Fetch(value)
    }
}

impl From<WalkError> for SessionError {
    fn from(value: WalkError) -> Self {
        Self::Walk(value)
    }
}

/// Paged table state owned by one host session.
pub struct TableSession<F: PageFetcher> {
    walker: PagedSelectionWalker<F>,
    cancel: CancelFlag,
    rows: Vec<Artwork>,
    total_records: u64,
    first: u64,
    current_page: u64,
    selection: SelectionSet,
    rows_to_select: u64,
}

impl<F: PageFetcher> TableSession<F> {
    /// Creates an empty session without fetching.
    pub fn new(fetcher: F, page_size: u32) -> Result<Self, SessionError> {
        if page_size < 1 {
            return Err(SessionError::InvalidPageSize(page_size));
        }
        let cancel = CancelFlag::new();
        Ok(Self {
            walker: PagedSelectionWalker::new(fetcher, page_size).with_cancel_flag(cancel.clone()),
            cancel,
            rows: Vec::new(),
            total_records: 0,
            first: 0,
            current_page: 1,
            selection: SelectionSet::new(),
            rows_to_select: 1,
        })
    }

    /// Creates a session and loads page 1.
    pub fn open(fetcher: F, page_size: u32) -> Result<Self, SessionError> {
        let mut session = Self::new(fetcher, page_size)?;
        session.load_page(1)?;
        Ok(session)
    }

    /// Fetches `page` and makes it the visible page.
    ///
    /// On failure the previous rows and total stay visible. Once a total is
    /// known, pages past `page_count()` are rejected without fetching; page 1
    /// is always allowed so the total can be refreshed.
    pub fn load_page(&mut self, page: u64) -> Result<(), SessionError> {
        if page == 0 {
            return Err(FetchError::InvalidPage(page).into());
        }
        let known_pages = self.page_count();
        let out_of_range = SessionError::PageOutOfRange {
            page,
            page_count: known_pages,
        };
        if page > 1 && self.total_records > 0 && page > known_pages {
            return Err(out_of_range);
        }
        let Some(first) = (page - 1).checked_mul(u64::from(self.page_size())) else {
            return Err(out_of_range);
        };
        match self.walker.fetcher().fetch_page(page) {
            Ok(fetched) => {
                debug!(
                    "event=page_load module=session status=ok page={} records={} total={}",
                    page,
                    fetched.records.len(),
                    fetched.total_records
                );
                self.rows = fetched.records;
                self.total_records = fetched.total_records;
                self.current_page = page;
                self.first = first;
                self.rows_to_select = self.clamp_rows_to_select(self.rows_to_select);
                Ok(())
            }
            Err(err) => {
                warn!(
                    "event=page_load module=session status=error page={} error_code={} error={}",
                    page,
                    err.code(),
                    err
                );
                Err(err.into())
            }
        }
    }

    /// Handles a paginator change expressed as a zero-based row offset.
    pub fn on_page_change(&mut self, first: u64) -> Result<(), SessionError> {
        let page = page_for_offset(first, self.page_size());
        self.load_page(page)
    }

    /// Flips selection for one row and returns the new state.
    pub fn toggle_row(&mut self, id: ArtworkId) -> bool {
        self.selection.toggle(id)
    }

    pub fn is_selected(&self, id: ArtworkId) -> bool {
        self.selection.is_selected(id)
    }

    /// Stores the bulk-select count; missing or zero becomes 1.
    ///
    /// Returns the value actually stored after clamping to the total.
    pub fn set_rows_to_select(&mut self, value: Option<u64>) -> u64 {
        let requested = value.filter(|count| *count > 0).unwrap_or(1);
        self.rows_to_select = self.clamp_rows_to_select(requested);
        self.rows_to_select
    }

    /// Runs a bulk walk for `rows_to_select` rows.
    ///
    /// # Errors
    /// - `SessionError::Walk` on fetch failure; the selection keeps every
    ///   row selected before the failing page.
    pub fn select_rows(&mut self) -> Result<WalkReport, SessionError> {
        self.cancel.reset();
        let report = self.walker.select_rows(
            &mut self.selection,
            self.rows_to_select,
            self.total_records,
        )?;
        if report.total_records != self.total_records {
            self.total_records = report.total_records;
            self.rows_to_select = self.clamp_rows_to_select(self.rows_to_select);
        }
        Ok(report)
    }

    /// Flag a host can raise from another thread to stop a running walk.
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Drops every selection, manual and bulk.
    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn rows(&self) -> &[Artwork] {
        self.rows.as_slice()
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn total_records(&self) -> u64 {
        self.total_records
    }

    pub fn current_page(&self) -> u64 {
        self.current_page
    }

    pub fn first(&self) -> u64 {
        self.first
    }

    pub fn page_size(&self) -> u32 {
        self.walker.page_size()
    }

    pub fn page_count(&self) -> u64 {
        page_count(self.total_records, self.page_size())
    }

    pub fn rows_to_select(&self) -> u64 {
        self.rows_to_select
    }

    fn clamp_rows_to_select(&self, value: u64) -> u64 {
        value.clamp(1, self.total_records.max(1))
    }
}
