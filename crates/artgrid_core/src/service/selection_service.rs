//! Cross-page bulk row selection.
//!
//! # Responsibility
//! - Select up to `target_count` additional distinct records, scanning pages
//!   from page 1 forward in record order.
//! - Report how the walk ended so hosts can tell full and partial results
//!   apart.
//!
//! # Invariants
//! - Arguments are validated before any fetch; invalid input mutates nothing.
//! - The walk only adds `true` entries; it never clears an existing one.
//! - Pages are fetched sequentially, one at a time, never past the stopping
//!   point.
//! - On fetch failure or cancellation the selections made so far are kept.
//! - The bound on scanning is re-derived from the total reported by every
//!   fetched page.

use crate::fetch::{FetchError, PageFetcher};
use crate::model::artwork::{page_count, ArtworkId};
use crate::model::selection::SelectionSet;
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

pub type WalkResult<T> = Result<T, WalkError>;

/// Shared flag checked by the walker between page fetches.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Re-arms the flag for the next walk.
    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Why a walk stopped without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkStop {
    /// `target_count` new selections were made.
    TargetReached,
    /// Every page up to the last one was scanned.
    Exhausted,
    /// The cancel flag was raised between pages.
    Cancelled,
}

impl WalkStop {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TargetReached => "target_reached",
            Self::Exhausted => "exhausted",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Summary of one walk, complete or partial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkReport {
    /// Ids this walk turned from unselected to selected, in scan order.
    pub newly_selected: Vec<ArtworkId>,
    /// Pages fetched successfully, in fetch order.
    pub pages_fetched: Vec<u64>,
    /// Total record count the walk ended with.
    pub total_records: u64,
    pub stop: WalkStop,
}

impl WalkReport {
    fn started(total_records: u64) -> Self {
        Self {
            newly_selected: Vec::new(),
            pages_fetched: Vec::new(),
            total_records,
            stop: WalkStop::Exhausted,
        }
    }

    pub fn newly_selected_count(&self) -> u64 {
        self.newly_selected.len() as u64
    }
}

/// Errors from bulk selection walks.
#[derive(Debug)]
pub enum WalkError {
    /// `target_count` was below 1.
    InvalidTarget(u64),
    /// `page_size` was below 1.
    InvalidPageSize(u32),
    /// Fetching `page` failed; `partial` describes selections already applied.
    Fetch {
        page: u64,
        partial: WalkReport,
        source: FetchError,
    },
}

impl WalkError {
    /// Work applied to the selection before the failure, if any.
    pub fn partial(&self) -> Option<&WalkReport> {
        match self {
            Self::Fetch { partial, .. } => Some(partial),
            Self::InvalidTarget(_) | Self::InvalidPageSize(_) => None,
        }
    }
}

impl Display for WalkError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTarget(value) => {
                write!(f, "rows to select must be at least 1, got {value}")
            }
            Self::InvalidPageSize(value) => write!(f, "page size must be at least 1, got {value}"),
            Self::Fetch {
                page,
                partial,
                source,
            } => write!(
                f,
                "selection stopped at page {page} after {} new rows: {source}",
                partial.newly_selected.len()
            ),
        }
    }
}

impl Error for WalkError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Fetch { source, .. } => Some(source),
            Self::InvalidTarget(_) => None,
            Self::InvalidPageSize(_) => None,
        }
    }
}

/// Walks result pages to satisfy "select N rows" requests.
pub struct PagedSelectionWalker<F: PageFetcher> {
    fetcher: F,
    page_size: u32,
    cancel: Option<CancelFlag>,
}

impl<F: PageFetcher> PagedSelectionWalker<F> {
    pub fn new(fetcher: F, page_size: u32) -> Self {
        Self {
            fetcher,
            page_size,
            cancel: None,
        }
    }

    /// Attaches a flag checked before each page fetch.
    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Selects up to `target_count` new rows into `selection`.
    ///
    /// `total_records` is the caller's last known collection size; it bounds
    /// the scan at `ceil(total_records / page_size)` pages and is replaced by
    /// the total each fetched page reports.
    ///
    /// # Errors
    /// - `InvalidTarget` / `InvalidPageSize` before any fetch, with
    ///   `selection` untouched.
    /// - `Fetch` when a page fetch fails; `selection` keeps every entry made
    ///   on earlier pages and the error carries the partial report.
    pub fn select_rows(
        &self,
        selection: &mut SelectionSet,
        target_count: u64,
        total_records: u64,
    ) -> WalkResult<WalkReport> {
        if target_count < 1 {
            return Err(WalkError::InvalidTarget(target_count));
        }
        if self.page_size < 1 {
            return Err(WalkError::InvalidPageSize(self.page_size));
        }

        let started_at = Instant::now();
        info!(
            "event=bulk_select module=service status=start target={} total={} page_size={} already_selected={}",
            target_count,
            total_records,
            self.page_size,
            selection.selected_count()
        );

        let mut report = WalkReport::started(total_records);
        let mut last_page = page_count(total_records, self.page_size);
        let mut page = 1_u64;

        while report.newly_selected_count() < target_count && page <= last_page {
            if self.is_cancelled() {
                report.stop = WalkStop::Cancelled;
                break;
            }

            let fetched = match self.fetcher.fetch_page(page) {
                Ok(fetched) => fetched,
                Err(source) => {
                    error!(
                        "event=bulk_select module=service status=error page={} newly_selected={} duration_ms={} error_code={} error={}",
                        page,
                        report.newly_selected.len(),
                        started_at.elapsed().as_millis(),
                        source.code(),
                        source
                    );
                    return Err(WalkError::Fetch {
                        page,
                        partial: report,
                        source,
                    });
                }
            };
            report.pages_fetched.push(page);

            if fetched.total_records != report.total_records {
                warn!(
                    "event=bulk_select module=service status=total_changed page={} previous_total={} reported_total={}",
                    page, report.total_records, fetched.total_records
                );
                report.total_records = fetched.total_records;
                last_page = page_count(fetched.total_records, self.page_size);
            }

            for record in &fetched.records {
                if report.newly_selected_count() >= target_count {
                    break;
                }
                if selection.select(record.id) {
                    report.newly_selected.push(record.id);
                }
            }

            page += 1;
        }

        if report.stop != WalkStop::Cancelled {
            report.stop = if report.newly_selected_count() >= target_count {
                WalkStop::TargetReached
            } else {
                WalkStop::Exhausted
            };
        }

        info!(
            "event=bulk_select module=service status=ok stop={} newly_selected={} pages_fetched={} duration_ms={}",
            report.stop.as_str(),
            report.newly_selected.len(),
            report.pages_fetched.len(),
            started_at.elapsed().as_millis()
        );
        Ok(report)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelFlag::is_cancelled)
    }
}
