#![allow(dead_code)]

use artgrid_core::{Artwork, ArtworkPage, FetchError, FetchResult, PageFetcher};
use std::cell::{Cell, RefCell};

/// In-memory collection served page by page, with call recording and
/// scripted failures.
pub struct ScriptedCollection {
    ids: Vec<u64>,
    page_size: usize,
    fail_on: Cell<Option<u64>>,
    reported_total: Cell<Option<u64>>,
    calls: RefCell<Vec<u64>>,
}

impl ScriptedCollection {
    /// Collection of `total` records with ids `1000, 1001, ...`.
    pub fn sequential(total: u64, page_size: usize) -> Self {
        Self::with_ids((0..total).map(|i| 1000 + i).collect(), page_size)
    }

    pub fn with_ids(ids: Vec<u64>, page_size: usize) -> Self {
        Self {
            ids,
            page_size,
            fail_on: Cell::new(None),
            reported_total: Cell::new(None),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn fail_on(&self, page: u64) {
        self.fail_on.set(Some(page));
    }

    pub fn heal(&self) {
        self.fail_on.set(None);
    }

    /// Makes every page report `total` instead of the real size.
    pub fn report_total(&self, total: u64) {
        self.reported_total.set(Some(total));
    }

    pub fn calls(&self) -> Vec<u64> {
        self.calls.borrow().clone()
    }

    pub fn reset_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    pub fn ids(&self) -> &[u64] {
        self.ids.as_slice()
    }

    pub fn ids_on_page(&self, page: u64) -> Vec<u64> {
        let start = (page as usize - 1) * self.page_size;
        self.ids
            .iter()
            .skip(start)
            .take(self.page_size)
            .copied()
            .collect()
    }
}

impl PageFetcher for ScriptedCollection {
    fn fetch_page(&self, page: u64) -> FetchResult<ArtworkPage> {
        self.calls.borrow_mut().push(page);
        if page == 0 {
            return Err(FetchError::InvalidPage(page));
        }
        if self.fail_on.get() == Some(page) {
            return Err(FetchError::transport(
                page,
                std::io::Error::new(std::io::ErrorKind::ConnectionReset, "connection reset"),
            ));
        }
        let records = self
            .ids_on_page(page)
            .into_iter()
            .map(|id| Artwork::new(id, format!("Artwork {id}")))
            .collect();
        let total = self
            .reported_total
            .get()
            .unwrap_or(self.ids.len() as u64);
        Ok(ArtworkPage::new(records, total))
    }
}
