//! LRU page cache in front of any `PageFetcher`.
//!
//! Design:
//! - HashMap<page, ArtworkPage> stores fetched pages.
//! - VecDeque<page> keeps recency order; front = MRU, back = LRU.
//! - Capacity=0 disables the cache (pure pass-through).
//!
//! Failed fetches are never cached, and a cached page is returned unchanged,
//! so wrapping a fetcher does not alter selection results.

use crate::fetch::{FetchResult, PageFetcher};
use crate::model::artwork::ArtworkPage;
use log::debug;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

struct CacheState {
    pages: HashMap<u64, ArtworkPage>,
    order: VecDeque<u64>,
    hits: u64,
    misses: u64,
}

impl CacheState {
    fn touch(&mut self, page: u64) {
        if let Some(position) = self.order.iter().position(|entry| *entry == page) {
            self.order.remove(position);
        }
        self.order.push_front(page);
    }
}

/// Fetcher wrapper that remembers the most recently used pages.
pub struct CachingPageFetcher<F> {
    inner: F,
    capacity: usize,
    state: Mutex<CacheState>,
}

impl<F: PageFetcher> CachingPageFetcher<F> {
    pub fn new(inner: F, capacity: usize) -> Self {
        Self {
            inner,
            capacity,
            state: Mutex::new(CacheState {
                pages: HashMap::with_capacity(capacity.max(1)),
                order: VecDeque::with_capacity(capacity.max(1)),
                hits: 0,
                misses: 0,
            }),
        }
    }

    /// Drops every cached page, e.g. after the collection is known to change.
    pub fn invalidate(&self) {
        let mut state = self.lock_state();
        state.pages.clear();
        state.order.clear();
    }

    pub fn hits(&self) -> u64 {
        self.lock_state().hits
    }

    pub fn misses(&self) -> u64 {
        self.lock_state().misses
    }

    pub fn cached_pages(&self) -> usize {
        self.lock_state().pages.len()
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, CacheState> {
        // A panic while holding the lock cannot leave pages half-written.
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<F: PageFetcher> PageFetcher for CachingPageFetcher<F> {
    fn fetch_page(&self, page: u64) -> FetchResult<ArtworkPage> {
        if self.capacity == 0 {
            return self.inner.fetch_page(page);
        }

        {
            let mut state = self.lock_state();
            if let Some(cached) = state.pages.get(&page).cloned() {
                state.hits += 1;
                state.touch(page);
                debug!("event=page_cache module=fetch status=hit page={page}");
                return Ok(cached);
            }
            state.misses += 1;
        }

        let fetched = self.inner.fetch_page(page)?;

        let mut state = self.lock_state();
        if !state.pages.contains_key(&page) && state.pages.len() >= self.capacity {
            if let Some(victim) = state.order.pop_back() {
                state.pages.remove(&victim);
                debug!("event=page_cache module=fetch status=evict page={victim}");
            }
        }
        state.pages.insert(page, fetched.clone());
        state.touch(page);
        Ok(fetched)
    }
}

#[cfg(test)]
mod tests {
    use super::CachingPageFetcher;
    use crate::fetch::{FetchError, FetchResult, PageFetcher};
    use crate::model::artwork::{Artwork, ArtworkPage};
    use std::cell::{Cell, RefCell};

    struct CountingFetcher {
        calls: RefCell<Vec<u64>>,
        fail_next: Cell<bool>,
    }

    impl CountingFetcher {
        fn new() -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
                fail_next: Cell::new(false),
            }
        }
    }

    impl PageFetcher for CountingFetcher {
        fn fetch_page(&self, page: u64) -> FetchResult<ArtworkPage> {
            self.calls.borrow_mut().push(page);
            if self.fail_next.replace(false) {
                return Err(FetchError::malformed(page, "scripted failure"));
            }
            Ok(ArtworkPage::new(vec![Artwork::new(page * 100, "row")], 30))
        }
    }

    #[test]
    fn repeated_fetch_is_served_from_cache() {
        let cache = CachingPageFetcher::new(CountingFetcher::new(), 2);
        let first = cache.fetch_page(1).expect("first fetch");
        let second = cache.fetch_page(1).expect("cached fetch");

        assert_eq!(first, second);
        assert_eq!(*cache.inner().calls.borrow(), vec![1]);
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.misses(), 1);
    }

    #[test]
    fn evicts_least_recently_used_page() {
        let cache = CachingPageFetcher::new(CountingFetcher::new(), 2);
        cache.fetch_page(1).expect("page 1");
        cache.fetch_page(2).expect("page 2");
        cache.fetch_page(1).expect("page 1 again");
        cache.fetch_page(3).expect("page 3 evicts page 2");
        cache.fetch_page(1).expect("page 1 still cached");
        cache.fetch_page(2).expect("page 2 refetched");

        assert_eq!(*cache.inner().calls.borrow(), vec![1, 2, 3, 2]);
        assert_eq!(cache.cached_pages(), 2);
    }

    #[test]
    fn failures_are_not_cached() {
        let cache = CachingPageFetcher::new(CountingFetcher::new(), 4);
        cache.inner().fail_next.set(true);
        cache.fetch_page(5).expect_err("scripted failure");
        cache.fetch_page(5).expect("retry reaches inner fetcher");

        assert_eq!(*cache.inner().calls.borrow(), vec![5, 5]);
    }

    #[test]
    fn zero_capacity_passes_through_and_invalidate_clears() {
        let disabled = CachingPageFetcher::new(CountingFetcher::new(), 0);
        disabled.fetch_page(1).expect("page 1");
        disabled.fetch_page(1).expect("page 1 again");
        assert_eq!(disabled.inner().calls.borrow().len(), 2);

        let cache = CachingPageFetcher::new(CountingFetcher::new(), 4);
        cache.fetch_page(1).expect("page 1");
        cache.invalidate();
        cache.fetch_page(1).expect("page 1 after invalidate");
        assert_eq!(cache.inner().calls.borrow().len(), 2);
    }
}
