//! In-memory fetcher for tests
//!
//! Serves a small link graph. Every fetch yields to the runtime once before
//! answering, so concurrent callers interleave the way real requests do.

use crate::fetch::{FetchConfig, FetchError, FetchResult, FetchedPage, PageFetcher};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Default)]
pub(crate) struct MockSite {
    links: HashMap<String, Vec<String>>,
    failing: HashSet<String>,
    erroring: HashSet<String>,
    panicking: HashSet<String>,
    latency: Option<Duration>,
    calls: Mutex<Vec<(String, FetchConfig)>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl MockSite {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// The graph `seed -> a, b; a -> c, d` under `https://site.test`
    pub(crate) fn tree() -> Self {
        Self::new()
            .page("https://site.test/", &["https://site.test/a", "https://site.test/b"])
            .page("https://site.test/a", &["https://site.test/c", "https://site.test/d"])
    }

    pub(crate) fn page(mut self, url: &str, links: &[&str]) -> Self {
        self.links
            .insert(url.to_string(), links.iter().map(|l| l.to_string()).collect());
        self
    }

    /// Answers `url` with `FetchResult::Failure`
    pub(crate) fn failing(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }

    /// Answers `url` with `Err(FetchError)`
    pub(crate) fn erroring(mut self, url: &str) -> Self {
        self.erroring.insert(url.to_string());
        self
    }

    pub(crate) fn panicking(mut self, url: &str) -> Self {
        self.panicking.insert(url.to_string());
        self
    }

    pub(crate) fn latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub(crate) fn fetched_urls(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(u, _)| u.clone()).collect()
    }

    pub(crate) fn configs(&self) -> Vec<FetchConfig> {
        self.calls.lock().unwrap().iter().map(|(_, c)| c.clone()).collect()
    }

    pub(crate) fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageFetcher for MockSite {
    async fn fetch(&self, url: &str, config: &FetchConfig) -> Result<FetchResult, FetchError> {
        self.calls
            .lock()
            .unwrap()
            .push((url.to_string(), config.clone()));

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        match self.latency {
            Some(latency) => tokio::time::sleep(latency).await,
            None => tokio::task::yield_now().await,
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.panicking.contains(url) {
            panic!("fetcher blew up on {url}");
        }
        if self.erroring.contains(url) {
            return Err(FetchError::Other(format!("connection reset on {url}")));
        }
        if self.failing.contains(url) {
            return Ok(FetchResult::failure("HTTP 500"));
        }

        let mut page = FetchedPage::new(url);
        page.links.internal = self.links.get(url).cloned().unwrap_or_default();
        page.metadata.title = Some(format!("Page {url}"));
        Ok(FetchResult::success(page))
    }
}
