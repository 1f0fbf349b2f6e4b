//! Deep-crawl traversal
//!
//! Starting from a seed URL, pages are fetched and their internal links
//! followed until the depth or page budget runs out. Each call keeps its own
//! visited set, so a URL is fetched at most once per traversal.
//!
//! # Ordering
//!
//! Pages are recorded when their fetch completes.
//! - **bfs**: the children of a page are visited concurrently, so siblings
//!   land next to each other in the result.
//! - **dfs**: the children of a page are visited one at a time, each subtree
//!   finishing before the next sibling starts.

use crate::fetch::{FetchConfig, FetchResult, PageFetcher};
use crate::template::CrawlStrategy;
use crate::url::normalize_url;
use futures::future::{self, BoxFuture};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// One page reached by a traversal
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraversalPage {
    pub url: String,
    /// Link distance from the seed (the seed is 0)
    pub depth: u32,
    pub result: FetchResult,
}

/// Pages reached by a traversal, in the order their fetches completed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraversalResult {
    /// Always true: individual page failures are recorded in `pages`
    pub success: bool,
    pub total_pages: usize,
    pub pages: Vec<TraversalPage>,
}

impl TraversalResult {
    /// Number of pages whose fetch failed
    pub fn failed_pages(&self) -> usize {
        self.pages.iter().filter(|p| !p.result.is_success()).count()
    }

    pub fn urls(&self) -> Vec<&str> {
        self.pages.iter().map(|p| p.url.as_str()).collect()
    }
}

/// Expands a seed URL through its internal links
pub struct DeepCrawler {
    fetcher: Arc<dyn PageFetcher>,
}

impl DeepCrawler {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { fetcher }
    }

    /// Crawls from `seed` visiting at most `max_pages` distinct URLs no deeper
    /// than `max_depth` links from the seed
    ///
    /// The seed is normalized like discovered links, so a page linking back to
    /// it is not fetched again. A seed that does not parse is used as given.
    /// A page whose fetch fails is recorded and its branch is not expanded.
    pub async fn traverse(
        &self,
        seed: &str,
        strategy: CrawlStrategy,
        max_pages: u32,
        max_depth: u32,
        config: &FetchConfig,
    ) -> TraversalResult {
        tracing::info!(
            "Deep crawl from {} ({}, max {} pages, max depth {})",
            seed,
            strategy,
            max_pages,
            max_depth
        );

        let traversal = Traversal {
            fetcher: self.fetcher.as_ref(),
            config,
            strategy,
            max_pages: max_pages as usize,
            max_depth,
            visited: Mutex::new(HashSet::new()),
            pages: Mutex::new(Vec::new()),
        };

        let seed = normalize_url(seed)
            .map(String::from)
            .unwrap_or_else(|_| seed.to_string());
        traversal.visit(seed.clone(), 0).await;

        let pages = traversal
            .pages
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);

        let result = TraversalResult {
            success: true,
            total_pages: pages.len(),
            pages,
        };
        tracing::info!(
            "Deep crawl from {} finished: {} pages, {} failed",
            seed,
            result.total_pages,
            result.failed_pages()
        );
        result
    }
}

/// State of one traversal call
struct Traversal<'a> {
    fetcher: &'a dyn PageFetcher,
    config: &'a FetchConfig,
    strategy: CrawlStrategy,
    max_pages: usize,
    max_depth: u32,
    visited: Mutex<HashSet<String>>,
    pages: Mutex<Vec<TraversalPage>>,
}

impl Traversal<'_> {
    fn visit(&self, url: String, depth: u32) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            if depth > self.max_depth || !self.claim(&url) {
                return;
            }

            let result = match self.fetcher.fetch(&url, self.config).await {
                Ok(result) => result,
                Err(e) => FetchResult::failure(format!("fetch exception: {e}")),
            };

            let links: Vec<String> = result
                .internal_links()
                .iter()
                .take(self.max_pages)
                .cloned()
                .collect();
            let failed = !result.is_success();

            self.lock_pages().push(TraversalPage {
                url: url.clone(),
                depth,
                result,
            });

            if failed {
                tracing::debug!("Not expanding failed page {}", url);
                return;
            }

            let children: Vec<String> = {
                let visited = self.lock_visited();
                links
                    .into_iter()
                    .filter(|link| !visited.contains(link))
                    .collect()
            };

            match self.strategy {
                CrawlStrategy::Bfs => {
                    future::join_all(children.into_iter().map(|c| self.visit(c, depth + 1))).await;
                }
                CrawlStrategy::Dfs => {
                    for child in children {
                        self.visit(child, depth + 1).await;
                    }
                }
            }
        })
    }

    /// Marks `url` visited if the page budget allows and it is new
    fn claim(&self, url: &str) -> bool {
        let mut visited = self.lock_visited();
        if visited.len() >= self.max_pages || visited.contains(url) {
            return false;
        }
        visited.insert(url.to_string())
    }

    fn lock_visited(&self) -> MutexGuard<'_, HashSet<String>> {
        self.visited.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_pages(&self) -> MutexGuard<'_, Vec<TraversalPage>> {
        self.pages.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
