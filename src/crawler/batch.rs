//! Bounded-concurrency batch fetching

use crate::fetch::{FetchConfig, FetchError, FetchResult, PageFetcher};
use futures::future;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Fetches many independent URLs with at most `max_concurrent` in flight
///
/// One task is spawned per URL up front. Each task holds a semaphore permit
/// for the duration of its fetch.
pub struct BatchExecutor {
    fetcher: Arc<dyn PageFetcher>,
}

impl BatchExecutor {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { fetcher }
    }

    /// Fetches every URL and returns one result per URL, in input order
    ///
    /// A `max_concurrent` of 0 is treated as 1. A fetcher error or a panicking
    /// task becomes a `task exception` failure at its position; the batch
    /// itself never fails.
    pub async fn run_batch(
        &self,
        urls: &[String],
        config: &FetchConfig,
        max_concurrent: usize,
    ) -> Vec<FetchResult> {
        let permits = max_concurrent.max(1);
        tracing::info!(
            "Running batch of {} URLs with {} concurrent fetches",
            urls.len(),
            permits
        );

        let semaphore = Arc::new(Semaphore::new(permits));

        let tasks = urls
            .iter()
            .map(|url| {
                let semaphore = semaphore.clone();
                let fetcher = self.fetcher.clone();
                let config = config.clone();
                let url = url.clone();

                tokio::spawn(async move {
                    let _permit = semaphore
                        .acquire_owned()
                        .await
                        .map_err(|e| FetchError::Other(e.to_string()))?;

                    tracing::debug!("Fetching {}", url);
                    fetcher.fetch(&url, &config).await
                })
            })
            .collect::<Vec<_>>();

        let results: Vec<FetchResult> = future::join_all(tasks)
            .await
            .into_iter()
            .zip(urls)
            .map(|(joined, url)| match joined {
                Ok(Ok(result)) => result,
                Ok(Err(e)) => {
                    tracing::warn!("Fetcher error for {}: {}", url, e);
                    FetchResult::failure(format!("task exception: {e}"))
                }
                Err(e) => {
                    tracing::warn!("Fetch task for {} did not complete: {}", url, e);
                    FetchResult::failure(format!("task exception: {e}"))
                }
            })
            .collect();

        let failed = results.iter().filter(|r| !r.is_success()).count();
        tracing::info!(
            "Batch complete: {} succeeded, {} failed",
            results.len() - failed,
            failed
        );

        results
    }
}
