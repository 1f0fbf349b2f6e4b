//! Sink trait and error types

use crate::crawler::TraversalResult;
use crate::fetch::FetchResult;
use crate::sink::{PageRecord, RunRecord};
use thiserror::Error;

/// Errors that can occur while recording results
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Got {results} results for {urls} URLs")]
    LengthMismatch { urls: usize, results: usize },

    #[error("Corrupt row: {0}")]
    Corrupt(String),
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// Destination for finished orchestration results
pub trait ResultSink {
    /// Records a batch; `results[i]` belongs to `urls[i]`
    ///
    /// Returns the new run id.
    fn record_batch(
        &mut self,
        label: &str,
        urls: &[String],
        results: &[FetchResult],
    ) -> SinkResult<i64>;

    /// Records a deep crawl from `seed`
    ///
    /// Returns the new run id.
    fn record_traversal(
        &mut self,
        label: &str,
        seed: &str,
        result: &TraversalResult,
    ) -> SinkResult<i64>;

    fn get_run(&self, run_id: i64) -> SinkResult<RunRecord>;

    /// Pages of a run, in recorded order
    fn pages_for_run(&self, run_id: i64) -> SinkResult<Vec<PageRecord>>;

    fn count_runs(&self) -> SinkResult<u64>;
}
