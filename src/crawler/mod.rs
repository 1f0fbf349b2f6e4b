//! Crawl orchestration
//!
//! This module holds the two ways pages are fetched in bulk:
//! - [`BatchExecutor`]: many independent URLs with bounded concurrency
//! - [`DeepCrawler`]: one seed expanded through its internal links

mod batch;
mod traversal;

pub use batch::BatchExecutor;
pub use traversal::{DeepCrawler, TraversalPage, TraversalResult};
