//! Scenarios
//!
//! A scenario is a named, reusable extraction recipe: a template describing
//! what to pull out of a page, plus the fetch behaviour used to get there.
//! Scenarios are registered by factory in a [`ScenarioRegistry`] and
//! instantiated on first use.

mod academic;
mod custom;
mod docs;
mod ecommerce;
mod news;
mod registry;
mod table;

pub use academic::AcademicCollector;
pub use custom::TemplateScenario;
pub use docs::DocsArchiver;
pub use ecommerce::EcommerceMonitor;
pub use news::NewsCrawler;
pub use registry::{RegistryError, ScenarioRegistry};
pub use table::TableExtractor;

use crate::crawler::TraversalResult;
use crate::fetch::{FetchConfig, FetchResult, PageFetcher};
use crate::template::ExtractionTemplate;
use async_trait::async_trait;
use serde::Serialize;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// What a scenario produced for one URL
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionResult {
    /// A single page fetch
    Page(FetchResult),
    /// A deep crawl rooted at the URL
    DeepCrawl(TraversalResult),
}

impl ExtractionResult {
    pub fn is_success(&self) -> bool {
        match self {
            Self::Page(result) => result.is_success(),
            Self::DeepCrawl(result) => result.success,
        }
    }

    /// Number of pages fetched
    pub fn page_count(&self) -> usize {
        match self {
            Self::Page(_) => 1,
            Self::DeepCrawl(result) => result.total_pages,
        }
    }
}

/// A reusable extraction recipe
#[async_trait]
pub trait Scenario: Send + Sync {
    /// The template describing this scenario
    fn schema(&self) -> ExtractionTemplate;

    /// Fetch options used by [`Scenario::extract`]
    fn fetch_config(&self) -> FetchConfig {
        FetchConfig::from_template(&self.schema())
    }

    /// Runs the scenario against `url`
    ///
    /// The default fetches the page once and passes the result through.
    async fn extract(&self, url: &str, fetcher: Arc<dyn PageFetcher>) -> ExtractionResult {
        let config = self.fetch_config();
        ExtractionResult::Page(fetch_once(fetcher.as_ref(), url, &config).await)
    }

    /// Checks that the schema is usable: a non-empty name and at least one field
    ///
    /// A panic while building the schema is reported as a failure.
    fn validate(&self) -> Result<(), String> {
        let schema = catch_unwind(AssertUnwindSafe(|| self.schema()))
            .map_err(|_| "schema construction panicked".to_string())?;

        if schema.name.trim().is_empty() {
            return Err("scenario name cannot be empty".to_string());
        }
        if schema.fields.is_empty() {
            return Err(format!("scenario '{}' declares no fields", schema.name));
        }
        Ok(())
    }
}

/// Fetches one page, turning a fetcher error into a failure result
pub(crate) async fn fetch_once(
    fetcher: &dyn PageFetcher,
    url: &str,
    config: &FetchConfig,
) -> FetchResult {
    match fetcher.fetch(url, config).await {
        Ok(result) => result,
        Err(e) => {
            tracing::warn!("Fetcher error for {}: {}", url, e);
            FetchResult::failure(format!("fetch exception: {e}"))
        }
    }
}
