use crate::crawler::DeepCrawler;
use crate::fetch::{CacheMode, PageFetcher};
use crate::scenario::{ExtractionResult, Scenario};
use crate::template::{AdvancedConfig, CrawlStrategy, ExtractField, ExtractionTemplate, FieldType};
use async_trait::async_trait;
use std::sync::Arc;

const ARCHIVE_MAX_PAGES: u32 = 50;
const ARCHIVE_MAX_DEPTH: u32 = 3;

/// Documentation sites, archived by crawling from the entry page
#[derive(Debug, Default)]
pub struct DocsArchiver;

#[async_trait]
impl Scenario for DocsArchiver {
    fn schema(&self) -> ExtractionTemplate {
        ExtractionTemplate::new("docs_archiver")
            .with_description("Documentation sites: deep crawl of every reachable page")
            .with_category("docs")
            .with_field(ExtractField::new("title", "h1", FieldType::Text).required())
            .with_field(
                ExtractField::new(
                    "content",
                    "article, .content, .docs-content, main",
                    FieldType::Text,
                )
                .required(),
            )
            .with_field(
                ExtractField::new(
                    "breadcrumbs",
                    ".breadcrumbs a, .breadcrumb a",
                    FieldType::Text,
                )
                .multiple(),
            )
            .with_advanced(AdvancedConfig {
                deep_crawl: true,
                max_pages: 100,
                strategy: CrawlStrategy::Bfs,
                delay: 0.5,
                ..AdvancedConfig::default()
            })
    }

    /// Crawls breadth-first from `url`, always bypassing the cache
    async fn extract(&self, url: &str, fetcher: Arc<dyn PageFetcher>) -> ExtractionResult {
        let config = self.fetch_config().with_cache_mode(CacheMode::Bypass);
        let result = DeepCrawler::new(fetcher)
            .traverse(
                url,
                CrawlStrategy::Bfs,
                ARCHIVE_MAX_PAGES,
                ARCHIVE_MAX_DEPTH,
                &config,
            )
            .await;
        ExtractionResult::DeepCrawl(result)
    }
}
