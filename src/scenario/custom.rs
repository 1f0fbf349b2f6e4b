use crate::crawler::DeepCrawler;
use crate::fetch::PageFetcher;
use crate::scenario::{fetch_once, ExtractionResult, Scenario};
use crate::template::ExtractionTemplate;
use async_trait::async_trait;
use std::sync::Arc;

/// Link depth used when a custom template asks for a deep crawl
pub const CUSTOM_MAX_DEPTH: u32 = 3;

/// A scenario built from a caller-supplied template
///
/// The template is expected to have passed
/// [`validate_template`](crate::template::validate_template). If its advanced
/// options enable `deep_crawl`, extraction crawls from the URL with the
/// template's strategy and page budget; otherwise it fetches the page once.
#[derive(Debug, Clone)]
pub struct TemplateScenario {
    template: ExtractionTemplate,
}

impl TemplateScenario {
    pub fn new(template: ExtractionTemplate) -> Self {
        Self { template }
    }
}

#[async_trait]
impl Scenario for TemplateScenario {
    fn schema(&self) -> ExtractionTemplate {
        self.template.clone()
    }

    async fn extract(&self, url: &str, fetcher: Arc<dyn PageFetcher>) -> ExtractionResult {
        let config = self.fetch_config();

        match &self.template.advanced {
            Some(advanced) if advanced.deep_crawl => {
                let result = DeepCrawler::new(fetcher)
                    .traverse(
                        url,
                        advanced.strategy,
                        advanced.max_pages,
                        CUSTOM_MAX_DEPTH,
                        &config,
                    )
                    .await;
                ExtractionResult::DeepCrawl(result)
            }
            _ => ExtractionResult::Page(fetch_once(fetcher.as_ref(), url, &config).await),
        }
    }
}
