//! Template application
//!
//! [`apply_template`] fetches a page with the options of a template and hands
//! the page to a [`FieldExtractor`]. Selector-level extraction is a seam:
//! the default [`UnimplementedExtractor`] reports that it cannot extract
//! anything and the page is returned without field data.

use crate::fetch::{FetchConfig, FetchResult, FetchedPage, PageFetcher};
use crate::template::types::ExtractionTemplate;
use serde::Serialize;
use thiserror::Error;

/// Field values keyed by field name
pub type ExtractedFields = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractError {
    #[error("Field extraction is not implemented")]
    NotImplemented,

    #[error("Field extraction failed: {0}")]
    Failed(String),
}

/// Pulls declared field values out of a fetched page
pub trait FieldExtractor: Send + Sync {
    fn extract_fields(
        &self,
        template: &ExtractionTemplate,
        page: &FetchedPage,
    ) -> Result<ExtractedFields, ExtractError>;
}

/// Extractor used until selector evaluation exists
#[derive(Debug, Clone, Copy, Default)]
pub struct UnimplementedExtractor;

impl FieldExtractor for UnimplementedExtractor {
    fn extract_fields(
        &self,
        _template: &ExtractionTemplate,
        _page: &FetchedPage,
    ) -> Result<ExtractedFields, ExtractError> {
        Err(ExtractError::NotImplemented)
    }
}

/// A fetch result together with the fields pulled out of it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppliedTemplate {
    pub result: FetchResult,
    pub extracted_data: Option<ExtractedFields>,
}

/// Fetches `url` with the template's fetch options and extracts its fields
///
/// A failed fetch is returned untouched with no extracted data.
pub async fn apply_template(
    url: &str,
    template: &ExtractionTemplate,
    fetcher: &dyn PageFetcher,
    extractor: &dyn FieldExtractor,
) -> AppliedTemplate {
    let config = FetchConfig::from_template(template);

    let result = match fetcher.fetch(url, &config).await {
        Ok(result) => result,
        Err(e) => FetchResult::failure(format!("fetch exception: {e}")),
    };

    let extracted_data = match result.page() {
        None => None,
        Some(page) => match extractor.extract_fields(template, page) {
            Ok(fields) => Some(fields),
            Err(ExtractError::NotImplemented) => {
                tracing::debug!(
                    "No field extraction for template '{}' on {}",
                    template.name,
                    url
                );
                None
            }
            Err(e) => {
                tracing::warn!("Template '{}' on {}: {}", template.name, url, e);
                None
            }
        },
    };

    AppliedTemplate {
        result,
        extracted_data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetchError;
    use crate::template::types::{AdvancedConfig, ExtractField, FieldType};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Records the config it was called with and serves a fixed outcome
    struct RecordingFetcher {
        outcome: fn(&str) -> Result<FetchResult, FetchError>,
        seen: Mutex<Vec<FetchConfig>>,
    }

    impl RecordingFetcher {
        fn new(outcome: fn(&str) -> Result<FetchResult, FetchError>) -> Self {
            Self {
                outcome,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl PageFetcher for RecordingFetcher {
        async fn fetch(&self, url: &str, config: &FetchConfig) -> Result<FetchResult, FetchError> {
            self.seen.lock().unwrap().push(config.clone());
            (self.outcome)(url)
        }
    }

    struct TitleExtractor;

    impl FieldExtractor for TitleExtractor {
        fn extract_fields(
            &self,
            _template: &ExtractionTemplate,
            page: &FetchedPage,
        ) -> Result<ExtractedFields, ExtractError> {
            let mut fields = ExtractedFields::new();
            fields.insert("title".into(), page.metadata.title.clone().into());
            Ok(fields)
        }
    }

    struct BrokenExtractor;

    impl FieldExtractor for BrokenExtractor {
        fn extract_fields(
            &self,
            _template: &ExtractionTemplate,
            _page: &FetchedPage,
        ) -> Result<ExtractedFields, ExtractError> {
            Err(ExtractError::Failed("selector did not compile".into()))
        }
    }

    fn titled_page(url: &str) -> Result<FetchResult, FetchError> {
        let mut page = FetchedPage::new(url);
        page.metadata.title = Some("Hello".into());
        Ok(FetchResult::success(page))
    }

    fn template() -> ExtractionTemplate {
        ExtractionTemplate::new("custom_titles")
            .with_field(ExtractField::new("title", "h1", FieldType::Text))
            .with_advanced(AdvancedConfig {
                delay: 0.5,
                ..AdvancedConfig::default()
            })
    }

    #[tokio::test]
    async fn test_unimplemented_extractor_leaves_data_empty() {
        let fetcher = RecordingFetcher::new(titled_page);
        let applied =
            apply_template("https://a.test/", &template(), &fetcher, &UnimplementedExtractor).await;

        assert!(applied.result.is_success());
        assert!(applied.extracted_data.is_none());
    }

    #[tokio::test]
    async fn test_template_fetch_config_is_used() {
        let fetcher = RecordingFetcher::new(titled_page);
        apply_template("https://a.test/", &template(), &fetcher, &UnimplementedExtractor).await;

        let seen = fetcher.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].delay, Some(Duration::from_millis(500)));
    }

    #[tokio::test]
    async fn test_extracted_fields_are_attached() {
        let fetcher = RecordingFetcher::new(titled_page);
        let applied = apply_template("https://a.test/", &template(), &fetcher, &TitleExtractor).await;

        let data = applied.extracted_data.unwrap();
        assert_eq!(data["title"], "Hello");
    }

    #[tokio::test]
    async fn test_extractor_error_keeps_page() {
        let fetcher = RecordingFetcher::new(titled_page);
        let applied = apply_template("https://a.test/", &template(), &fetcher, &BrokenExtractor).await;

        assert!(applied.result.is_success());
        assert!(applied.extracted_data.is_none());
    }

    #[tokio::test]
    async fn test_failure_passes_through() {
        let fetcher = RecordingFetcher::new(|_| Ok(FetchResult::failure("HTTP 500")));
        let applied = apply_template("https://a.test/", &template(), &fetcher, &TitleExtractor).await;

        assert_eq!(applied.result, FetchResult::failure("HTTP 500"));
        assert!(applied.extracted_data.is_none());
    }

    #[tokio::test]
    async fn test_fetcher_error_becomes_failure() {
        let fetcher = RecordingFetcher::new(|_| Err(FetchError::Other("socket closed".into())));
        let applied = apply_template("https://a.test/", &template(), &fetcher, &TitleExtractor).await;

        assert_eq!(applied.result.error(), Some("fetch exception: socket closed"));
    }
}
