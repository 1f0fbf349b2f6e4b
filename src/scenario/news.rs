use crate::scenario::Scenario;
use crate::template::{AdvancedConfig, ExtractField, ExtractionTemplate, FieldType};

/// News articles: headline, body, byline, date and tags
#[derive(Debug, Default)]
pub struct NewsCrawler;

impl Scenario for NewsCrawler {
    fn schema(&self) -> ExtractionTemplate {
        ExtractionTemplate::new("news_crawler")
            .with_description("News articles: title, body, author, publish date and tags")
            .with_category("news")
            .with_field(ExtractField::new("title", "h1", FieldType::Text).required())
            .with_field(
                ExtractField::new("content", "article p, .content, .article-body", FieldType::Text)
                    .required()
                    .multiple(),
            )
            .with_field(ExtractField::new(
                "author",
                ".author, [itemprop*='author'], .byline",
                FieldType::Text,
            ))
            .with_field(ExtractField::new(
                "publish_date",
                "time, .date, [datetime], .publish-date",
                FieldType::Text,
            ))
            .with_field(ExtractField::new("tags", ".tags a, .category", FieldType::Text).multiple())
            .with_advanced(AdvancedConfig {
                delay: 1.0,
                ..AdvancedConfig::default()
            })
    }
}
