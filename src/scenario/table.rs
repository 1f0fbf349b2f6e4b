use crate::fetch::FetchConfig;
use crate::scenario::Scenario;
use crate::template::{AdvancedConfig, ExtractField, ExtractionTemplate, FieldType};

/// HTML tables: caption, header cells and rows
#[derive(Debug, Default)]
pub struct TableExtractor;

impl Scenario for TableExtractor {
    fn schema(&self) -> ExtractionTemplate {
        ExtractionTemplate::new("table_extractor")
            .with_description("Tables: caption, headers and rows as structured data")
            .with_category("table")
            .with_field(ExtractField::new(
                "table_title",
                "caption, .table-title, figcaption",
                FieldType::Text,
            ))
            .with_field(ExtractField::new("table_headers", "thead th", FieldType::Text).multiple())
            .with_field(ExtractField::new("table_rows", "tbody tr", FieldType::Text).multiple())
            .with_advanced(AdvancedConfig {
                delay: 0.5,
                ..AdvancedConfig::default()
            })
    }

    /// Single-word cells must survive content filtering
    fn fetch_config(&self) -> FetchConfig {
        FetchConfig::from_template(&self.schema()).with_word_count_threshold(1)
    }
}
