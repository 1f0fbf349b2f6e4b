use crate::scenario::Scenario;
use crate::template::{AdvancedConfig, ExtractField, ExtractionTemplate, FieldType};

/// Academic papers: title, authors, abstract and citation data
#[derive(Debug, Default)]
pub struct AcademicCollector;

impl Scenario for AcademicCollector {
    fn schema(&self) -> ExtractionTemplate {
        ExtractionTemplate::new("academic_collector")
            .with_description("Academic papers: title, authors, abstract, keywords and citation")
            .with_category("academic")
            .with_field(
                ExtractField::new(
                    "title",
                    "h1, .paper-title, [itemprop*='headline']",
                    FieldType::Text,
                )
                .required(),
            )
            .with_field(
                ExtractField::new("authors", ".authors a, [itemprop*='author']", FieldType::Text)
                    .multiple(),
            )
            .with_field(ExtractField::new("abstract", ".abstract, .summary", FieldType::Text))
            .with_field(
                ExtractField::new(
                    "keywords",
                    ".keywords a, [itemprop*='keywords']",
                    FieldType::Text,
                )
                .multiple(),
            )
            .with_field(ExtractField::new(
                "publication_date",
                "time, .date, .pub-date",
                FieldType::Text,
            ))
            .with_field(ExtractField::new(
                "pdf_url",
                ".pdf-link a, .download-pdf",
                FieldType::Link,
            ))
            .with_field(ExtractField::new("citation", ".citation, .bibtex", FieldType::Text))
            .with_advanced(AdvancedConfig {
                delay: 1.5,
                ..AdvancedConfig::default()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema() {
        let schema = AcademicCollector.schema();
        assert_eq!(schema.name, "academic_collector");
        assert_eq!(schema.fields.len(), 7);
        assert_eq!(schema.field("pdf_url").unwrap().field_type, FieldType::Link);
        assert!(!schema.is_deep_crawl());
        assert!(AcademicCollector.validate().is_ok());
    }
}
