use crate::scenario::Scenario;
use crate::template::{AdvancedConfig, ExtractField, ExtractionTemplate, FieldType};

/// Product pages: price, stock, rating and images
#[derive(Debug, Default)]
pub struct EcommerceMonitor;

impl Scenario for EcommerceMonitor {
    fn schema(&self) -> ExtractionTemplate {
        ExtractionTemplate::new("ecommerce_monitor")
            .with_description("Product pages: price, stock, rating, review count and images")
            .with_category("ecommerce")
            .with_field(
                ExtractField::new(
                    "product_name",
                    "h1, .product-title, [itemprop*='name']",
                    FieldType::Text,
                )
                .required(),
            )
            .with_field(
                ExtractField::new(
                    "price",
                    ".price, [itemprop*='price'], .product-price",
                    FieldType::Text,
                )
                .required(),
            )
            .with_field(ExtractField::new(
                "original_price",
                ".original-price, .was-price",
                FieldType::Text,
            ))
            .with_field(ExtractField::new(
                "stock_status",
                ".stock, .availability, [itemprop*='availability']",
                FieldType::Text,
            ))
            .with_field(ExtractField::new(
                "rating",
                ".rating, [itemprop*='rating']",
                FieldType::Text,
            ))
            .with_field(ExtractField::new(
                "reviews_count",
                ".reviews-count, [itemprop*='reviewCount']",
                FieldType::Number,
            ))
            .with_field(
                ExtractField::new(
                    "image_url",
                    ".product-image img, [itemprop*='image']",
                    FieldType::Image,
                )
                .multiple(),
            )
            .with_advanced(AdvancedConfig {
                delay: 2.0,
                scroll_to_load: true,
                max_scrolls: 3,
                ..AdvancedConfig::default()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema() {
        let schema = EcommerceMonitor.schema();
        assert_eq!(schema.category, "ecommerce");
        assert_eq!(schema.fields.len(), 7);
        assert_eq!(schema.field("reviews_count").unwrap().field_type, FieldType::Number);
        assert!(EcommerceMonitor.validate().is_ok());
    }

    #[test]
    fn test_scrolls_to_load_reviews() {
        let config = EcommerceMonitor.fetch_config();
        assert!(config.scroll_to_load);
        assert_eq!(config.max_scrolls, 3);
    }
}
