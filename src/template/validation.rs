//! Template validation
//!
//! Raw configuration data (JSON, or TOML converted to JSON) is first
//! deserialized into permissive `Raw*` shapes and then checked field by field,
//! so every rejection carries a specific [`ValidationError`] instead of a
//! generic deserialization message.

use crate::template::types::{
    AdvancedConfig, CrawlStrategy, ExtractField, ExtractionTemplate, FieldType, DEFAULT_CATEGORY,
};
use crate::ValidationError;
use serde::Deserialize;
use std::collections::HashSet;

#[derive(Debug, Deserialize)]
struct RawTemplate {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    fields: Vec<RawField>,
    #[serde(default)]
    advanced: Option<RawAdvanced>,
}

#[derive(Debug, Deserialize)]
struct RawField {
    name: String,
    selector: String,
    #[serde(rename = "type", default = "default_field_type")]
    field_type: String,
    #[serde(default)]
    attribute: Option<String>,
    #[serde(default)]
    required: bool,
    #[serde(default)]
    multiple: bool,
}

#[derive(Debug, Deserialize)]
struct RawAdvanced {
    #[serde(default)]
    deep_crawl: bool,
    #[serde(default = "default_max_pages")]
    max_pages: u64,
    #[serde(default = "default_strategy")]
    strategy: String,
    #[serde(default)]
    proxy: Option<String>,
    #[serde(default)]
    delay: f64,
    #[serde(default)]
    scroll_to_load: bool,
    #[serde(default = "default_max_scrolls")]
    max_scrolls: u32,
}

/// Longest pause a template may request before each fetch (one hour)
const MAX_DELAY_SECS: f64 = 3600.0;

fn default_field_type() -> String {
    FieldType::Text.as_str().to_string()
}

fn default_max_pages() -> u64 {
    10
}

fn default_strategy() -> String {
    CrawlStrategy::Bfs.as_str().to_string()
}

fn default_max_scrolls() -> u32 {
    10
}

/// Validates raw configuration data into an [`ExtractionTemplate`]
///
/// A template with zero fields is accepted here. Whether such a template is
/// usable as a scenario is decided by [`Scenario::validate`](crate::scenario::Scenario::validate).
///
/// # Example
///
/// ```
/// use trawl::template::validate_template;
///
/// let raw = serde_json::json!({
///     "name": "custom_headlines",
///     "fields": [{ "name": "title", "selector": "h1", "type": "text", "required": true }]
/// });
/// let template = validate_template(&raw).unwrap();
/// assert_eq!(template.category, "custom");
/// assert_eq!(template.fields.len(), 1);
/// ```
pub fn validate_template(raw: &serde_json::Value) -> Result<ExtractionTemplate, ValidationError> {
    let raw = RawTemplate::deserialize(raw).map_err(|e| ValidationError::Malformed(e.to_string()))?;

    if raw.name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }

    let mut seen = HashSet::new();
    let mut fields = Vec::with_capacity(raw.fields.len());
    for (index, field) in raw.fields.into_iter().enumerate() {
        let field = validate_field(index, field)?;
        if !seen.insert(field.name.clone()) {
            return Err(ValidationError::DuplicateField(field.name));
        }
        fields.push(field);
    }

    let advanced = raw.advanced.map(validate_advanced).transpose()?;

    Ok(ExtractionTemplate {
        name: raw.name,
        description: raw.description,
        category: raw
            .category
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        fields,
        advanced,
    })
}

/// Validates a JSON document holding a template
pub fn validate_template_str(json: &str) -> Result<ExtractionTemplate, ValidationError> {
    let raw: serde_json::Value =
        serde_json::from_str(json).map_err(|e| ValidationError::Malformed(e.to_string()))?;
    validate_template(&raw)
}

fn validate_field(index: usize, raw: RawField) -> Result<ExtractField, ValidationError> {
    if raw.name.trim().is_empty() {
        return Err(ValidationError::EmptyFieldName { index });
    }

    let field_type: FieldType =
        raw.field_type
            .parse()
            .map_err(|_| ValidationError::InvalidFieldType {
                field: raw.name.clone(),
                value: raw.field_type.clone(),
            })?;

    let attribute = raw.attribute.filter(|a| !a.trim().is_empty());
    match (field_type, &attribute) {
        (FieldType::Attribute, None) => return Err(ValidationError::MissingAttribute(raw.name)),
        (FieldType::Attribute, Some(_)) | (_, None) => {}
        (_, Some(_)) => return Err(ValidationError::UnexpectedAttribute(raw.name)),
    }

    Ok(ExtractField {
        name: raw.name,
        selector: raw.selector,
        field_type,
        attribute,
        required: raw.required,
        multiple: raw.multiple,
    })
}

fn validate_advanced(raw: RawAdvanced) -> Result<AdvancedConfig, ValidationError> {
    let strategy: CrawlStrategy = raw
        .strategy
        .parse()
        .map_err(|_| ValidationError::InvalidStrategy(raw.strategy.clone()))?;

    if !(0.0..=MAX_DELAY_SECS).contains(&raw.delay) {
        return Err(ValidationError::InvalidDelay(raw.delay));
    }

    let max_pages = u32::try_from(raw.max_pages)
        .ok()
        .filter(|&pages| pages >= 1)
        .ok_or(ValidationError::InvalidMaxPages(raw.max_pages))?;

    Ok(AdvancedConfig {
        deep_crawl: raw.deep_crawl,
        max_pages,
        strategy,
        proxy: raw.proxy.filter(|p| !p.is_empty()),
        delay: raw.delay,
        scroll_to_load: raw.scroll_to_load,
        max_scrolls: raw.max_scrolls,
    })
}
