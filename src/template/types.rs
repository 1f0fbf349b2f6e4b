use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// How a field's value is pulled out of a matched element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Text content of the element
    #[default]
    Text,
    /// Text content parsed as a number
    Number,
    /// Link target (`href`)
    Link,
    /// Image source (`src`)
    Image,
    /// A named attribute, given by [`ExtractField::attribute`]
    Attribute,
}

impl FieldType {
    /// Returns the lowercase name used in template files
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Link => "link",
            Self::Image => "image",
            Self::Attribute => "attribute",
        }
    }
}

impl FromStr for FieldType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "number" => Ok(Self::Number),
            "link" => Ok(Self::Link),
            "image" => Ok(Self::Image),
            "attribute" => Ok(Self::Attribute),
            _ => Err(()),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Link-following order for deep crawls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CrawlStrategy {
    /// Children of a page are crawled concurrently
    #[default]
    Bfs,
    /// Children of a page are crawled one subtree at a time
    Dfs,
}

impl CrawlStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bfs => "bfs",
            Self::Dfs => "dfs",
        }
    }
}

impl FromStr for CrawlStrategy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bfs" => Ok(Self::Bfs),
            "dfs" => Ok(Self::Dfs),
            _ => Err(()),
        }
    }
}

impl fmt::Display for CrawlStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One declared extraction rule
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractField {
    /// Field name, unique within its template
    pub name: String,

    /// Opaque locator (usually a CSS selector)
    pub selector: String,

    /// Extraction type
    #[serde(rename = "type")]
    pub field_type: FieldType,

    /// Attribute to read; set exactly when `field_type` is `Attribute`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,

    /// Whether the field must be present
    pub required: bool,

    /// Whether to collect every match instead of the first one
    pub multiple: bool,
}

impl ExtractField {
    /// Creates an optional, single-valued field
    pub fn new(name: impl Into<String>, selector: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            selector: selector.into(),
            field_type,
            attribute: None,
            required: false,
            multiple: false,
        }
    }

    /// Creates an attribute field reading `attribute` from matched elements
    pub fn attribute(
        name: impl Into<String>,
        selector: impl Into<String>,
        attribute: impl Into<String>,
    ) -> Self {
        Self {
            attribute: Some(attribute.into()),
            ..Self::new(name, selector, FieldType::Attribute)
        }
    }

    /// Marks the field as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Marks the field as collecting every match
    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }
}

/// Crawl-shaping options attached to a template
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdvancedConfig {
    pub deep_crawl: bool,
    pub max_pages: u32,
    pub strategy: CrawlStrategy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,
    /// Seconds to wait before each request
    pub delay: f64,
    pub scroll_to_load: bool,
    pub max_scrolls: u32,
}

impl Default for AdvancedConfig {
    fn default() -> Self {
        Self {
            deep_crawl: false,
            max_pages: 10,
            strategy: CrawlStrategy::Bfs,
            proxy: None,
            delay: 0.0,
            scroll_to_load: false,
            max_scrolls: 10,
        }
    }
}

/// A named extraction configuration: the fields to pull out of a page and
/// the options controlling how pages are fetched
///
/// Templates are built by scenario code or by [`validate_template`](super::validate_template)
/// and are never modified afterwards; an update produces a new value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionTemplate {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category: String,
    pub fields: Vec<ExtractField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advanced: Option<AdvancedConfig>,
}

pub(crate) const DEFAULT_CATEGORY: &str = "custom";

impl ExtractionTemplate {
    /// Creates a template with no fields in the default "custom" category
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            category: DEFAULT_CATEGORY.to_string(),
            fields: Vec::new(),
            advanced: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_field(mut self, field: ExtractField) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_advanced(mut self, advanced: AdvancedConfig) -> Self {
        self.advanced = Some(advanced);
        self
    }

    /// Returns the advanced options, or the defaults when none were given
    pub fn advanced_or_default(&self) -> AdvancedConfig {
        self.advanced.clone().unwrap_or_default()
    }

    /// Returns true if this template asks for a deep crawl
    pub fn is_deep_crawl(&self) -> bool {
        self.advanced.as_ref().is_some_and(|a| a.deep_crawl)
    }

    /// Looks up a field by name
    pub fn field(&self, name: &str) -> Option<&ExtractField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_type_parse() {
        assert_eq!("text".parse::<FieldType>(), Ok(FieldType::Text));
        assert_eq!("attribute".parse::<FieldType>(), Ok(FieldType::Attribute));
        assert!("TEXT".parse::<FieldType>().is_err());
        assert!("html".parse::<FieldType>().is_err());
    }

    #[test]
    fn test_field_builder_defaults() {
        let field = ExtractField::new("title", "h1", FieldType::Text);
        assert!(!field.required);
        assert!(!field.multiple);
        assert_eq!(field.attribute, None);

        let field = field.required().multiple();
        assert!(field.required);
        assert!(field.multiple);
    }

    #[test]
    fn test_advanced_defaults() {
        let advanced = AdvancedConfig::default();
        assert!(!advanced.deep_crawl);
        assert_eq!(advanced.max_pages, 10);
        assert_eq!(advanced.strategy, CrawlStrategy::Bfs);
        assert_eq!(advanced.delay, 0.0);
    }

    #[test]
    fn test_template_defaults_to_custom_category() {
        let template = ExtractionTemplate::new("custom_feed");
        assert_eq!(template.category, "custom");
        assert!(!template.is_deep_crawl());
    }

    #[test]
    fn test_template_serializes_type_key() {
        let template = ExtractionTemplate::new("t").with_field(ExtractField::attribute(
            "logo",
            "img.logo",
            "src",
        ));
        let json = serde_json::to_value(&template).unwrap();
        assert_eq!(json["fields"][0]["type"], "attribute");
        assert_eq!(json["fields"][0]["attribute"], "src");
        assert!(json.get("advanced").is_none());
    }
}
