//! Trawl: scenario-driven web extraction
//!
//! This crate fetches web pages and pulls structured data out of them according to
//! reusable scenario definitions. The orchestration core is made of four pieces:
//! template validation, a scenario registry, a bounded-concurrency batch executor
//! and a deep-crawl traversal engine. Page fetching and persistence are reached
//! only through the [`fetch::PageFetcher`] and [`sink::ResultSink`] traits.

pub mod config;
pub mod crawler;
pub mod fetch;
pub mod scenario;
pub mod sink;
pub mod template;
pub mod url;

use thiserror::Error;

/// Main error type for Trawl operations
#[derive(Debug, Error)]
pub enum TrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Template validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Template file error: {0}")]
    TemplateFile(#[from] template::TemplateFileError),

    #[error("Scenario registry error: {0}")]
    Registry(#[from] scenario::RegistryError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] fetch::FetchError),

    #[error("Sink error: {0}")]
    Sink(#[from] sink::SinkError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("Unknown scenario: {0}")]
    UnknownScenario(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Errors raised while turning raw configuration data into an extraction template
///
/// These are always recoverable: the caller decides how to report them.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Malformed template configuration: {0}")]
    Malformed(String),

    #[error("Template name cannot be empty")]
    EmptyName,

    #[error("Field #{index} has an empty name")]
    EmptyFieldName { index: usize },

    #[error("Duplicate field name '{0}'")]
    DuplicateField(String),

    #[error("Invalid extraction type '{value}' for field '{field}', expected one of: text, number, link, image, attribute")]
    InvalidFieldType { field: String, value: String },

    #[error("Field '{0}' has type 'attribute' but no attribute name")]
    MissingAttribute(String),

    #[error("Field '{0}' names an attribute but its type is not 'attribute'")]
    UnexpectedAttribute(String),

    #[error("Invalid crawl strategy '{0}', expected 'bfs' or 'dfs'")]
    InvalidStrategy(String),

    #[error("Delay must be between 0 and 3600 seconds, got {0}")]
    InvalidDelay(f64),

    #[error("max_pages must be >= 1, got {0}")]
    InvalidMaxPages(u64),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,

    #[error("Unfollowable link: {0}")]
    Unfollowable(String),
}

/// Result type alias for Trawl operations
pub type Result<T> = std::result::Result<T, TrawlError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{BatchExecutor, DeepCrawler, TraversalPage, TraversalResult};
pub use fetch::{FetchConfig, FetchResult, FetchedPage, PageFetcher};
pub use scenario::{ExtractionResult, Scenario, ScenarioRegistry};
pub use template::{
    validate_template, AdvancedConfig, CrawlStrategy, ExtractField, ExtractionTemplate, FieldType,
};
