//! Extraction templates
//!
//! A template names the fields to pull out of a page and carries the options
//! that shape how pages are fetched. This module provides:
//! - The template data model
//! - Validation of raw template data
//! - Reading and writing template files
//! - Applying a template to a fetched page

mod engine;
mod files;
mod types;
mod validation;

pub use engine::{
    apply_template, AppliedTemplate, ExtractError, ExtractedFields, FieldExtractor,
    UnimplementedExtractor,
};
pub use files::{list_template_files, load_template, save_template, TemplateFileError};
pub use types::{AdvancedConfig, CrawlStrategy, ExtractField, ExtractionTemplate, FieldType};
pub use validation::{validate_template, validate_template_str};
