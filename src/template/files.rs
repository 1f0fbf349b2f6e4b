//! Template files on disk
//!
//! Custom templates live as `.json` or `.toml` files in the configured
//! templates directory. Both formats go through the same validator.

use crate::template::types::ExtractionTemplate;
use crate::template::validation::validate_template;
use crate::ValidationError;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while reading or writing template files
#[derive(Debug, Error)]
pub enum TemplateFileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON template: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse TOML template: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Unsupported template file extension: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid template in {path}: {source}")]
    Invalid {
        path: String,
        source: ValidationError,
    },
}

const TEMPLATE_EXTENSIONS: &[&str] = &["json", "toml"];

/// Loads and validates a template file
///
/// The format is picked from the file extension (`.json` or `.toml`).
pub fn load_template(path: &Path) -> Result<ExtractionTemplate, TemplateFileError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let content = std::fs::read_to_string(path)?;
    let raw: serde_json::Value = match extension.as_str() {
        "json" => serde_json::from_str(&content)?,
        "toml" => {
            let value: toml::Value = toml::from_str(&content)?;
            serde_json::to_value(value)?
        }
        other => return Err(TemplateFileError::UnsupportedFormat(other.to_string())),
    };

    validate_template(&raw).map_err(|source| TemplateFileError::Invalid {
        path: path.display().to_string(),
        source,
    })
}

/// Writes a template as pretty-printed JSON into `dir`
///
/// The directory is created if needed. Returns the path written.
pub fn save_template(
    template: &ExtractionTemplate,
    dir: &Path,
    filename: &str,
) -> Result<PathBuf, TemplateFileError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(filename);
    let json = serde_json::to_string_pretty(template)?;
    std::fs::write(&path, json)?;
    tracing::debug!("Saved template '{}' to {}", template.name, path.display());
    Ok(path)
}

/// Lists template files in `dir`, sorted by file name
///
/// A missing directory yields an empty list.
pub fn list_template_files(dir: &Path) -> Result<Vec<PathBuf>, TemplateFileError> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| TEMPLATE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        })
        .collect();
    files.sort();
    Ok(files)
}
