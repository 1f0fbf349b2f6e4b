//! Fetch result model
//!
//! A [`FetchResult`] is produced fresh for every fetch call and is never cached.

use serde::{Deserialize, Serialize};

/// Links found on a page, partitioned by host
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Links {
    /// Links to the same site as the page
    pub internal: Vec<String>,
    /// Links to other sites
    pub external: Vec<String>,
}

/// Media referenced by a page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Media {
    pub images: Vec<String>,
    pub videos: Vec<String>,
    pub audio: Vec<String>,
}

/// Document-level metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub keywords: Vec<String>,
}

/// A successfully fetched page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FetchedPage {
    /// Final URL of the page
    pub url: String,

    /// Content as received
    pub raw_content: String,

    /// Content narrowed to the main body
    pub fit_content: String,

    /// Fetcher-specific structured output
    pub extracted_content: Option<serde_json::Value>,

    pub links: Links,
    pub media: Media,
    pub metadata: PageMetadata,

    /// Base64 screenshot, for fetchers that render pages
    pub screenshot: Option<String>,
}

impl FetchedPage {
    /// Creates an empty page for `url`
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }
}

/// Outcome of one page fetch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FetchResult {
    /// The page was fetched
    Success(Box<FetchedPage>),

    /// The page could not be fetched
    Failure {
        /// Human-readable reason
        error: String,
    },
}

impl FetchResult {
    pub fn success(page: FetchedPage) -> Self {
        Self::Success(Box::new(page))
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self::Failure {
            error: error.into(),
        }
    }

    /// Returns true if the fetch succeeded
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns the failure message, if any
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::Failure { error } => Some(error),
        }
    }

    /// Returns the fetched page, if any
    pub fn page(&self) -> Option<&FetchedPage> {
        match self {
            Self::Success(page) => Some(page),
            Self::Failure { .. } => None,
        }
    }

    /// Returns the internal links of a successful fetch (empty on failure)
    pub fn internal_links(&self) -> &[String] {
        self.page().map_or(&[], |page| page.links.internal.as_slice())
    }

    /// Returns the page title of a successful fetch
    pub fn title(&self) -> Option<&str> {
        self.page().and_then(|page| page.metadata.title.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_accessors() {
        let result = FetchResult::failure("HTTP 404 Not Found");
        assert!(!result.is_success());
        assert_eq!(result.error(), Some("HTTP 404 Not Found"));
        assert!(result.page().is_none());
        assert!(result.internal_links().is_empty());
    }

    #[test]
    fn test_success_accessors() {
        let mut page = FetchedPage::new("https://example.com/");
        page.links.internal = vec!["https://example.com/a".to_string()];
        page.metadata.title = Some("Home".to_string());

        let result = FetchResult::success(page);
        assert!(result.is_success());
        assert_eq!(result.error(), None);
        assert_eq!(result.internal_links(), ["https://example.com/a".to_string()]);
        assert_eq!(result.title(), Some("Home"));
    }

    #[test]
    fn test_serialized_status_tag() {
        let failure = serde_json::to_value(FetchResult::failure("boom")).unwrap();
        assert_eq!(failure["status"], "failure");
        assert_eq!(failure["error"], "boom");

        let success =
            serde_json::to_value(FetchResult::success(FetchedPage::new("https://a.test/"))).unwrap();
        assert_eq!(success["status"], "success");
        assert_eq!(success["url"], "https://a.test/");
    }
}
