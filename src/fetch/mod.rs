//! Page fetching
//!
//! The orchestration core only ever talks to the network through the
//! [`PageFetcher`] trait. This module defines that trait and the data it
//! exchanges, plus [`HttpFetcher`], a plain HTTP implementation:
//! - [`FetchConfig`]: per-call options derived from a template
//! - [`FetchResult`]: success with a parsed page, or a failure message
//! - [`FetchError`]: a fetcher-level fault (the "exception" path)

mod http;
#[cfg(test)]
pub(crate) mod mock;
mod parser;
mod result;

pub use http::{build_http_client, HttpFetcher};
pub use parser::parse_page;
pub use result::{FetchResult, FetchedPage, Links, Media, PageMetadata};

use crate::template::ExtractionTemplate;
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by a fetcher instead of producing a [`FetchResult`]
///
/// Orchestration code never lets these escape: the batch executor and the
/// deep crawler turn them into [`FetchResult::Failure`] entries.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Invalid proxy '{proxy}': {message}")]
    InvalidProxy { proxy: String, message: String },

    #[error("{0}")]
    Other(String),
}

/// Cache behaviour requested from the fetcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheMode {
    #[default]
    Enabled,
    Bypass,
    Disabled,
}

/// Options for a single fetch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FetchConfig {
    pub cache_mode: CacheMode,

    /// Text blocks with fewer words are dropped from the fit content
    pub word_count_threshold: usize,

    /// Pause before the request is sent
    pub delay: Option<Duration>,

    pub proxy: Option<String>,

    /// Rendering hints for fetchers driving a browser
    pub scroll_to_load: bool,
    pub max_scrolls: u32,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            cache_mode: CacheMode::Enabled,
            word_count_threshold: 1,
            delay: None,
            proxy: None,
            scroll_to_load: false,
            max_scrolls: 0,
        }
    }
}

impl FetchConfig {
    /// Derives fetch options from a template's advanced configuration
    pub fn from_template(template: &ExtractionTemplate) -> Self {
        let Some(advanced) = &template.advanced else {
            return Self::default();
        };

        Self {
            delay: Duration::try_from_secs_f64(advanced.delay)
                .ok()
                .filter(|delay| !delay.is_zero()),
            proxy: advanced.proxy.clone(),
            scroll_to_load: advanced.scroll_to_load,
            max_scrolls: if advanced.scroll_to_load {
                advanced.max_scrolls
            } else {
                0
            },
            ..Self::default()
        }
    }

    pub fn with_cache_mode(mut self, cache_mode: CacheMode) -> Self {
        self.cache_mode = cache_mode;
        self
    }

    pub fn with_word_count_threshold(mut self, threshold: usize) -> Self {
        self.word_count_threshold = threshold;
        self
    }
}

/// Capability to fetch one page
///
/// Implementations must be safe to call concurrently from many tasks.
/// A page that could not be fetched is reported as `Ok(FetchResult::Failure)`;
/// `Err` is reserved for faults in the fetcher itself.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str, config: &FetchConfig) -> Result<FetchResult, FetchError>;
}
