use serde::Deserialize;

/// Main configuration structure for Trawl
///
/// Every section is optional in the TOML file and falls back to its defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub batch: BatchConfig,
    #[serde(default, rename = "deep-crawl")]
    pub deep_crawl: DeepCrawlConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// HTTP fetcher configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FetcherConfig {
    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Total request timeout (seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Connection timeout (seconds)
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

/// Batch execution configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BatchConfig {
    /// Maximum number of fetches in flight at once
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
}

/// Defaults for deep crawls that do not come from a template
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DeepCrawlConfig {
    /// Maximum link depth from the seed URL
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,

    /// Maximum number of distinct pages visited
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Path to the SQLite database receiving run results
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Directory holding custom template files
    #[serde(default = "default_templates_dir")]
    pub templates_dir: String,
}

fn default_user_agent() -> String {
    format!("trawl/{}", env!("CARGO_PKG_VERSION"))
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_max_concurrent() -> usize {
    5
}

fn default_max_depth() -> u32 {
    3
}

fn default_max_pages() -> u32 {
    10
}

fn default_database_path() -> String {
    "./trawl.db".to_string()
}

fn default_templates_dir() -> String {
    "./templates".to_string()
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_concurrent: default_max_concurrent(),
        }
    }
}

impl Default for DeepCrawlConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            max_pages: default_max_pages(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            templates_dir: default_templates_dir(),
        }
    }
}
