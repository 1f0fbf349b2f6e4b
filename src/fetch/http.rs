//! HTTP fetcher implementation
//!
//! [`HttpFetcher`] is the plain-HTTP [`PageFetcher`]:
//! - Building HTTP clients from the `[fetcher]` configuration
//! - Honouring the per-call delay, proxy and cache mode
//! - Classifying HTTP and transport errors into failure messages
//!
//! Nothing is retried. Scroll options are accepted and ignored since no page
//! is rendered.

use crate::config::FetcherConfig;
use crate::fetch::parser::parse_page;
use crate::fetch::{CacheMode, FetchConfig, FetchError, FetchResult, PageFetcher};
use async_trait::async_trait;
use reqwest::header::{CACHE_CONTROL, CONTENT_TYPE, PRAGMA};
use reqwest::{Client, Proxy};
use std::time::Duration;

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use trawl::config::FetcherConfig;
/// use trawl::fetch::build_http_client;
///
/// let client = build_http_client(&FetcherConfig::default(), None).unwrap();
/// ```
pub fn build_http_client(config: &FetcherConfig, proxy: Option<&str>) -> Result<Client, FetchError> {
    let mut builder = Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .gzip(true)
        .brotli(true);

    if let Some(proxy) = proxy {
        let proxy = Proxy::all(proxy).map_err(|e| FetchError::InvalidProxy {
            proxy: proxy.to_string(),
            message: e.to_string(),
        })?;
        builder = builder.proxy(proxy);
    }

    Ok(builder.build()?)
}

/// Fetches pages over plain HTTP and parses them as HTML
pub struct HttpFetcher {
    client: Client,
    config: FetcherConfig,
}

impl HttpFetcher {
    pub fn new(config: &FetcherConfig) -> Result<Self, FetchError> {
        Ok(Self {
            client: build_http_client(config, None)?,
            config: config.clone(),
        })
    }

    /// Returns the shared client, or a dedicated one when a proxy is requested
    fn client_for(&self, fetch_config: &FetchConfig) -> Result<Client, FetchError> {
        match fetch_config.proxy.as_deref() {
            Some(proxy) => build_http_client(&self.config, Some(proxy)),
            None => Ok(self.client.clone()),
        }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, config: &FetchConfig) -> Result<FetchResult, FetchError> {
        if let Some(delay) = config.delay {
            tracing::debug!("Waiting {:?} before fetching {}", delay, url);
            tokio::time::sleep(delay).await;
        }

        let client = self.client_for(config)?;
        let mut request = client.get(url);
        if config.cache_mode != CacheMode::Enabled {
            request = request.header(CACHE_CONTROL, "no-cache").header(PRAGMA, "no-cache");
        }

        tracing::debug!("Fetching {}", url);
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return Ok(FetchResult::failure(classify_error(&e))),
        };

        let status = response.status();
        if !status.is_success() {
            tracing::debug!("{} returned {}", url, status);
            return Ok(FetchResult::failure(format!("HTTP {}", status.as_u16())));
        }

        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !is_html(&content_type) {
            return Ok(FetchResult::failure(format!(
                "Expected HTML content, got '{content_type}'"
            )));
        }

        match response.text().await {
            Ok(body) => Ok(FetchResult::success(parse_page(
                &body,
                &final_url,
                config.word_count_threshold,
            ))),
            Err(e) => Ok(FetchResult::failure(classify_error(&e))),
        }
    }
}

fn is_html(content_type: &str) -> bool {
    let content_type = content_type.to_ascii_lowercase();
    content_type.contains("text/html") || content_type.contains("application/xhtml+xml")
}

fn classify_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "Request timeout".to_string()
    } else if error.is_connect() {
        format!("Connection failed: {error}")
    } else {
        error.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn html(body: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "text/html")
    }

    fn fetcher() -> HttpFetcher {
        HttpFetcher::new(&FetcherConfig::default()).unwrap()
    }

    #[test]
    fn test_build_http_client() {
        assert!(build_http_client(&FetcherConfig::default(), None).is_ok());
    }

    #[test]
    fn test_invalid_proxy_rejected() {
        let result = build_http_client(&FetcherConfig::default(), Some("not a proxy url"));
        assert!(matches!(result, Err(FetchError::InvalidProxy { .. })));
    }

    #[tokio::test]
    async fn test_fetch_html_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/docs"))
            .respond_with(html(
                r#"<html><head><title>Docs</title></head>
                <body><main><p>Getting started</p></main>
                <a href="/docs/install">Install</a>
                <a href="https://crates.io/">Crates</a></body></html>"#,
            ))
            .mount(&server)
            .await;

        let url = format!("{}/docs", server.uri());
        let result = fetcher().fetch(&url, &FetchConfig::default()).await.unwrap();

        let page = result.page().expect("fetch should succeed");
        assert_eq!(page.url, url);
        assert_eq!(page.metadata.title.as_deref(), Some("Docs"));
        assert_eq!(page.fit_content, "Getting started");
        assert_eq!(page.links.internal, vec![format!("{}/docs/install", server.uri())]);
        assert_eq!(page.links.external, vec!["https://crates.io/"]);
    }

    #[tokio::test]
    async fn test_http_error_is_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let result = fetcher()
            .fetch(&format!("{}/missing", server.uri()), &FetchConfig::default())
            .await
            .unwrap();
        assert_eq!(result.error(), Some("HTTP 404"));
    }

    #[tokio::test]
    async fn test_non_html_is_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(b"{}".to_vec(), "application/json"))
            .mount(&server)
            .await;

        let result = fetcher()
            .fetch(&format!("{}/api", server.uri()), &FetchConfig::default())
            .await
            .unwrap();
        assert!(!result.is_success());
        assert!(result.error().unwrap().contains("application/json"));
    }

    #[tokio::test]
    async fn test_cache_bypass_sends_no_cache() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("cache-control", "no-cache"))
            .respond_with(html("<html><body><p>fresh</p></body></html>"))
            .expect(1)
            .mount(&server)
            .await;

        let config = FetchConfig::default().with_cache_mode(CacheMode::Bypass);
        let result = fetcher()
            .fetch(&format!("{}/", server.uri()), &config)
            .await
            .unwrap();
        assert!(result.is_success());
    }

    #[tokio::test]
    async fn test_connection_refused_is_failure() {
        let result = fetcher()
            .fetch("http://127.0.0.1:1/", &FetchConfig::default())
            .await
            .unwrap();
        assert!(!result.is_success());
    }

    #[tokio::test]
    async fn test_delay_is_honoured() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(html("<html><body></body></html>"))
            .mount(&server)
            .await;

        let config = FetchConfig {
            delay: Some(Duration::from_millis(150)),
            ..FetchConfig::default()
        };
        let started = std::time::Instant::now();
        fetcher()
            .fetch(&format!("{}/", server.uri()), &config)
            .await
            .unwrap();
        assert!(started.elapsed() >= Duration::from_millis(150));
    }
}
