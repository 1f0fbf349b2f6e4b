//! Integration tests for the extraction pipeline
//!
//! These tests use wiremock to serve small sites and drive the real
//! `HttpFetcher` through the registry, the executors and the SQLite sink.

use std::sync::Arc;
use trawl::config::FetcherConfig;
use trawl::crawler::{BatchExecutor, DeepCrawler};
use trawl::fetch::{FetchConfig, HttpFetcher, PageFetcher};
use trawl::scenario::{ExtractionResult, ScenarioRegistry};
use trawl::sink::{PageStatus, ResultSink, RunKind, SqliteSink};
use trawl::template::{apply_template, load_template, save_template, UnimplementedExtractor};
use trawl::CrawlStrategy;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "text/html")
}

fn fetcher() -> Arc<dyn PageFetcher> {
    Arc::new(HttpFetcher::new(&FetcherConfig::default()).expect("client should build"))
}

/// Serves `/ -> /a, /b` and `/a -> /c, /` with an external link on the root
async fn docs_site() -> MockServer {
    let server = MockServer::start().await;

    let pages = [
        (
            "/",
            r#"<html><head><title>Home</title></head><body>
                <a href="/a">A</a><a href="/b">B</a><a href="https://elsewhere.test/">Out</a>
            </body></html>"#,
        ),
        (
            "/a",
            r#"<html><head><title>A</title></head><body>
                <a href="/c">C</a><a href="/">Home</a>
            </body></html>"#,
        ),
        ("/b", "<html><head><title>B</title></head><body></body></html>"),
        ("/c", "<html><head><title>C</title></head><body></body></html>"),
    ];

    for (route, body) in pages {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(html(body))
            .mount(&server)
            .await;
    }

    server
}

#[tokio::test]
async fn test_deep_crawl_over_http_is_recorded() {
    let server = docs_site().await;
    let seed = format!("{}/", server.uri());

    let crawler = DeepCrawler::new(fetcher());
    let result = crawler
        .traverse(&seed, CrawlStrategy::Bfs, 10, 3, &FetchConfig::default())
        .await;

    assert!(result.success);
    assert_eq!(result.total_pages, 4);
    assert_eq!(result.pages[0].url, seed);
    assert_eq!(result.pages[0].depth, 0);
    assert!(result.pages.iter().all(|p| p.result.is_success()));
    assert!(!result.urls().iter().any(|u| u.contains("elsewhere")));

    let mut sink = SqliteSink::new_in_memory().unwrap();
    let run_id = sink.record_traversal("docs", &seed, &result).unwrap();

    let run = sink.get_run(run_id).unwrap();
    assert_eq!(run.kind, RunKind::Traversal);
    assert_eq!(run.total_pages, 4);
    assert_eq!(run.failed, 0);

    let titles: Vec<_> = sink
        .pages_for_run(run_id)
        .unwrap()
        .into_iter()
        .filter_map(|p| p.title)
        .collect();
    assert_eq!(titles.len(), 4);
    assert!(titles.contains(&"C".to_string()));
}

#[tokio::test]
async fn test_link_back_to_bare_seed_is_not_refetched() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<html><body><a href="/a">A</a></body></html>"#))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(html(r#"<html><body><a href="/">Home</a></body></html>"#))
        .expect(1)
        .mount(&server)
        .await;

    let result = DeepCrawler::new(fetcher())
        .traverse(&server.uri(), CrawlStrategy::Dfs, 10, 3, &FetchConfig::default())
        .await;

    assert_eq!(
        result.urls(),
        vec![format!("{}/", server.uri()), format!("{}/a", server.uri())]
    );
}

#[tokio::test]
async fn test_batch_keeps_order_and_isolates_failures() {
    let server = docs_site().await;
    let urls = vec![
        format!("{}/a", server.uri()),
        format!("{}/missing", server.uri()),
        format!("{}/b", server.uri()),
    ];

    let results = BatchExecutor::new(fetcher())
        .run_batch(&urls, &FetchConfig::default(), 2)
        .await;

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].title(), Some("A"));
    assert_eq!(results[1].error(), Some("HTTP 404"));
    assert_eq!(results[2].title(), Some("B"));

    let mut sink = SqliteSink::new_in_memory().unwrap();
    let run_id = sink.record_batch("news_crawler", &urls, &results).unwrap();
    let pages = sink.pages_for_run(run_id).unwrap();
    assert_eq!(pages[1].status, PageStatus::Failed);
    assert_eq!(sink.get_run(run_id).unwrap().completed, 2);
}

#[tokio::test]
async fn test_docs_archiver_bypasses_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("cache-control", "no-cache"))
        .respond_with(html("<html><head><title>Docs</title></head><body></body></html>"))
        .expect(1)
        .mount(&server)
        .await;

    let registry = ScenarioRegistry::with_builtins().unwrap();
    let scenario = registry.get("docs_archiver").unwrap();

    let result = scenario
        .extract(&format!("{}/", server.uri()), fetcher())
        .await;

    let ExtractionResult::DeepCrawl(traversal) = result else {
        panic!("docs archiver should deep crawl");
    };
    assert_eq!(traversal.total_pages, 1);
    assert!(traversal.pages[0].result.is_success());
}

#[tokio::test]
async fn test_custom_template_file_runs_as_scenario() {
    let server = docs_site().await;
    let dir = tempfile::TempDir::new().unwrap();
    let file = dir.path().join("site.json");
    std::fs::write(
        &file,
        r#"{
            "name": "custom_site",
            "fields": [{ "name": "title", "selector": "h1", "required": true }],
            "advanced": { "deep_crawl": true, "max_pages": 3, "strategy": "dfs" }
        }"#,
    )
    .unwrap();

    let registry = ScenarioRegistry::with_builtins().unwrap();
    let name = registry.register_template(load_template(&file).unwrap()).unwrap();
    assert_eq!(registry.list_by_category("custom").len(), 1);

    let scenario = registry.get(&name).unwrap();
    let result = scenario
        .extract(&format!("{}/", server.uri()), fetcher())
        .await;

    assert_eq!(result.page_count(), 3);
    let ExtractionResult::DeepCrawl(traversal) = result else {
        panic!("template asks for a deep crawl");
    };
    let paths: Vec<String> = traversal
        .urls()
        .iter()
        .map(|u| u.trim_start_matches(&server.uri()).to_string())
        .collect();
    assert_eq!(paths, vec!["/", "/a", "/c"]);
}

#[tokio::test]
async fn test_apply_template_without_field_extraction() {
    let server = docs_site().await;
    let dir = tempfile::TempDir::new().unwrap();

    let registry = ScenarioRegistry::with_builtins().unwrap();
    let schema = registry.get("table_extractor").unwrap().schema();
    let saved = save_template(&schema, dir.path(), "tables.json").unwrap();
    let template = load_template(&saved).unwrap();

    let fetcher = HttpFetcher::new(&FetcherConfig::default()).unwrap();
    let applied = apply_template(
        &format!("{}/b", server.uri()),
        &template,
        &fetcher,
        &UnimplementedExtractor,
    )
    .await;

    assert_eq!(applied.result.title(), Some("B"));
    assert!(applied.extracted_data.is_none());
}
