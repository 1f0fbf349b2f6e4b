//! HTML page parser
//!
//! Turns a fetched HTML document into a [`FetchedPage`]:
//! - title, meta description and meta keywords
//! - links, resolved against the page URL and split by host
//! - media sources (images, video, audio)
//! - fit content: the readable text of the main content area

use crate::fetch::result::{FetchedPage, Links, Media, PageMetadata};
use crate::url::{resolve_link, same_host};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Containers searched, in order, for the page's main content
const CONTENT_ROOTS: &[&str] = &["main", "article", "[role='main']", "body"];

/// Elements whose text is never part of the readable content
const SKIPPED_TEXT_PARENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Parses an HTML document fetched from `page_url`
///
/// Text blocks with fewer than `word_count_threshold` words are left out of
/// `fit_content`.
///
/// # Example
///
/// ```
/// use trawl::fetch::parse_page;
/// use url::Url;
///
/// let html = r#"<html><head><title>Guide</title></head>
///     <body><a href="/next">Next</a><a href="https://other.org/">Elsewhere</a></body></html>"#;
/// let page = parse_page(html, &Url::parse("https://example.com/guide").unwrap(), 1);
/// assert_eq!(page.metadata.title.as_deref(), Some("Guide"));
/// assert_eq!(page.links.internal, vec!["https://example.com/next"]);
/// assert_eq!(page.links.external, vec!["https://other.org/"]);
/// ```
pub fn parse_page(html: &str, page_url: &Url, word_count_threshold: usize) -> FetchedPage {
    let document = Html::parse_document(html);

    FetchedPage {
        url: page_url.to_string(),
        raw_content: html.to_string(),
        fit_content: extract_fit_content(&document, word_count_threshold),
        extracted_content: None,
        links: extract_links(&document, page_url),
        media: extract_media(&document, page_url),
        metadata: extract_metadata(&document),
        screenshot: None,
    }
}

fn extract_metadata(document: &Html) -> PageMetadata {
    let keywords = meta_content(document, "keywords")
        .map(|k| {
            k.split(',')
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();

    PageMetadata {
        title: extract_title(document),
        description: meta_content(document, "description"),
        keywords,
    }
}

fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn meta_content(document: &Html, name: &str) -> Option<String> {
    let selector = Selector::parse(&format!("meta[name='{name}'][content]")).ok()?;

    document
        .select(&selector)
        .next()
        .and_then(|element| element.value().attr("content"))
        .map(|content| content.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Extracts `<a href>` links, skipping downloads and unfollowable hrefs
///
/// Each list is deduplicated and keeps document order. `rel="nofollow"`
/// links are kept.
fn extract_links(document: &Html, page_url: &Url) -> Links {
    let mut links = Links::default();
    let mut seen = HashSet::new();

    let Ok(a_selector) = Selector::parse("a[href]") else {
        return links;
    };

    for element in document.select(&a_selector) {
        if element.value().attr("download").is_some() {
            continue;
        }

        let Some(href) = element.value().attr("href") else {
            continue;
        };

        let Ok(absolute_url) = resolve_link(href, page_url) else {
            continue;
        };

        if !seen.insert(absolute_url.to_string()) {
            continue;
        }

        if same_host(&absolute_url, page_url) {
            links.internal.push(absolute_url.into());
        } else {
            links.external.push(absolute_url.into());
        }
    }

    links
}

fn extract_media(document: &Html, page_url: &Url) -> Media {
    Media {
        images: collect_sources(document, "img[src]", page_url),
        videos: collect_sources(document, "video[src], video source[src]", page_url),
        audio: collect_sources(document, "audio[src], audio source[src]", page_url),
    }
}

fn collect_sources(document: &Html, selector: &str, page_url: &Url) -> Vec<String> {
    let Ok(selector) = Selector::parse(selector) else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    document
        .select(&selector)
        .filter_map(|element| element.value().attr("src"))
        .filter_map(|src| page_url.join(src.trim()).ok())
        .map(String::from)
        .filter(|src| seen.insert(src.clone()))
        .collect()
}

/// Collects the readable text of the first content root found
fn extract_fit_content(document: &Html, word_count_threshold: usize) -> String {
    let Some(root) = CONTENT_ROOTS.iter().find_map(|root| {
        Selector::parse(root)
            .ok()
            .and_then(|selector| document.select(&selector).next())
    }) else {
        return String::new();
    };

    text_blocks(root, word_count_threshold).join("\n")
}

fn text_blocks(root: ElementRef<'_>, word_count_threshold: usize) -> Vec<String> {
    let mut blocks = Vec::new();

    for node in root.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };

        let hidden = node
            .parent()
            .and_then(|parent| parent.value().as_element().map(|e| e.name().to_string()))
            .is_some_and(|name| SKIPPED_TEXT_PARENTS.contains(&name.as_str()));
        if hidden {
            continue;
        }

        let words: Vec<&str> = text.split_whitespace().collect();
        if words.is_empty() || words.len() < word_count_threshold {
            continue;
        }
        blocks.push(words.join(" "));
    }

    blocks
}
