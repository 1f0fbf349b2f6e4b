use crate::{UrlError, UrlResult};
use url::Url;

/// Query parameters that only carry tracking information
const TRACKING_PARAMS: &[&str] = &["fbclid", "gclid", "mc_eid"];

/// Schemes that never lead to a fetchable page
const UNFOLLOWABLE_PREFIXES: &[&str] = &["javascript:", "mailto:", "tel:", "data:"];

/// Normalizes a URL for link bookkeeping
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Accept only http and https
/// 3. Require a host (the parser lowercases it)
/// 4. Remove the fragment
/// 5. Remove tracking query parameters (`utm_*`, `fbclid`, `gclid`, `mc_eid`),
///    keeping the others in their original order
///
/// # Examples
///
/// ```
/// use trawl::url::normalize_url;
///
/// let url = normalize_url("https://EXAMPLE.com/docs?page=2&utm_source=feed#intro").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/docs?page=2");
/// ```
pub fn normalize_url(url_str: &str) -> UrlResult<Url> {
    let url = Url::parse(url_str).map_err(|e| UrlError::Parse(e.to_string()))?;
    normalize(url)
}

/// Resolves an `href` against the page it was found on and normalizes it
///
/// Empty hrefs, same-page anchors and `javascript:`, `mailto:`, `tel:` and
/// `data:` links are rejected as [`UrlError::Unfollowable`].
pub fn resolve_link(href: &str, base_url: &Url) -> UrlResult<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return Err(UrlError::Unfollowable(href.to_string()));
    }

    let lower = href.to_ascii_lowercase();
    if UNFOLLOWABLE_PREFIXES.iter().any(|p| lower.starts_with(p)) {
        return Err(UrlError::Unfollowable(href.to_string()));
    }

    let url = base_url
        .join(href)
        .map_err(|e| UrlError::Parse(e.to_string()))?;
    normalize(url)
}

fn normalize(mut url: Url) -> UrlResult<Url> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingDomain);
    }

    url.set_fragment(None);

    if url.query().is_some() {
        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| !is_tracking_param(key))
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        if kept.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(kept);
        }
    }

    Ok(url)
}

fn is_tracking_param(key: &str) -> bool {
    key.starts_with("utm_") || TRACKING_PARAMS.contains(&key)
}
