//! URL handling
//!
//! Link resolution and normalization for fetched pages, plus the host
//! comparison used to split a page's links into internal and external.

mod domain;
mod normalize;

pub use domain::{extract_domain, same_host};
pub use normalize::{normalize_url, resolve_link};
