//! Human-readable names for related resources (homeworld, films, ...).
//!
//! A fallback such as `planets #1` is derived from the URL up front; the
//! real `name` (or `title`, for films) replaces it when the fetch succeeds.

use crate::client::get_json;
use crate::ids::{extract_id, extract_resource_type};
use futures::future::join_all;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct NamedResource {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

/// `"<type> #<id>"`, or the bare id when the type is unknown.
pub fn fallback_name(url: &str) -> String {
    let id = extract_id(url);
    match extract_resource_type(url) {
        "" => id.to_string(),
        resource_type => format!("{resource_type} #{id}"),
    }
}

/// Resolve one resource URL to its display name. Never fails.
pub async fn resolve_name(http: &reqwest::Client, url: &str) -> String {
    if url.is_empty() {
        return String::new();
    }

    match get_json::<NamedResource>(http, url, &[]).await {
        Ok(resource) => resource
            .title
            .or(resource.name)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| fallback_name(url)),
        Err(e) => {
            tracing::debug!(url = %url, error = %e, "Resource name lookup failed, using fallback");
            fallback_name(url)
        }
    }
}

/// Resolve several URLs concurrently, preserving order.
pub async fn resolve_names(http: &reqwest::Client, urls: &[String]) -> Vec<String> {
    join_all(urls.iter().map(|url| resolve_name(http, url))).await
}
