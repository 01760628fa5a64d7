//! Record fetcher backed by the SWAPI REST API.

use crate::errors::{FetchError, Result};
use crate::types::{ApiPage, Character, Page};
use async_trait::async_trait;
use holocron_overlay::RecordId;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Public SWAPI mirror used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "https://swapi.py4e.com/api";

/// Source of canonical records.
#[async_trait]
pub trait RecordFetcher: Send + Sync {
    type Record: Send;

    async fn fetch_by_id(&self, id: &RecordId) -> Result<Self::Record>;

    /// One page of records, optionally filtered by a name search.
    async fn fetch_page(&self, page: u32, search: &str) -> Result<Page<Self::Record>>;
}

/// HTTP client for the `people` collection.
#[derive(Debug, Clone)]
pub struct SwapiClient {
    http: reqwest::Client,
    base_url: String,
}

impl SwapiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self::with_http(http, base_url))
    }

    pub fn with_http(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// GET `url` and decode a JSON body, mapping failures onto [`FetchError`].
pub(crate) async fn get_json<T: DeserializeOwned>(
    http: &reqwest::Client,
    url: &str,
    query: &[(&str, String)],
) -> Result<T> {
    tracing::debug!(url = %url, ?query, "GET");

    let resp = http
        .get(url)
        .query(query)
        .send()
        .await
        .map_err(|source| FetchError::Network {
            url: url.to_string(),
            source,
        })?;

    let status = resp.status();
    if !status.is_success() {
        tracing::debug!(url = %url, %status, "Fetch failed");
        return Err(FetchError::from_status(url, status));
    }

    resp.json().await.map_err(|source| FetchError::Decode {
        url: url.to_string(),
        source,
    })
}

#[async_trait]
impl RecordFetcher for SwapiClient {
    type Record = Character;

    async fn fetch_by_id(&self, id: &RecordId) -> Result<Character> {
        let url = format!("{}/people/{id}/", self.base_url);
        get_json(&self.http, &url, &[]).await
    }

    async fn fetch_page(&self, page: u32, search: &str) -> Result<Page<Character>> {
        let url = format!("{}/people/", self.base_url);
        let mut query = vec![("page", page.max(1).to_string())];
        let search = search.trim();
        if !search.is_empty() {
            query.push(("search", search.to_string()));
        }

        let page: ApiPage<Character> = get_json(&self.http, &url, &query).await?;
        Ok(page.into())
    }
}
